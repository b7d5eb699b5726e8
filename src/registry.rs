use std::collections::{BTreeMap, HashMap};

use crate::foundation::core::{ElementId, RequestId};
use crate::player::Player;

/// Active players keyed by request id, iterated in creation order.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    players: BTreeMap<RequestId, Player>,
    by_element: HashMap<ElementId, RequestId>,
    last_id: u64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Mint the next request id. Ids start at 1 and are never reused.
    pub(crate) fn mint(&mut self) -> RequestId {
        self.last_id += 1;
        RequestId(self.last_id)
    }

    pub(crate) fn insert(&mut self, player: Player) {
        self.by_element.insert(player.element, player.req_id);
        self.players.insert(player.req_id, player);
    }

    pub(crate) fn get(&self, req_id: RequestId) -> Option<&Player> {
        self.players.get(&req_id)
    }

    pub(crate) fn get_mut(&mut self, req_id: RequestId) -> Option<&mut Player> {
        self.players.get_mut(&req_id)
    }

    pub(crate) fn by_element(&self, element: ElementId) -> Option<RequestId> {
        self.by_element.get(&element).copied()
    }

    pub(crate) fn remove(&mut self, req_id: RequestId) -> Option<Player> {
        let player = self.players.remove(&req_id)?;
        if self.by_element.get(&player.element) == Some(&req_id) {
            self.by_element.remove(&player.element);
        }
        Some(player)
    }

    pub(crate) fn ids(&self) -> Vec<RequestId> {
        self.players.keys().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.players.len()
    }

    /// At least one player knows its frame count.
    pub(crate) fn has_loaded(&self) -> bool {
        self.players.values().any(|p| p.playback.is_some())
    }

    pub(crate) fn drain(&mut self) -> Vec<Player> {
        self.by_element.clear();
        std::mem::take(&mut self.players).into_values().collect()
    }
}

#[cfg(test)]
#[path = "../tests/unit/registry.rs"]
mod tests;
