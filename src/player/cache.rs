use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::RequestId;

/// Sparse store of decoded frames. Nothing is ever evicted; the whole cache goes away with its
/// player.
#[derive(Debug, Default)]
pub(crate) struct FrameCache {
    modulus: u32,
    frames: HashMap<u32, Arc<[u8]>>,
}

impl FrameCache {
    pub(crate) fn new(modulus: u32) -> Self {
        Self {
            modulus,
            frames: HashMap::new(),
        }
    }

    /// Retention predicate: enabled, not cached yet, and `(req_id + frame) % modulus != 0`.
    pub(crate) fn should_retain(&self, req_id: RequestId, frame: u32) -> bool {
        if self.modulus == 0 || self.frames.contains_key(&frame) {
            return false;
        }
        (req_id.0.wrapping_add(u64::from(frame))) % u64::from(self.modulus) != 0
    }

    /// Retain a copy of `pixels` if the predicate allows it. Returns whether it was kept.
    pub(crate) fn offer(&mut self, req_id: RequestId, frame: u32, pixels: &[u8]) -> bool {
        if !self.should_retain(req_id, frame) {
            return false;
        }
        self.frames.insert(frame, Arc::from(pixels));
        true
    }

    pub(crate) fn get(&self, frame: u32) -> Option<Arc<[u8]>> {
        self.frames.get(&frame).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/cache.rs"]
mod tests;
