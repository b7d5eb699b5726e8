/// Generation-checked handle into a [`HandleArena`].
///
/// A handle stays valid until its slot is removed; after that every lookup with it fails, even
/// once the slot is reused for a new value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct DecoderHandle {
    index: u32,
    generation: u32,
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot arena with free-list reuse and per-slot generations.
pub(crate) struct HandleArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for HandleArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleArena<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> DecoderHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return DecoderHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        DecoderHandle {
            index,
            generation: 0,
        }
    }

    fn slot(&self, handle: DecoderHandle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
    }

    pub(crate) fn get(&self, handle: DecoderHandle) -> Option<&T> {
        self.slot(handle).and_then(|s| s.value.as_ref())
    }

    pub(crate) fn get_mut(&mut self, handle: DecoderHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.value.as_mut())
    }

    pub(crate) fn contains(&self, handle: DecoderHandle) -> bool {
        self.get(handle).is_some()
    }

    pub(crate) fn remove(&mut self, handle: DecoderHandle) -> Option<T> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/arena.rs"]
mod tests;
