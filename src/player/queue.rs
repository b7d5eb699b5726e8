use std::collections::VecDeque;
use std::sync::Arc;

/// Frame pixels as they sit in the queue: freshly decoded (owned, recyclable as scratch) or
/// served from the frame cache (shared).
#[derive(Clone, Debug)]
pub(crate) enum FramePixels {
    Owned(Vec<u8>),
    Shared(Arc<[u8]>),
}

impl FramePixels {
    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            Self::Owned(v) => v,
            Self::Shared(a) => a,
        }
    }

    /// The owned allocation, if any, for reuse as a transfer buffer.
    pub(crate) fn into_owned(self) -> Option<Vec<u8>> {
        match self {
            Self::Owned(v) => Some(v),
            Self::Shared(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct QueuedFrame {
    pub(crate) index: u32,
    pub(crate) pixels: FramePixels,
}

/// Bounded FIFO of decoded, not yet presented frames.
#[derive(Debug)]
pub(crate) struct FrameQueue {
    frames: VecDeque<QueuedFrame>,
    capacity: usize,
}

impl FrameQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append at the tail. Refuses (returns `false`) when full.
    pub(crate) fn push(&mut self, frame: QueuedFrame) -> bool {
        if self.frames.len() >= self.capacity {
            return false;
        }
        self.frames.push_back(frame);
        true
    }

    pub(crate) fn shift(&mut self) -> Option<QueuedFrame> {
        self.frames.pop_front()
    }

    pub(crate) fn needs_more(&self) -> bool {
        self.frames.len() < self.capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/queue.rs"]
mod tests;
