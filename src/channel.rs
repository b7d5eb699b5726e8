use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use crate::foundation::core::{PixelSize, RequestId, WorkerId};
use crate::platform::BufferMode;

/// Orchestrator → worker call.
#[derive(Debug)]
pub(crate) enum Request {
    Load {
        req_id: RequestId,
        url: String,
        size: PixelSize,
    },
    Render {
        req_id: RequestId,
        frame: u32,
        /// Scratch buffer moved to the worker under [`BufferMode::Transfer`].
        buffer: Option<Vec<u8>>,
    },
    Resize {
        req_id: RequestId,
        size: PixelSize,
    },
    Destroy {
        req_id: RequestId,
    },
}

impl Request {
    pub(crate) fn method(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Render { .. } => "render",
            Self::Resize { .. } => "resize",
            Self::Destroy { .. } => "destroy",
        }
    }

    pub(crate) fn req_id(&self) -> RequestId {
        match self {
            Self::Load { req_id, .. }
            | Self::Render { req_id, .. }
            | Self::Resize { req_id, .. }
            | Self::Destroy { req_id } => *req_id,
        }
    }
}

/// Worker → orchestrator reply.
#[derive(Debug)]
pub(crate) enum Reply {
    Ready,
    Loaded {
        req_id: RequestId,
        frame_count: u32,
        fps: f64,
    },
    Frame {
        req_id: RequestId,
        frame: u32,
        /// Surface size the frame was rendered at.
        size: PixelSize,
        pixels: Vec<u8>,
    },
    Failed {
        req_id: RequestId,
        stage: FailedStage,
        reason: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FailedStage {
    Load,
    Render,
}

/// Reply tagged with the worker that produced it.
#[derive(Debug)]
pub(crate) struct Inbound {
    pub(crate) worker: WorkerId,
    pub(crate) reply: Reply,
}

/// Sending half of one worker's FIFO request channel.
pub(crate) struct DecodeChannel {
    worker: WorkerId,
    tx: Sender<Request>,
    mode: BufferMode,
}

impl DecodeChannel {
    pub(crate) fn new(worker: WorkerId, tx: Sender<Request>, mode: BufferMode) -> Self {
        Self { worker, tx, mode }
    }

    pub(crate) fn worker(&self) -> WorkerId {
        self.worker
    }

    /// Fire-and-forget call. A closed channel means the worker is gone; the call is dropped.
    pub(crate) fn call(&self, mut request: Request) {
        if self.mode == BufferMode::Copy
            && let Request::Render { buffer, .. } = &mut request
        {
            *buffer = None;
        }

        let method = request.method();
        let req_id = request.req_id();
        tracing::trace!(worker = %self.worker, %req_id, method, "call");
        if self.tx.send(request).is_err() {
            tracing::warn!(worker = %self.worker, %req_id, method, "worker channel closed, call dropped");
        }
    }
}

/// Receiving end shared by all workers of every pool generation.
pub(crate) struct ReplyPort {
    rx: Receiver<Inbound>,
}

impl ReplyPort {
    pub(crate) fn new(rx: Receiver<Inbound>) -> Self {
        Self { rx }
    }

    pub(crate) fn try_next(&self) -> Option<Inbound> {
        match self.rx.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub(crate) fn next_timeout(&self, timeout: Duration) -> Option<Inbound> {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => Some(msg),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Take the sender-side scratch buffer, reallocating when a previous transfer left it missing or
/// sized for another surface.
pub(crate) fn take_scratch(slot: &mut Option<Vec<u8>>, len: usize) -> Vec<u8> {
    match slot.take() {
        Some(buf) if buf.len() == len && len != 0 => buf,
        _ => vec![0u8; len],
    }
}

#[cfg(test)]
#[path = "../tests/unit/channel.rs"]
mod tests;
