use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use crate::assets::header::decode_asset;
use crate::assets::source::AssetSource;
use crate::channel::{FailedStage, Inbound, Reply, Request};
use crate::decode::module::{DecodeModule, ModuleFactory, ModuleHandle};
use crate::foundation::arena::{DecoderHandle, HandleArena};
use crate::foundation::core::{Fps, PixelSize, RequestId, WorkerId};
use crate::foundation::error::{LottieError, LottieResult};

struct Item {
    module: ModuleHandle,
    frame_count: u32,
    size: PixelSize,
    dead: bool,
}

/// One decode context: a module instance plus the decoder handles it hosts.
pub(crate) struct DecodeWorker {
    id: WorkerId,
    module: Box<dyn DecodeModule>,
    source: Arc<dyn AssetSource>,
    replies: Sender<Inbound>,
    items: HashMap<RequestId, DecoderHandle>,
    arena: HandleArena<Item>,
}

/// Start a worker thread. It replies [`Reply::Ready`] once its module exists and then serves
/// requests in arrival order until the request channel closes.
pub(crate) fn spawn(
    id: WorkerId,
    factory: ModuleFactory,
    source: Arc<dyn AssetSource>,
    replies: Sender<Inbound>,
) -> LottieResult<(Sender<Request>, JoinHandle<()>)> {
    let (tx, rx) = mpsc::channel::<Request>();
    let join = std::thread::Builder::new()
        .name(format!("lottie-decode-{}", id.index))
        .spawn(move || {
            let worker = DecodeWorker::new(id, factory(), source, replies);
            worker.run(rx);
        })
        .map_err(|e| LottieError::channel(format!("failed to spawn decode worker {id}: {e}")))?;
    Ok((tx, join))
}

impl DecodeWorker {
    pub(crate) fn new(
        id: WorkerId,
        module: Box<dyn DecodeModule>,
        source: Arc<dyn AssetSource>,
        replies: Sender<Inbound>,
    ) -> Self {
        Self {
            id,
            module,
            source,
            replies,
            items: HashMap::new(),
            arena: HandleArena::new(),
        }
    }

    pub(crate) fn run(mut self, rx: Receiver<Request>) {
        tracing::debug!(worker = %self.id, "decode worker started");
        self.reply(Reply::Ready);
        while let Ok(request) = rx.recv() {
            self.handle(request);
        }
        tracing::debug!(worker = %self.id, live = self.arena.len(), "decode worker stopping");
        self.shutdown();
    }

    pub(crate) fn handle(&mut self, request: Request) {
        match request {
            Request::Load { req_id, url, size } => self.load(req_id, &url, size),
            Request::Render {
                req_id,
                frame,
                buffer,
            } => self.render(req_id, frame, buffer),
            Request::Resize { req_id, size } => self.resize(req_id, size),
            Request::Destroy { req_id } => self.destroy(req_id),
        }
    }

    fn reply(&self, reply: Reply) {
        let msg = Inbound {
            worker: self.id,
            reply,
        };
        if self.replies.send(msg).is_err() {
            tracing::trace!(worker = %self.id, "reply port closed");
        }
    }

    #[tracing::instrument(skip(self, req_id, size), fields(worker = %self.id, req_id = %req_id))]
    fn load(&mut self, req_id: RequestId, url: &str, size: PixelSize) {
        match self.try_load(req_id, url, size) {
            Ok((frame_count, fps)) => {
                tracing::debug!(frame_count, fps = fps.as_f64(), "animation loaded");
                self.reply(Reply::Loaded {
                    req_id,
                    frame_count,
                    fps: fps.as_f64(),
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "can't load animation, abandoning");
                self.reply(Reply::Failed {
                    req_id,
                    stage: FailedStage::Load,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn try_load(
        &mut self,
        req_id: RequestId,
        url: &str,
        size: PixelSize,
    ) -> LottieResult<(u32, Fps)> {
        let bytes = self.source.fetch(url)?;
        let data = decode_asset(&bytes)?;
        let fps = data.header.fps();

        let module = self.module.create()?;
        let loaded = self.module.load(module, &data.json).and_then(|frame_count| {
            self.module.resize(module, size.width, size.height)?;
            Ok(frame_count)
        });
        let frame_count = match loaded {
            Ok(n) => n,
            Err(e) => {
                self.module.destroy(module);
                return Err(e);
            }
        };

        if let Some(old) = self.items.remove(&req_id)
            && let Some(old) = self.arena.remove(old)
        {
            tracing::debug!("replacing previous instance");
            self.module.destroy(old.module);
        }
        let handle = self.arena.insert(Item {
            module,
            frame_count,
            size,
            dead: false,
        });
        self.items.insert(req_id, handle);
        Ok((frame_count, fps))
    }

    fn lookup(&self, req_id: RequestId, method: &'static str) -> Option<DecoderHandle> {
        let Some(&handle) = self.items.get(&req_id) else {
            tracing::debug!(worker = %self.id, %req_id, method, "no instance for request, ignored");
            return None;
        };
        if !self.arena.contains(handle) {
            tracing::debug!(worker = %self.id, %req_id, method, "stale decoder handle, ignored");
            return None;
        }
        Some(handle)
    }

    fn mark_dead(&mut self, handle: DecoderHandle) {
        if let Some(item) = self.arena.get_mut(handle) {
            item.dead = true;
        }
    }

    fn render(&mut self, req_id: RequestId, frame: u32, buffer: Option<Vec<u8>>) {
        let Some(handle) = self.lookup(req_id, "render") else {
            return;
        };
        let Some(item) = self.arena.get(handle) else {
            return;
        };
        if item.dead {
            return;
        }
        if frame >= item.frame_count {
            tracing::debug!(worker = %self.id, %req_id, frame, frame_count = item.frame_count, "frame out of range, ignored");
            return;
        }
        let (module, size) = (item.module, item.size);

        match self.render_into(module, frame, buffer, size.byte_len()) {
            Ok(pixels) => {
                tracing::trace!(worker = %self.id, %req_id, frame, "frame rendered");
                self.reply(Reply::Frame {
                    req_id,
                    frame,
                    size,
                    pixels,
                });
            }
            Err(e) => {
                tracing::warn!(worker = %self.id, %req_id, frame, error = %e, "render failed, instance marked dead");
                self.mark_dead(handle);
                self.reply(Reply::Failed {
                    req_id,
                    stage: FailedStage::Render,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn render_into(
        &mut self,
        module: ModuleHandle,
        frame: u32,
        buffer: Option<Vec<u8>>,
        len: usize,
    ) -> LottieResult<Vec<u8>> {
        self.module.render(module, frame)?;
        let src = self.module.frame_buffer(module)?;
        if src.len() != len {
            return Err(LottieError::decode(format!(
                "frame buffer is {} bytes, expected {len}",
                src.len()
            )));
        }
        Ok(match buffer {
            Some(mut buf) if buf.len() == len => {
                buf.copy_from_slice(src);
                buf
            }
            _ => src.to_vec(),
        })
    }

    fn resize(&mut self, req_id: RequestId, size: PixelSize) {
        let Some(handle) = self.lookup(req_id, "resize") else {
            return;
        };
        let Some(item) = self.arena.get_mut(handle) else {
            return;
        };
        item.size = size;
        let module = item.module;
        if let Err(e) = self.module.resize(module, size.width, size.height) {
            tracing::warn!(worker = %self.id, %req_id, error = %e, "resize failed, instance marked dead");
            self.mark_dead(handle);
            self.reply(Reply::Failed {
                req_id,
                stage: FailedStage::Render,
                reason: e.to_string(),
            });
        }
    }

    fn destroy(&mut self, req_id: RequestId) {
        let Some(handle) = self.items.remove(&req_id) else {
            tracing::debug!(worker = %self.id, %req_id, "destroy for unknown request, ignored");
            return;
        };
        if let Some(item) = self.arena.remove(handle) {
            self.module.destroy(item.module);
        }
    }

    fn shutdown(&mut self) {
        for (_, handle) in self.items.drain() {
            if let Some(item) = self.arena.remove(handle) {
                self.module.destroy(item.module);
            }
        }
    }

    #[cfg(test)]
    fn live(&self) -> usize {
        self.arena.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/worker.rs"]
mod tests;
