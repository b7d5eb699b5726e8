use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::assets::source::AssetSource;
use crate::channel::{DecodeChannel, Inbound};
use crate::decode::module::ModuleFactory;
use crate::decode::worker;
use crate::foundation::core::WorkerId;
use crate::foundation::error::LottieResult;
use crate::platform::BufferMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PoolState {
    Idle,
    Starting { remaining: usize },
    Ready,
}

/// Fixed-size set of decode workers with a readiness latch.
///
/// `W` is whatever the caller wants completed once every worker of the current generation has
/// reported ready; waiters are released in registration order.
pub(crate) struct WorkerPool<W> {
    size: usize,
    generation: u32,
    state: PoolState,
    channels: Vec<DecodeChannel>,
    next: usize,
    waiters: Vec<W>,
    replies: Sender<Inbound>,
    factory: ModuleFactory,
    source: Arc<dyn AssetSource>,
    mode: BufferMode,
}

impl<W> WorkerPool<W> {
    pub(crate) fn new(
        size: usize,
        replies: Sender<Inbound>,
        factory: ModuleFactory,
        source: Arc<dyn AssetSource>,
        mode: BufferMode,
    ) -> Self {
        Self {
            size: size.max(1),
            generation: 0,
            state: PoolState::Idle,
            channels: Vec::new(),
            next: 0,
            waiters: Vec::new(),
            replies,
            factory,
            source,
            mode,
        }
    }

    /// Hand `waiter` back immediately if the pool is ready; otherwise queue it and make sure a
    /// start is under way.
    pub(crate) fn ensure_ready(&mut self, waiter: W) -> LottieResult<Option<W>> {
        match self.state {
            PoolState::Ready => Ok(Some(waiter)),
            PoolState::Starting { .. } => {
                self.waiters.push(waiter);
                Ok(None)
            }
            PoolState::Idle => {
                self.start()?;
                self.waiters.push(waiter);
                Ok(None)
            }
        }
    }

    fn start(&mut self) -> LottieResult<()> {
        tracing::info!(workers = self.size, generation = self.generation, "starting decode pool");
        self.state = PoolState::Starting {
            remaining: self.size,
        };
        for index in 0..self.size {
            let id = WorkerId {
                generation: self.generation,
                index,
            };
            let spawned = worker::spawn(
                id,
                self.factory.clone(),
                self.source.clone(),
                self.replies.clone(),
            );
            match spawned {
                Ok((tx, _join)) => self.channels.push(DecodeChannel::new(id, tx, self.mode)),
                Err(e) => {
                    self.destroy_all();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Count down the latch for `worker`. Returns the released waiters when it hits zero.
    pub(crate) fn on_ready(&mut self, worker: WorkerId) -> Vec<W> {
        if !self.is_current(worker) {
            return Vec::new();
        }
        let PoolState::Starting { remaining } = self.state else {
            return Vec::new();
        };
        tracing::info!(%worker, "decode worker ready");

        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.state = PoolState::Starting { remaining };
            return Vec::new();
        }
        self.state = PoolState::Ready;
        tracing::info!(
            workers = self.size,
            pending = self.waiters.len(),
            "decode pool ready"
        );
        std::mem::take(&mut self.waiters)
    }

    pub(crate) fn is_current(&self, worker: WorkerId) -> bool {
        worker.generation == self.generation && worker.index < self.channels.len()
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.state == PoolState::Ready
    }

    /// Next worker in round-robin order.
    pub(crate) fn assign(&mut self) -> Option<WorkerId> {
        let channel = self.channels.get(self.next)?;
        let id = channel.worker();
        self.next = (self.next + 1) % self.channels.len();
        Some(id)
    }

    pub(crate) fn channel(&self, worker: WorkerId) -> Option<&DecodeChannel> {
        if worker.generation != self.generation {
            return None;
        }
        self.channels.get(worker.index)
    }

    /// Drop every worker channel (workers exit once their queue drains) and reset the latch. The
    /// next [`WorkerPool::ensure_ready`] starts a fresh generation.
    pub(crate) fn destroy_all(&mut self) {
        if self.state != PoolState::Idle {
            tracing::info!(
                generation = self.generation,
                workers = self.channels.len(),
                "decode pool destroyed"
            );
        }
        self.channels.clear();
        self.waiters.clear();
        self.generation = self.generation.wrapping_add(1);
        self.state = PoolState::Idle;
        self.next = 0;
    }

    pub(crate) fn waiting(&self) -> impl Iterator<Item = &W> {
        self.waiters.iter()
    }

    pub(crate) fn retain_waiting(&mut self, keep: impl FnMut(&W) -> bool) {
        self.waiters.retain(keep);
    }

    pub(crate) fn pending(&self) -> usize {
        self.waiters.len()
    }

    pub(crate) fn spawned(&self) -> usize {
        self.channels.len()
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }
}

#[cfg(test)]
#[path = "../tests/unit/pool.rs"]
mod tests;
