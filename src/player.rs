pub(crate) mod cache;
pub(crate) mod options;
pub(crate) mod queue;

use std::time::Duration;

use crate::foundation::core::{ElementId, Fps, PixelSize, RequestId, WorkerId};
use cache::FrameCache;
use options::PlayerOptions;
use queue::{FramePixels, FrameQueue, QueuedFrame};

/// Observable lifecycle state of one animation instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerPhase {
    /// Load request sent, metadata not known yet.
    Creating,
    /// Metadata known, nothing presented yet.
    Loaded,
    /// Presenting frames.
    Running,
    /// Paused by the caller.
    Paused,
    /// Play-once animation that presented its last frame.
    PausedAtEnd,
    /// A decode call failed; no further frames are requested.
    Dead,
}

/// State that only exists once the worker reported frame count and fps.
#[derive(Debug)]
pub(crate) struct Playback {
    pub(crate) frame_count: u32,
    pub(crate) fps: Fps,
    pub(crate) queue: FrameQueue,
    /// Host time of the last presented frame, snapped down to the frame grid.
    pub(crate) frame_then: Duration,
    /// Next index to request once presenting frees queue capacity.
    pub(crate) pending_next: Option<u32>,
    pub(crate) in_flight: bool,
    /// Play-once reached the last frame; nothing further is requested.
    pub(crate) ended: bool,
    /// The first frame is presented regardless of the gate.
    pub(crate) prime: bool,
    /// Index to re-request when an in-flight frame comes back with a stale size.
    pub(crate) resume_at: Option<u32>,
    pub(crate) last_presented: Option<u32>,
}

impl Playback {
    pub(crate) fn new(frame_count: u32, fps: Fps, now: Duration) -> Self {
        Self {
            frame_count,
            fps,
            queue: FrameQueue::new(fps.queue_capacity()),
            frame_then: now,
            pending_next: None,
            in_flight: false,
            ended: false,
            prime: true,
            resume_at: None,
            last_presented: None,
        }
    }

    pub(crate) fn frame_interval(&self) -> Duration {
        self.fps.frame_interval()
    }

    /// The player's time budget since its last display has elapsed.
    pub(crate) fn is_due(&self, now: Duration) -> bool {
        now.saturating_sub(self.frame_then) > self.frame_interval()
    }
}

/// One animation instance bound to a host element.
#[derive(Debug)]
pub(crate) struct Player {
    pub(crate) req_id: RequestId,
    pub(crate) element: ElementId,
    pub(crate) size: PixelSize,
    pub(crate) worker: WorkerId,
    pub(crate) options: PlayerOptions,
    pub(crate) paused: bool,
    pub(crate) in_viewport: Option<bool>,
    pub(crate) dead: bool,
    pub(crate) scratch: Option<Vec<u8>>,
    pub(crate) cache: FrameCache,
    pub(crate) playback: Option<Playback>,
    pub(crate) timings: Vec<Duration>,
    pub(crate) placeholder: bool,
    pub(crate) presented: u64,
}

impl Player {
    pub(crate) fn new(
        req_id: RequestId,
        element: ElementId,
        size: PixelSize,
        worker: WorkerId,
        options: PlayerOptions,
    ) -> Self {
        let cache = FrameCache::new(options.caching_module);
        Self {
            req_id,
            element,
            size,
            worker,
            options,
            paused: false,
            in_viewport: None,
            dead: false,
            scratch: Some(vec![0; size.byte_len()]),
            cache,
            playback: None,
            timings: Vec::new(),
            placeholder: true,
            presented: 0,
        }
    }

    pub(crate) fn frame_count(&self) -> Option<u32> {
        self.playback.as_ref().map(|p| p.frame_count)
    }

    /// Take a delivered frame: offer it to the cache, enqueue it and advance. Returns the index to
    /// request right away, if the queue still has room.
    pub(crate) fn accept_frame(&mut self, frame: u32, pixels: FramePixels) -> Option<u32> {
        if let FramePixels::Owned(px) = &pixels
            && self.cache.offer(self.req_id, frame, px)
        {
            tracing::trace!(req_id = %self.req_id, frame, "frame retained");
        }

        let pb = self.playback.as_mut()?;
        pb.in_flight = false;
        if !pb.queue.push(QueuedFrame {
            index: frame,
            pixels,
        }) {
            tracing::debug!(req_id = %self.req_id, frame, "frame queue full, frame deferred");
            pb.pending_next = Some(frame);
            return None;
        }

        let mut next = frame + 1;
        if next >= pb.frame_count {
            if self.options.play_once {
                pb.ended = true;
                return None;
            }
            next = 0;
            if !self.timings.is_empty() {
                let total: Duration = self.timings.iter().sum();
                let avg = total / self.timings.len() as u32;
                tracing::debug!(
                    req_id = %self.req_id,
                    avg_ms = avg.as_secs_f64() * 1000.0,
                    fps = pb.fps.as_f64(),
                    "loop timing"
                );
                self.timings.clear();
            }
        }

        if pb.queue.needs_more() {
            Some(next)
        } else {
            pb.pending_next = Some(next);
            None
        }
    }

    /// Dequeue the frame to present now. Also returns the deferred request index freed by it.
    pub(crate) fn take_frame(&mut self, now: Duration) -> Option<(QueuedFrame, Option<u32>)> {
        let pb = self.playback.as_mut()?;
        let frame = pb.queue.shift()?;

        self.timings.push(now.saturating_sub(pb.frame_then));
        let interval = pb.frame_interval().as_nanos().max(1);
        let offset = Duration::from_nanos((now.as_nanos() % interval) as u64);
        pb.frame_then = now.saturating_sub(offset);
        pb.prime = false;
        pb.last_presented = Some(frame.index);

        if self.options.play_once && frame.index + 1 >= pb.frame_count {
            tracing::debug!(req_id = %self.req_id, frame = frame.index, "last frame presented, pausing");
            self.paused = true;
        }
        Some((frame, pb.pending_next.take()))
    }

    /// Keep a presented frame's allocation as the next transfer buffer.
    pub(crate) fn recycle(&mut self, pixels: FramePixels) {
        if let Some(buf) = pixels.into_owned()
            && buf.len() == self.size.byte_len()
        {
            self.scratch = Some(buf);
        }
    }

    /// Switch to a new surface size. Drops everything decoded at the old size and returns the
    /// index to request now, if no request is in flight.
    pub(crate) fn flush_for_resize(&mut self, size: PixelSize) -> Option<u32> {
        self.size = size;
        self.scratch = None;
        self.cache.clear();
        let pb = self.playback.as_mut()?;

        let restart = pb
            .queue
            .shift()
            .map(|f| f.index)
            .or(pb.pending_next.take())
            .or(pb.resume_at.take())
            .unwrap_or_else(|| match pb.last_presented {
                Some(i) if i + 1 < pb.frame_count => i + 1,
                _ => 0,
            });
        pb.queue.clear();
        pb.pending_next = None;
        pb.ended = false;
        if pb.in_flight {
            pb.resume_at = Some(restart);
            None
        } else {
            Some(restart)
        }
    }

    pub(crate) fn phase(&self) -> PlayerPhase {
        if self.dead {
            return PlayerPhase::Dead;
        }
        let Some(pb) = &self.playback else {
            return PlayerPhase::Creating;
        };
        if self.paused {
            if pb.ended && self.options.play_once {
                return PlayerPhase::PausedAtEnd;
            }
            return PlayerPhase::Paused;
        }
        if self.presented == 0 {
            PlayerPhase::Loaded
        } else {
            PlayerPhase::Running
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/player/player.rs"]
mod tests;
