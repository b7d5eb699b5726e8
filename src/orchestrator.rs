use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use crate::assets::source::AssetSource;
use crate::channel::{FailedStage, Inbound, Reply, ReplyPort, Request, take_scratch};
use crate::decode::module::ModuleFactory;
use crate::foundation::core::{ElementId, Fps, PixelSize, RequestId, WorkerId};
use crate::gate;
use crate::host::Host;
use crate::platform::{BufferMode, PlatformPolicy};
use crate::player::options::PlayerOptions;
use crate::player::queue::FramePixels;
use crate::player::{Playback, Player, PlayerPhase};
use crate::pool::WorkerPool;
use crate::registry::Registry;
use crate::scheduler::{Cadence, LoopState, MainLoop, Wake};

/// Orchestrator tuning. Deserializes from camelCase JSON; every field has a default.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrchestratorOpts {
    /// Number of decode workers; fixed once the pool starts.
    pub workers: usize,
    /// Re-arm delay while frames are being presented.
    pub short_delay_ms: u64,
    /// Re-arm delay while nothing is being presented.
    pub long_delay_ms: u64,
    /// How recently a frame must have been presented for the short delay to apply.
    pub active_window_ms: u64,
    /// Minimum time between viewport intersection checks.
    pub viewport_recheck_ms: u64,
    /// CSS size used for elements that report no size.
    pub fallback_size: u32,
}

impl Default for OrchestratorOpts {
    fn default() -> Self {
        Self {
            workers: 1,
            short_delay_ms: 16,
            long_delay_ms: 500,
            active_window_ms: 100,
            viewport_recheck_ms: 1000,
            fallback_size: 256,
        }
    }
}

impl OrchestratorOpts {
    fn cadence(&self) -> Cadence {
        Cadence {
            short_delay: Duration::from_millis(self.short_delay_ms),
            long_delay: Duration::from_millis(self.long_delay_ms),
            active_window: Duration::from_millis(self.active_window_ms),
            viewport_recheck: Duration::from_millis(self.viewport_recheck_ms),
        }
    }
}

/// Outcome of [`Orchestrator::init`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitStatus {
    /// The platform cannot run the decoder; nothing was created.
    Unsupported,
    /// The element already has a player (or one is queued for it).
    AlreadyActive,
    /// The pool is still starting; the player is created once it is ready.
    Queued,
    /// Player created and load request sent.
    Started(RequestId),
    /// The element declares no animation source.
    NoSource,
    /// Decode workers could not be started.
    PoolUnavailable,
}

/// Snapshot of one player, for diagnostics and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerInfo {
    /// Request id.
    pub req_id: RequestId,
    /// Assigned worker.
    pub worker: WorkerId,
    /// Surface size in device pixels.
    pub size: PixelSize,
    /// Frame count, once loaded.
    pub frame_count: Option<u32>,
    /// Clamped fps, once loaded.
    pub fps: Option<f64>,
    /// Frames waiting in the queue.
    pub queued: usize,
    /// Frame queue capacity, once loaded.
    pub queue_capacity: Option<usize>,
    /// Frames retained by the frame cache.
    pub cached: usize,
    /// Frames presented so far.
    pub presented: u64,
    /// Lifecycle phase.
    pub phase: PlayerPhase,
}

#[derive(Debug)]
struct PendingInit {
    element: ElementId,
    options: PlayerOptions,
}

/// Single-threaded owner of all playback state.
///
/// Nothing here blocks except [`Orchestrator::wait`]. The host calls [`Orchestrator::poll`] when
/// replies may be available and [`Orchestrator::tick`] when the wake returned by
/// [`Orchestrator::next_wake`] fires.
pub struct Orchestrator<H: Host> {
    host: H,
    opts: OrchestratorOpts,
    policy: PlatformPolicy,
    registry: Registry,
    pool: WorkerPool<PendingInit>,
    replies: ReplyPort,
    main_loop: MainLoop,
}

impl<H: Host> Orchestrator<H> {
    /// Create an orchestrator. No worker is started until the first [`Orchestrator::init`].
    pub fn new(
        host: H,
        opts: OrchestratorOpts,
        factory: ModuleFactory,
        source: Arc<dyn AssetSource>,
    ) -> Self {
        let policy = PlatformPolicy::detect(&host.capabilities());
        let (tx, rx) = mpsc::channel::<Inbound>();
        let pool = WorkerPool::new(opts.workers, tx, factory, source, policy.buffer_mode);
        let main_loop = MainLoop::new(policy.paint_synced, opts.cadence());
        Self {
            host,
            opts,
            policy,
            registry: Registry::new(),
            pool,
            replies: ReplyPort::new(rx),
            main_loop,
        }
    }

    /// Bind `element` to a new player.
    pub fn init(&mut self, element: ElementId, options: PlayerOptions) -> InitStatus {
        if !self.policy.supported {
            tracing::debug!(%element, "platform unsupported, init ignored");
            return InitStatus::Unsupported;
        }
        if self.registry.by_element(element).is_some()
            || self.pool.waiting().any(|p| p.element == element)
        {
            return InitStatus::AlreadyActive;
        }

        match self.pool.ensure_ready(PendingInit { element, options }) {
            Ok(Some(pending)) => self.start_player(pending),
            Ok(None) => InitStatus::Queued,
            Err(e) => {
                tracing::warn!(%element, error = %e, "decode pool unavailable");
                InitStatus::PoolUnavailable
            }
        }
    }

    fn measure(&self, element: ElementId, options: &PlayerOptions) -> PixelSize {
        let fallback = f64::from(self.opts.fallback_size);
        let (w, h) = match self.host.client_size(element) {
            Some(s) if s.width > 0.0 && s.height > 0.0 => (s.width, s.height),
            _ => (fallback, fallback),
        };
        let ratio = options.device_ratio(self.host.device_pixel_ratio());
        PixelSize::new((w * ratio).trunc() as u32, (h * ratio).trunc() as u32)
    }

    fn start_player(&mut self, pending: PendingInit) -> InitStatus {
        let PendingInit { element, options } = pending;
        if self.registry.by_element(element).is_some() {
            return InitStatus::AlreadyActive;
        }
        let Some(url) = self
            .host
            .animation_source(element)
            .filter(|u| !u.is_empty())
        else {
            tracing::warn!(%element, "animation source not found");
            return InitStatus::NoSource;
        };
        let Some(worker) = self.pool.assign() else {
            return InitStatus::PoolUnavailable;
        };

        let size = self.measure(element, &options);
        let req_id = self.registry.mint();
        self.registry
            .insert(Player::new(req_id, element, size, worker, options));
        tracing::debug!(%req_id, %element, %worker, %size, url = %url, "player created");

        if let Some(ch) = self.pool.channel(worker) {
            ch.call(Request::Load { req_id, url, size });
        }
        InitStatus::Started(req_id)
    }

    /// Destroy the player bound to `element`. Idempotent.
    pub fn destroy(&mut self, element: ElementId) {
        self.pool.retain_waiting(|p| p.element != element);
        let Some(req_id) = self.registry.by_element(element) else {
            return;
        };
        let Some(player) = self.registry.remove(req_id) else {
            return;
        };
        if let Some(ch) = self.pool.channel(player.worker) {
            ch.call(Request::Destroy { req_id });
        }
        self.host.detach_surface(element);
        self.main_loop.setup(self.registry.has_loaded());
        tracing::debug!(%req_id, %element, "player destroyed");
    }

    /// Destroy every player and terminate the worker pool. A later init starts a new pool.
    pub fn destroy_all(&mut self) {
        for player in self.registry.drain() {
            self.host.detach_surface(player.element);
        }
        self.pool.destroy_all();
        self.main_loop.setup(false);
    }

    /// Pause the player bound to `element`.
    pub fn pause(&mut self, element: ElementId) {
        if let Some(player) = self.player_mut(element) {
            player.paused = true;
        }
    }

    /// Resume the player bound to `element`. A play-once player that finished restarts from its
    /// first frame.
    pub fn play(&mut self, element: ElementId) {
        let Some(player) = self.player_mut(element) else {
            return;
        };
        player.paused = false;
        let req_id = player.req_id;
        let restart = match player.playback.as_mut() {
            Some(pb) if pb.ended && !pb.in_flight && pb.queue.is_empty() => {
                pb.ended = false;
                true
            }
            _ => false,
        };
        if restart {
            tracing::debug!(%req_id, "restarting play-once animation");
            self.request_frame(req_id, 0);
        }
    }

    /// Re-measure `element` and rebuild its pipeline at the new size.
    pub fn resize(&mut self, element: ElementId) -> bool {
        let Some(req_id) = self.registry.by_element(element) else {
            return false;
        };
        let Some(player) = self.registry.get(req_id) else {
            return false;
        };
        let size = self.measure(element, &player.options);
        if size == player.size {
            return false;
        }

        let Some(player) = self.registry.get_mut(req_id) else {
            return false;
        };
        let loaded = player.playback.is_some();
        let restart = player.flush_for_resize(size);
        let worker = player.worker;
        if loaded {
            self.host.resize_surface(element, size);
        }
        if let Some(ch) = self.pool.channel(worker) {
            ch.call(Request::Resize { req_id, size });
        }
        tracing::debug!(%req_id, %size, "player resized");
        if let Some(frame) = restart {
            self.request_frame(req_id, frame);
        }
        true
    }

    /// Dispatch every reply that is already available. Returns how many were handled.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Some(msg) = self.replies.try_next() {
            self.dispatch(msg);
            handled += 1;
        }
        handled
    }

    /// Block up to `timeout` for the next reply, then dispatch everything available.
    pub fn wait(&mut self, timeout: Duration) -> usize {
        match self.replies.next_timeout(timeout) {
            Some(msg) => {
                self.dispatch(msg);
                1 + self.poll()
            }
            None => 0,
        }
    }

    fn dispatch(&mut self, msg: Inbound) {
        let Inbound { worker, reply } = msg;
        if !self.pool.is_current(worker) {
            tracing::trace!(%worker, "reply from terminated pool dropped");
            return;
        }
        match reply {
            Reply::Ready => {
                for pending in self.pool.on_ready(worker) {
                    let element = pending.element;
                    let status = self.start_player(pending);
                    tracing::debug!(%element, ?status, "queued init completed");
                }
            }
            Reply::Loaded {
                req_id,
                frame_count,
                fps,
            } => self.on_loaded(req_id, frame_count, fps),
            Reply::Frame {
                req_id,
                frame,
                size,
                pixels,
            } => self.on_frame(req_id, frame, size, pixels),
            Reply::Failed {
                req_id,
                stage,
                reason,
            } => self.on_failed(req_id, stage, &reason),
        }
    }

    fn on_loaded(&mut self, req_id: RequestId, frame_count: u32, fps: f64) {
        let now = self.host.now();
        let Some(player) = self.registry.get_mut(req_id) else {
            tracing::trace!(%req_id, "loaded for unknown player dropped");
            return;
        };
        if frame_count == 0 {
            tracing::warn!(%req_id, "animation has no frames, player dropped");
            let worker = player.worker;
            self.registry.remove(req_id);
            if let Some(ch) = self.pool.channel(worker) {
                ch.call(Request::Destroy { req_id });
            }
            return;
        }

        let fps = Fps::clamped(Some(fps));
        player.playback = Some(Playback::new(frame_count, fps, now));
        let (element, size) = (player.element, player.size);
        self.host.attach_surface(element, size);
        tracing::debug!(%req_id, frame_count, fps = fps.as_f64(), "player loaded");

        self.main_loop.setup(true);
        self.request_frame(req_id, 0);
    }

    fn on_frame(&mut self, req_id: RequestId, frame: u32, size: PixelSize, pixels: Vec<u8>) {
        let Some(player) = self.registry.get_mut(req_id) else {
            tracing::trace!(%req_id, frame, "frame for unknown player dropped");
            return;
        };
        if player.dead {
            return;
        }
        let Some(pb) = player.playback.as_mut() else {
            return;
        };
        if size != player.size || pixels.len() != size.byte_len() {
            pb.in_flight = false;
            let again = pb.resume_at.take().unwrap_or(frame);
            tracing::debug!(%req_id, frame, again, "frame decoded at stale size, re-requesting");
            self.request_frame(req_id, again);
            return;
        }

        if let Some(next) = player.accept_frame(frame, FramePixels::Owned(pixels)) {
            self.request_frame(req_id, next);
        }
    }

    fn on_failed(&mut self, req_id: RequestId, stage: FailedStage, reason: &str) {
        match stage {
            FailedStage::Load => {
                if self.registry.remove(req_id).is_some() {
                    tracing::debug!(%req_id, reason, "load failed, player dropped");
                    self.main_loop.setup(self.registry.has_loaded());
                }
            }
            FailedStage::Render => {
                if let Some(player) = self.registry.get_mut(req_id) {
                    player.dead = true;
                    if let Some(pb) = player.playback.as_mut() {
                        pb.in_flight = false;
                    }
                    tracing::debug!(%req_id, reason, "decode failed, player marked dead");
                }
            }
        }
    }

    /// Issue the decode request for `frame`, serving it from the frame cache when possible. Cache
    /// hits feed the queue immediately and keep advancing until a real decode is needed or the
    /// queue is full.
    fn request_frame(&mut self, req_id: RequestId, frame: u32) {
        let mut frame = frame;
        loop {
            let Some(player) = self.registry.get_mut(req_id) else {
                return;
            };
            if player.dead {
                return;
            }
            let Some(frame_count) = player.frame_count() else {
                return;
            };
            if frame >= frame_count {
                return;
            }

            if let Some(pixels) = player.cache.get(frame) {
                tracing::trace!(%req_id, frame, "frame served from cache");
                match player.accept_frame(frame, FramePixels::Shared(pixels)) {
                    Some(next) => {
                        frame = next;
                        continue;
                    }
                    None => return,
                }
            }

            let buffer = match self.policy.buffer_mode {
                BufferMode::Transfer => Some(take_scratch(
                    &mut player.scratch,
                    player.size.byte_len(),
                )),
                BufferMode::Copy => None,
            };
            let Some(ch) = self.pool.channel(player.worker) else {
                return;
            };
            if let Some(pb) = player.playback.as_mut() {
                pb.in_flight = true;
            }
            ch.call(Request::Render {
                req_id,
                frame,
                buffer,
            });
            return;
        }
    }

    /// Run one pass of the render loop and return the next wake, if any.
    pub fn tick(&mut self) -> Option<Wake> {
        let now = self.host.now();
        let recheck = self.main_loop.viewport_recheck_due(now);
        let mut presented = false;

        for req_id in self.registry.ids() {
            let due = self
                .registry
                .get(req_id)
                .and_then(|p| p.playback.as_ref())
                .is_some_and(|pb| pb.is_due(now));
            if due && self.render_player(req_id, now, recheck) {
                presented = true;
            }
        }

        self.main_loop
            .finish_tick(now, presented, recheck, self.registry.has_loaded());
        self.next_wake()
    }

    fn render_player(&mut self, req_id: RequestId, now: Duration, recheck: bool) -> bool {
        let Some(player) = self.registry.get_mut(req_id) else {
            return false;
        };
        if !gate::permits(player, &self.host, recheck) {
            return false;
        }
        let Some((frame, next)) = player.take_frame(now) else {
            return false;
        };

        self.host
            .present(player.element, player.size, frame.pixels.as_slice());
        if player.placeholder {
            self.host.remove_placeholder(player.element);
            player.placeholder = false;
        }
        player.presented += 1;
        tracing::trace!(%req_id, frame = frame.index, "frame presented");
        player.recycle(frame.pixels);

        if let Some(next) = next {
            self.request_frame(req_id, next);
        }
        true
    }

    /// When the render loop wants to run next; `None` while idle.
    pub fn next_wake(&self) -> Option<Wake> {
        match self.main_loop.state() {
            LoopState::Idle => None,
            LoopState::Armed(wake) => Some(wake),
        }
    }

    /// Current render loop state.
    pub fn loop_state(&self) -> LoopState {
        self.main_loop.state()
    }

    fn player_mut(&mut self, element: ElementId) -> Option<&mut Player> {
        let req_id = self.registry.by_element(element)?;
        self.registry.get_mut(req_id)
    }

    /// Lifecycle phase of the player bound to `element`.
    pub fn phase(&self, element: ElementId) -> Option<PlayerPhase> {
        let req_id = self.registry.by_element(element)?;
        self.registry.get(req_id).map(Player::phase)
    }

    /// Diagnostic snapshot of the player bound to `element`.
    pub fn player_info(&self, element: ElementId) -> Option<PlayerInfo> {
        let req_id = self.registry.by_element(element)?;
        let p = self.registry.get(req_id)?;
        let pb = p.playback.as_ref();
        Some(PlayerInfo {
            req_id,
            worker: p.worker,
            size: p.size,
            frame_count: pb.map(|pb| pb.frame_count),
            fps: pb.map(|pb| pb.fps.as_f64()),
            queued: pb.map_or(0, |pb| pb.queue.len()),
            queue_capacity: pb.map(|pb| pb.queue.capacity()),
            cached: p.cache.len(),
            presented: p.presented,
            phase: p.phase(),
        })
    }

    /// Number of live players.
    pub fn player_count(&self) -> usize {
        self.registry.len()
    }

    /// Init requests waiting for the pool to become ready.
    pub fn pending_inits(&self) -> usize {
        self.pool.pending()
    }

    /// Workers spawned by the current pool generation.
    pub fn spawned_workers(&self) -> usize {
        self.pool.spawned()
    }

    /// Current pool generation.
    pub fn pool_generation(&self) -> u32 {
        self.pool.generation()
    }

    /// Whether every worker of the current generation reported ready.
    pub fn pool_ready(&self) -> bool {
        self.pool.is_ready()
    }

    /// The resolved platform policy.
    pub fn policy(&self) -> PlatformPolicy {
        self.policy
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

#[cfg(test)]
#[path = "../tests/unit/orchestrator.rs"]
mod tests;
