use std::time::Duration;

/// How the host should wake the render loop next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wake {
    /// Run on the next paint callback.
    Paint,
    /// Run after this delay.
    Timer(Duration),
}

/// Render loop arming state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// No player has metadata; nothing is scheduled.
    Idle,
    /// A wake is pending.
    Armed(Wake),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Cadence {
    pub(crate) short_delay: Duration,
    pub(crate) long_delay: Duration,
    pub(crate) active_window: Duration,
    pub(crate) viewport_recheck: Duration,
}

/// Adaptive wake selection for the single recurring render task.
#[derive(Debug)]
pub(crate) struct MainLoop {
    state: LoopState,
    paint_synced: bool,
    cadence: Cadence,
    last_viewport_check: Option<Duration>,
    last_present: Option<Duration>,
}

impl MainLoop {
    pub(crate) fn new(paint_synced: bool, cadence: Cadence) -> Self {
        Self {
            state: LoopState::Idle,
            paint_synced,
            cadence,
            last_viewport_check: None,
            last_present: None,
        }
    }

    pub(crate) fn state(&self) -> LoopState {
        self.state
    }

    /// Arm or cancel depending on whether any player can be scheduled. An already armed loop keeps
    /// its pending wake.
    pub(crate) fn setup(&mut self, has_loaded: bool) {
        match (self.state, has_loaded) {
            (LoopState::Idle, true) => {
                let first = if self.paint_synced {
                    Wake::Paint
                } else {
                    Wake::Timer(Duration::ZERO)
                };
                tracing::debug!(wake = ?first, "render loop armed");
                self.state = LoopState::Armed(first);
            }
            (LoopState::Armed(_), false) => {
                tracing::debug!("render loop idle");
                self.state = LoopState::Idle;
            }
            _ => {}
        }
    }

    pub(crate) fn viewport_recheck_due(&self, now: Duration) -> bool {
        match self.last_viewport_check {
            None => true,
            Some(at) => now.saturating_sub(at) > self.cadence.viewport_recheck,
        }
    }

    /// Pick the next wake after a tick.
    pub(crate) fn finish_tick(
        &mut self,
        now: Duration,
        presented: bool,
        rechecked: bool,
        has_loaded: bool,
    ) {
        if presented {
            self.last_present = Some(now);
        }
        if rechecked {
            self.last_viewport_check = Some(now);
        }
        if !has_loaded {
            self.setup(false);
            return;
        }

        let active = self
            .last_present
            .is_some_and(|at| now.saturating_sub(at) < self.cadence.active_window);
        let wake = if !active {
            Wake::Timer(self.cadence.long_delay)
        } else if self.paint_synced {
            Wake::Paint
        } else {
            Wake::Timer(self.cadence.short_delay)
        };
        self.state = LoopState::Armed(wake);
    }
}

#[cfg(test)]
#[path = "../tests/unit/scheduler.rs"]
mod tests;
