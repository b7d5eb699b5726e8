use std::time::{Duration, Instant};

use crate::host::Host;
use crate::orchestrator::Orchestrator;
use crate::scheduler::Wake;

/// Interval a [`Wake::Paint`] stands for when there is no real display to sync with.
pub const PAINT_INTERVAL: Duration = Duration::from_millis(16);

/// Counters collected by [`run_for`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Render loop passes.
    pub ticks: u64,
    /// Passes woken as paint callbacks.
    pub paint_wakes: u64,
    /// Passes woken by timers.
    pub timer_wakes: u64,
    /// Worker replies dispatched.
    pub replies: u64,
}

fn wake_delay(wake: Wake) -> Duration {
    match wake {
        Wake::Paint => PAINT_INTERVAL,
        Wake::Timer(d) => d,
    }
}

/// Drive `orch` in real time for `duration`: dispatch replies as they arrive and run the render
/// loop whenever its wake is due. The host's clock should be a real one.
pub fn run_for<H: Host>(orch: &mut Orchestrator<H>, duration: Duration) -> DriverStats {
    let mut stats = DriverStats::default();
    let deadline = Instant::now() + duration;
    let mut armed_at: Option<(Instant, Wake)> = None;

    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }

        let wake = orch.next_wake();
        armed_at = match (armed_at, wake) {
            (_, None) => None,
            (Some((at, _)), Some(w)) => Some((at, w)),
            (None, Some(w)) => Some((now, w)),
        };

        let due = armed_at.map(|(at, w)| at + wake_delay(w));
        match due {
            Some(due) if now >= due => {
                stats.replies += orch.poll() as u64;
                match armed_at.map(|(_, w)| w) {
                    Some(Wake::Paint) => stats.paint_wakes += 1,
                    Some(Wake::Timer(_)) => stats.timer_wakes += 1,
                    None => {}
                }
                stats.ticks += 1;
                armed_at = orch.tick().map(|w| (Instant::now(), w));
            }
            Some(due) => {
                let until = due.min(deadline).saturating_duration_since(now);
                stats.replies += orch.wait(until) as u64;
            }
            None => {
                let until = deadline.saturating_duration_since(now);
                stats.replies += orch.wait(until) as u64;
            }
        }
    }

    tracing::debug!(
        ticks = stats.ticks,
        replies = stats.replies,
        "driver finished"
    );
    stats
}
