use std::time::{Duration, Instant};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Recurring tick driven by the page's event loop. The loop polls with the
/// current time; the timer reports at most one due tick per poll and never
/// fires again once cancelled.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl IntervalTimer {
    pub fn start(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: Some(now + period),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns `true` when a tick is due at `now` and schedules the next one.
    /// Missed periods are coalesced into a single tick.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        let mut next = due + self.period;
        while next <= now {
            next += self.period;
        }
        self.next_due = Some(next);
        true
    }

    /// Returns `true` only for the call that actually stopped the timer.
    pub fn cancel(&mut self) -> bool {
        self.next_due.take().is_some()
    }
}
