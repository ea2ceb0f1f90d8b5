use std::time::{Duration, Instant};

use super::board::FollowUp;

/// Refresh bookkeeping for views that only run when a request arrives
/// (the web dashboard). Timers become deadlines checked on each page load.
#[derive(Clone, Debug, Default)]
pub struct RefreshSchedule {
    last_refresh: Option<Instant>,
    settle_at: Option<Instant>,
}

impl RefreshSchedule {
    /// True when the board has never been fetched, the poll interval has
    /// elapsed, or a post-action settle deadline has passed.
    pub fn is_due(&self, now: Instant, poll_interval: Duration) -> bool {
        let Some(last) = self.last_refresh else {
            return true;
        };
        if let Some(settle_at) = self.settle_at {
            if now >= settle_at {
                return true;
            }
        }
        now.saturating_duration_since(last) >= poll_interval
    }

    pub fn mark_refreshed(&mut self, now: Instant) {
        self.last_refresh = Some(now);
        self.settle_at = None;
    }

    /// Force a refetch on the next check, e.g. after a launch.
    pub fn expire(&mut self) {
        self.last_refresh = None;
        self.settle_at = None;
    }

    /// Record a follow-up. Returns true when the caller must refetch now.
    pub fn follow_up(&mut self, now: Instant, follow_up: FollowUp) -> bool {
        match follow_up {
            FollowUp::RefetchNow => true,
            FollowUp::RefetchAfter(delay) => {
                self.settle_at = Some(now + delay);
                false
            }
        }
    }

    /// Seconds until the page should reload itself.
    pub fn reload_after(&self, now: Instant, poll_interval: Duration) -> u64 {
        let next = match (self.settle_at, self.last_refresh) {
            (Some(settle_at), _) => settle_at,
            (None, Some(last)) => last + poll_interval,
            (None, None) => now,
        };
        next.saturating_duration_since(now).as_secs().max(1)
    }
}
