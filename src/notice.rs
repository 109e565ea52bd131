use std::time::{Duration, Instant};

/// How long the rate-limit banner stays up
pub const RATE_LIMIT_NOTICE_DURATION: Duration = Duration::from_secs(5);
/// How long the "copied" tooltip stays up
pub const COPIED_NOTICE_DURATION: Duration = Duration::from_secs(2);

/// A visibility flag that clears itself after a fixed duration.
///
/// Showing it again while visible restarts the countdown.
#[derive(Debug, Clone)]
pub struct TimedNotice {
    duration: Duration,
    shown_at: Option<Instant>,
}

impl TimedNotice {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            shown_at: None,
        }
    }

    pub fn show(&mut self, now: Instant) {
        self.shown_at = Some(now);
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.shown_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.duration)
    }

    /// Drop the flag once its time is up. Returns true if it was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.shown_at.is_some() && !self.is_visible(now) {
            self.shown_at = None;
            return true;
        }
        false
    }

    pub fn hide(&mut self) {
        self.shown_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_by_default() {
        let notice = TimedNotice::new(RATE_LIMIT_NOTICE_DURATION);
        assert!(!notice.is_visible(Instant::now()));
    }

    #[test]
    fn test_expires_after_duration() {
        let start = Instant::now();
        let mut notice = TimedNotice::new(RATE_LIMIT_NOTICE_DURATION);
        notice.show(start);

        assert!(notice.is_visible(start + Duration::from_secs(4)));
        assert!(!notice.expire(start + Duration::from_secs(4)));
        assert!(!notice.is_visible(start + Duration::from_secs(5)));
        assert!(notice.expire(start + Duration::from_secs(5)));
        assert!(!notice.expire(start + Duration::from_secs(6)));
    }

    #[test]
    fn test_show_again_restarts() {
        let start = Instant::now();
        let mut notice = TimedNotice::new(COPIED_NOTICE_DURATION);
        notice.show(start);
        notice.show(start + Duration::from_secs(1));
        assert!(notice.is_visible(start + Duration::from_millis(2500)));
    }
}
