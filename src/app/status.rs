use std::time::{Duration, Instant};

pub const READY_STATUS: &str = "Ready. Press Ctrl+S to save.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestStatus {
    Idle,
    Loading,
    Success(String),
    Error(String),
}

/// Loading / success / error transitions for one request, with success and
/// error outcomes falling back to idle after `reset_after`.
#[derive(Debug, Clone)]
pub struct RequestTracker {
    status: RequestStatus,
    settled_at: Option<Instant>,
    reset_after: Duration,
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self {
            status: RequestStatus::Idle,
            settled_at: None,
            reset_after: Duration::from_secs(3),
        }
    }
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reset_after(mut self, reset_after: Duration) -> Self {
        self.reset_after = reset_after;
        self
    }

    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == RequestStatus::Loading
    }

    pub fn start(&mut self) {
        self.status = RequestStatus::Loading;
        self.settled_at = None;
    }

    pub fn succeed(&mut self, message: impl Into<String>, now: Instant) {
        self.status = RequestStatus::Success(message.into());
        self.settled_at = Some(now);
    }

    pub fn fail(&mut self, message: impl Into<String>, now: Instant) {
        self.status = RequestStatus::Error(message.into());
        self.settled_at = Some(now);
    }

    /// Resets a settled outcome to idle once `reset_after` has elapsed.
    /// Returns whether the status changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(settled_at) = self.settled_at else {
            return false;
        };
        if now.saturating_duration_since(settled_at) < self.reset_after {
            return false;
        }
        self.status = RequestStatus::Idle;
        self.settled_at = None;
        true
    }

    pub fn message(&self) -> &str {
        match &self.status {
            RequestStatus::Idle => READY_STATUS,
            RequestStatus::Loading => "Working...",
            RequestStatus::Success(message) | RequestStatus::Error(message) => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settled_outcomes_reset_after_delay() {
        let start = Instant::now();
        let mut tracker = RequestTracker::new().with_reset_after(Duration::from_millis(500));
        tracker.start();
        assert!(tracker.is_loading());
        tracker.succeed("Order saved", start);
        assert_eq!(tracker.message(), "Order saved");
        assert!(!tracker.tick(start + Duration::from_millis(100)));
        assert!(tracker.tick(start + Duration::from_millis(500)));
        assert_eq!(tracker.status(), &RequestStatus::Idle);
        assert_eq!(tracker.message(), READY_STATUS);
    }

    #[test]
    fn loading_never_resets_on_its_own() {
        let start = Instant::now();
        let mut tracker = RequestTracker::new();
        tracker.start();
        assert!(!tracker.tick(start + Duration::from_secs(60)));
        assert!(tracker.is_loading());
    }

    #[test]
    fn errors_keep_their_message_until_reset() {
        let start = Instant::now();
        let mut tracker = RequestTracker::new();
        tracker.fail("Quantity must be a number", start);
        assert_eq!(
            tracker.status(),
            &RequestStatus::Error("Quantity must be a number".into())
        );
        assert!(tracker.tick(start + Duration::from_secs(3)));
    }
}
