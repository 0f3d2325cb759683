//! Inactivity timer that triggers the auto-draw demonstration.

use std::time::Duration;

/// One-shot inactivity timer on an external clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleTimer {
    /// Inactivity needed before the timer fires.
    timeout: Duration,
    /// Time at which the timer fires, if armed.
    deadline: Option<Duration>,
}

impl IdleTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start or restart the countdown from `now`.
    pub fn arm(&mut self, now: Duration) {
        self.deadline = Some(now + self.timeout);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Check whether the timer fired. Fires once per arming.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_timeout() {
        let mut timer = IdleTimer::new(Duration::from_secs(5));
        assert_eq!(timer.timeout(), Duration::from_secs(5));
        timer.arm(Duration::from_secs(1));
        assert!(!timer.poll(Duration::from_millis(5999)));
        assert!(timer.poll(Duration::from_secs(6)));
        assert!(!timer.poll(Duration::from_secs(7)));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_rearm_pushes_deadline() {
        let mut timer = IdleTimer::new(Duration::from_secs(5));
        timer.arm(Duration::ZERO);
        timer.arm(Duration::from_secs(4));
        assert!(!timer.poll(Duration::from_secs(6)));
        assert!(timer.poll(Duration::from_secs(9)));
    }

    #[test]
    fn test_disarmed_never_fires() {
        let mut timer = IdleTimer::new(Duration::ZERO);
        assert!(!timer.poll(Duration::from_secs(100)));
        timer.arm(Duration::ZERO);
        timer.disarm();
        assert!(!timer.poll(Duration::from_secs(100)));
    }
}
