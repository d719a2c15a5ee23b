use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    wait: Duration,
    window_ends_at: Option<Instant>,
    trailing_pending: bool,
}

impl Throttle {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            window_ends_at: None,
            trailing_pending: false,
        }
    }

    pub fn call(&mut self, now: Instant) -> bool {
        match self.window_ends_at {
            Some(ends_at) if now < ends_at => {
                self.trailing_pending = true;
                false
            }
            _ => {
                // A leading fire supersedes a trailing call whose deadline passed.
                self.trailing_pending = false;
                self.window_ends_at = Some(now + self.wait);
                true
            }
        }
    }

    pub fn trailing_deadline(&self) -> Option<Instant> {
        if self.trailing_pending {
            self.window_ends_at
        } else {
            None
        }
    }

    pub fn fire_trailing(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.trailing_deadline() else {
            return false;
        };
        if now < deadline {
            return false;
        }

        self.trailing_pending = false;
        self.window_ends_at = Some(now + self.wait);
        true
    }
}
