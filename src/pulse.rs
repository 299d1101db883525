use std::time::{Duration, Instant};

/// How long a keystroke stays lit on the keyboard diagram.
pub const PULSE_DURATION: Duration = Duration::from_millis(150);

/// Short visual pulse for the most recent keystroke.
///
/// Each press replaces the previous one and restarts the deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyPulse {
    key: Option<char>,
    expires_at: Option<Instant>,
}

impl KeyPulse {
    pub fn press(&mut self, key: char, now: Instant) {
        self.key = Some(key);
        self.expires_at = Some(now + PULSE_DURATION);
    }

    /// Clear the pulse once its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.expires_at.is_some_and(|deadline| now >= deadline) {
            self.cancel();
        }
    }

    pub fn cancel(&mut self) {
        self.key = None;
        self.expires_at = None;
    }

    pub fn key(&self) -> Option<char> {
        self.key
    }
}
