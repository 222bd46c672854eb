/// Countdown for a single round.
///
/// `remaining` only moves while the clock is running, never drops below zero,
/// and stays at zero once it gets there (until the clock is reset).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundClock {
    duration: f32,
    remaining: f32,
    is_running: bool,
}

impl RoundClock {
    pub fn new(duration: f32) -> Self {
        let duration = duration.max(0.0);
        RoundClock {
            duration,
            remaining: duration,
            is_running: true,
        }
    }

    /// Advance the clock. Non-positive (or NaN) deltas count as zero.
    pub fn tick(&mut self, delta_seconds: f32) {
        if !self.is_running || !(delta_seconds > 0.0) {
            return;
        }
        self.remaining = (self.remaining - delta_seconds).max(0.0);
    }

    pub fn expired(&self) -> bool {
        self.remaining == 0.0
    }

    /// Whole seconds shown to the player: `ceil(remaining)`.
    /// 9.3s left reads "10", 0.2s left reads "1", and only a finished clock reads "0".
    pub fn display_seconds(&self) -> u32 {
        self.remaining.ceil() as u32
    }

    #[cfg(test)]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn pause(&mut self) {
        self.is_running = false;
    }

    pub fn resume(&mut self) {
        self.is_running = true;
    }

    #[cfg(test)]
    pub fn reset(&mut self) {
        *self = RoundClock::new(self.duration);
    }
}
