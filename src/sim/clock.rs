//! Frame delta source and session countdown
//!
//! The host passes its animation-frame timestamp; the clock turns it into a
//! delta and folds the one-second countdown into the same time base, so pausing
//! (not calling `frame`) suspends both at once.

const MS_PER_SECOND: f64 = 1000.0;

#[derive(Debug, Clone)]
pub struct TimingClock {
    /// Timestamp of the previous frame; None right after start/resume
    last_frame_ms: Option<f64>,
    /// Progress toward the next whole second
    countdown_ms: f64,
    time_left: u32,
}

impl TimingClock {
    pub fn new(seconds: u32) -> Self {
        Self {
            last_frame_ms: None,
            countdown_ms: 0.0,
            time_left: seconds,
        }
    }

    /// Restore a full countdown and clear the frame baseline
    pub fn reset(&mut self, seconds: u32) {
        *self = Self::new(seconds);
    }

    /// Forget the previous frame so the next delta is zero (no catch-up)
    pub fn reset_baseline(&mut self) {
        self.last_frame_ms = None;
    }

    /// Wall-clock delta since the previous frame, never negative
    pub fn frame_delta(&mut self, now_ms: f64) -> f64 {
        let delta = match self.last_frame_ms {
            Some(last) => (now_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);
        delta
    }

    /// Run the countdown forward; returns how many whole seconds elapsed
    pub fn advance_countdown(&mut self, delta_ms: f64) -> u32 {
        if self.time_left == 0 {
            return 0;
        }
        self.countdown_ms += delta_ms.max(0.0);
        let mut ticked = 0;
        while self.countdown_ms >= MS_PER_SECOND && self.time_left > 0 {
            self.countdown_ms -= MS_PER_SECOND;
            self.time_left -= 1;
            ticked += 1;
        }
        ticked
    }

    /// Whole seconds remaining
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn expired(&self) -> bool {
        self.time_left == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_has_zero_delta() {
        let mut clock = TimingClock::new(60);
        assert_eq!(clock.frame_delta(5000.0), 0.0);
        assert_eq!(clock.frame_delta(5016.0), 16.0);
    }

    #[test]
    fn test_long_frames_keep_wall_time() {
        let mut clock = TimingClock::new(60);
        clock.frame_delta(0.0);
        assert_eq!(clock.frame_delta(250.0), 250.0);
        assert_eq!(clock.frame_delta(10_000.0), 9_750.0);
        // Timestamps going backwards never produce negative time
        assert_eq!(clock.frame_delta(9_000.0), 0.0);
    }

    #[test]
    fn test_reset_baseline_skips_gap() {
        let mut clock = TimingClock::new(60);
        clock.frame_delta(1000.0);
        clock.reset_baseline();
        assert_eq!(clock.frame_delta(4000.0), 0.0);
        assert_eq!(clock.frame_delta(4020.0), 20.0);
    }

    #[test]
    fn test_countdown_ticks_per_second() {
        let mut clock = TimingClock::new(3);
        assert_eq!(clock.advance_countdown(999.0), 0);
        assert_eq!(clock.time_left(), 3);
        assert_eq!(clock.advance_countdown(1.0), 1);
        assert_eq!(clock.time_left(), 2);
        assert_eq!(clock.advance_countdown(5000.0), 2);
        assert!(clock.expired());
        assert_eq!(clock.advance_countdown(1000.0), 0);
    }
}
