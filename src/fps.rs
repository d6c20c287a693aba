use std::collections::VecDeque;
use std::time::Instant;

const WINDOW: usize = 5;

/// Frame rate over the last few frame timestamps.
pub struct FpsMeter {
    stamps: VecDeque<Instant>,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self {
            stamps: VecDeque::with_capacity(WINDOW + 1),
        }
    }
}

impl FpsMeter {
    /// Records a frame and returns the current rate once the window is full.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        self.stamps.push_back(now);
        if self.stamps.len() <= WINDOW {
            return None;
        }
        self.stamps.pop_front();

        let first = *self.stamps.front()?;
        let last = *self.stamps.back()?;
        let span = last.duration_since(first).as_secs_f64();
        if span <= 0.0 {
            return None;
        }
        Some((self.stamps.len() - 1) as f64 / span)
    }
}
