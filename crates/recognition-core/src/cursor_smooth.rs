//! Streaming cursor smoothing for direct-control mode.
//!
//! Positions arrive one per frame in integer screen pixels and leave the
//! same way, so every smoothed value is truncated toward zero.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Available smoothing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SmoothingAlgorithm {
    /// Exponential moving average: `next = prev * (1 - alpha) + raw * alpha`.
    ///
    /// `alpha` is in [0.0, 1.0]; larger values follow the raw pointer more closely.
    Ema { alpha: f64 },

    /// Mean of the last `window` raw samples.
    MovingAverage { window: usize },

    /// Pass raw positions through.
    None,
}

impl Default for SmoothingAlgorithm {
    fn default() -> Self {
        Self::Ema { alpha: 0.5 }
    }
}

/// Cursor smoothing engine holding the previous output.
#[derive(Debug, Clone)]
pub struct CursorSmoother {
    algorithm: SmoothingAlgorithm,
    last: Option<(i32, i32)>,
    recent: VecDeque<(i32, i32)>,
}

impl CursorSmoother {
    pub fn new(algorithm: SmoothingAlgorithm) -> Self {
        Self {
            algorithm,
            last: None,
            recent: VecDeque::new(),
        }
    }

    pub fn algorithm(&self) -> SmoothingAlgorithm {
        self.algorithm
    }

    /// Previous smoothed position, if any since the last reset.
    pub fn last(&self) -> Option<(i32, i32)> {
        self.last
    }

    /// Feed one raw position and get the smoothed one back.
    ///
    /// The first sample after a reset passes through unchanged.
    pub fn update(&mut self, raw: (i32, i32)) -> (i32, i32) {
        let next = match (self.algorithm, self.last) {
            (SmoothingAlgorithm::Ema { alpha }, Some((px, py))) => {
                let alpha = clamp01(alpha);
                (
                    (px as f64 * (1.0 - alpha) + raw.0 as f64 * alpha) as i32,
                    (py as f64 * (1.0 - alpha) + raw.1 as f64 * alpha) as i32,
                )
            }
            (SmoothingAlgorithm::MovingAverage { window }, _) => {
                self.recent.push_back(raw);
                while self.recent.len() > window.max(1) {
                    self.recent.pop_front();
                }
                let n = self.recent.len() as f64;
                let (sx, sy) = self
                    .recent
                    .iter()
                    .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x as f64, sy + y as f64));
                ((sx / n) as i32, (sy / n) as i32)
            }
            _ => raw,
        };
        self.last = Some(next);
        next
    }

    /// Forget history; the next sample passes through unchanged.
    pub fn reset(&mut self) {
        self.last = None;
        self.recent.clear();
    }
}

impl Default for CursorSmoother {
    fn default() -> Self {
        Self::new(SmoothingAlgorithm::default())
    }
}

fn clamp01(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_halves_the_gap() {
        let mut s = CursorSmoother::default();
        assert_eq!(s.update((100, 100)), (100, 100));
        assert_eq!(s.update((200, 101)), (150, 100));
        assert_eq!(s.update((200, 101)), (175, 100));
        assert_eq!(s.last(), Some((175, 100)));
    }

    #[test]
    fn test_reset_passes_next_sample_through() {
        let mut s = CursorSmoother::default();
        s.update((0, 0));
        s.reset();
        assert_eq!(s.last(), None);
        assert_eq!(s.update((640, 480)), (640, 480));
    }

    #[test]
    fn test_moving_average_window() {
        let mut s = CursorSmoother::new(SmoothingAlgorithm::MovingAverage { window: 2 });
        s.update((0, 0));
        assert_eq!(s.update((10, 20)), (5, 10));
        assert_eq!(s.update((20, 40)), (15, 30));
    }

    #[test]
    fn test_none_passes_through() {
        let mut s = CursorSmoother::new(SmoothingAlgorithm::None);
        s.update((1, 1));
        assert_eq!(s.update((9, 9)), (9, 9));
    }
}
