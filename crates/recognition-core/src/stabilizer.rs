//! Gesture stabilization: run-length debounce followed by a visible countdown.
//!
//! # State machine
//!
//! ```text
//! IDLE ──candidate──▶ ACCUMULATING ──run ≥ stable_frames──▶ COUNTING_DOWN
//!   ▲                      │                                    │ remaining hits 0
//!   └──── candidate changes (from any state, no partial credit) ◀─ COMMITTED ─▶ HOLDING
//! ```
//!
//! A commit happens once per continuous hold. After committing, the same
//! candidate must disappear or change before it can commit again.

use serde::{Deserialize, Serialize};

use gestura_hand_model::gesture::GestureCandidate;

use crate::counters::GestureCounters;

/// Frame-count thresholds. Defaults derive from the tracker frame rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Frame rate used to express the countdown in seconds.
    pub fps: u32,

    /// Consecutive identical frames before the countdown starts.
    pub stable_frames: u32,

    /// Countdown length in frames.
    pub countdown_frames: u32,

    /// Frames the last committed gesture stays on display.
    pub display_frames: u32,
}

impl StabilizerConfig {
    /// Half a second to stabilize, three seconds of countdown, two seconds on display.
    pub fn for_fps(fps: u32) -> Self {
        let fps = fps.max(1);
        Self {
            fps,
            stable_frames: (fps / 2).max(1),
            countdown_frames: fps * 3,
            display_frames: fps * 2,
        }
    }
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self::for_fps(20)
    }
}

/// Where the stabilizer stands after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilizerPhase {
    Idle,
    Accumulating,
    CountingDown,
    /// Countdown reached zero this frame.
    Committed,
    /// Already committed; waiting for the candidate to change.
    Holding,
}

/// Session-scoped stabilization state.
///
/// `countdown_active` implies `current_candidate` is not `None` and
/// `stable_run_length >= stable_frames`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StabilizationState {
    pub current_candidate: GestureCandidate,
    pub stable_run_length: u32,
    pub countdown_active: bool,
    pub countdown_remaining: u32,
    pub last_committed: GestureCandidate,
    pub last_committed_display_ttl: u32,
}

/// Result of one [`GestureStabilizer::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilizerUpdate {
    pub phase: StabilizerPhase,

    /// Set exactly once per successful countdown.
    pub committed: Option<GestureCandidate>,

    /// Whole seconds left on the countdown, for the overlay.
    pub countdown_secs_left: Option<u32>,

    /// Last committed gesture while its display TTL lasts.
    pub displaying: Option<GestureCandidate>,
}

/// Debounces per-frame candidates into committed gesture events.
#[derive(Debug, Clone, Default)]
pub struct GestureStabilizer {
    config: StabilizerConfig,
    state: StabilizationState,
    spent: bool,
    counters: GestureCounters,
}

impl GestureStabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    pub fn state(&self) -> &StabilizationState {
        &self.state
    }

    /// Lifetime commit counts keyed by candidate name.
    pub fn counters(&self) -> &GestureCounters {
        &self.counters
    }

    /// Advance one frame with this frame's candidate.
    pub fn update(&mut self, candidate: GestureCandidate) -> StabilizerUpdate {
        if candidate == self.state.current_candidate {
            if !candidate.is_none() {
                self.state.stable_run_length = self.state.stable_run_length.saturating_add(1);
            }
        } else {
            if self.state.countdown_active {
                tracing::debug!(
                    from = %self.state.current_candidate,
                    to = %candidate,
                    "Countdown discarded"
                );
            }
            self.state.current_candidate = candidate;
            self.state.stable_run_length = u32::from(!candidate.is_none());
            self.state.countdown_active = false;
            self.state.countdown_remaining = 0;
            self.spent = false;
        }

        let mut committed = None;
        let mut countdown_secs_left = None;

        if !candidate.is_none()
            && !self.spent
            && self.state.stable_run_length >= self.config.stable_frames
        {
            if !self.state.countdown_active {
                self.state.countdown_active = true;
                self.state.countdown_remaining = self.config.countdown_frames;
                tracing::debug!(gesture = %candidate, frames = self.config.countdown_frames, "Countdown started");
            }

            countdown_secs_left = Some(self.state.countdown_remaining / self.config.fps.max(1));
            self.state.countdown_remaining = self.state.countdown_remaining.saturating_sub(1);

            if self.state.countdown_remaining == 0 {
                let count = candidate.label().map_or(0, |label| self.counters.increment(label));
                self.state.countdown_active = false;
                self.state.last_committed = candidate;
                self.state.last_committed_display_ttl = self.config.display_frames;
                self.spent = true;
                committed = Some(candidate);
                tracing::info!(gesture = %candidate, count, "Gesture committed");
            }
        }

        let displaying = if self.state.last_committed_display_ttl > 0 {
            self.state.last_committed_display_ttl -= 1;
            Some(self.state.last_committed)
        } else {
            None
        };

        StabilizerUpdate {
            phase: self.phase(committed.is_some()),
            committed,
            countdown_secs_left,
            displaying,
        }
    }

    /// Drop any run or countdown in progress. Counters and the display TTL survive.
    pub fn reset(&mut self) {
        self.state.current_candidate = GestureCandidate::None;
        self.state.stable_run_length = 0;
        self.state.countdown_active = false;
        self.state.countdown_remaining = 0;
        self.spent = false;
    }

    fn phase(&self, committed: bool) -> StabilizerPhase {
        if committed {
            StabilizerPhase::Committed
        } else if self.state.countdown_active {
            StabilizerPhase::CountingDown
        } else if self.spent {
            StabilizerPhase::Holding
        } else if self.state.current_candidate.is_none() {
            StabilizerPhase::Idle
        } else {
            StabilizerPhase::Accumulating
        }
    }
}
