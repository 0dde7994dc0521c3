//! Live classification debouncer.
//!
//! Feeds a sliding window of one hand's landmark vectors to a sequence
//! classifier every frame once the window is full, and only lets a label
//! through after it has repeated `min_stable_count` times in a row and the
//! cooldown since the previous dispatch has passed.

use serde::{Deserialize, Serialize};

use gestura_common::clock::{SessionClock, TimestampNs};
use gestura_common::error::{GestureError, GestureResult};
use gestura_hand_model::frame::FrameSnapshot;
use gestura_hand_model::gesture::{Classification, GestureLabel};
use gestura_hand_model::landmark::Side;
use gestura_platform_core::SequenceClassifier;

use crate::counters::GestureCounters;
use crate::window::SequenceWindow;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebouncerConfig {
    /// Sliding window length in frames.
    pub window_len: usize,

    /// Consecutive identical predictions needed before dispatch.
    pub min_stable_count: u32,

    /// Minimum time between dispatches.
    pub cooldown_secs: f64,

    /// Hand to track. `None` takes the first hand in each frame.
    pub tracked_side: Option<Side>,
}

impl Default for DebouncerConfig {
    fn default() -> Self {
        Self {
            window_len: 100,
            min_stable_count: 5,
            cooldown_secs: 2.0,
            tracked_side: None,
        }
    }
}

/// Dispatch requires `stable_repeat_count >= min_stable_count` and more than
/// `cooldown_secs` since `last_action_time`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebounceState {
    pub last_label: Option<GestureLabel>,
    pub last_action_time: Option<TimestampNs>,
    pub stable_repeat_count: u32,
}

/// What happened on one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebounceOutcome {
    /// Classifier output, present once the window is full.
    pub prediction: Option<Classification>,

    /// Label that passed the gate this frame.
    pub dispatched: Option<GestureLabel>,
}

#[derive(Debug)]
pub struct ClassificationDebouncer {
    config: DebouncerConfig,
    window: SequenceWindow,
    state: DebounceState,
    counters: GestureCounters,
}

impl ClassificationDebouncer {
    pub fn new(config: DebouncerConfig) -> Self {
        let window = SequenceWindow::new(config.window_len);
        Self {
            config,
            window,
            state: DebounceState::default(),
            counters: GestureCounters::new(),
        }
    }

    pub fn config(&self) -> &DebouncerConfig {
        &self.config
    }

    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    pub fn window(&self) -> &SequenceWindow {
        &self.window
    }

    /// Dispatch counts keyed by label.
    pub fn counters(&self) -> &GestureCounters {
        &self.counters
    }

    /// Push the tracked hand, classify the full window, and apply the gate.
    ///
    /// A frame without the tracked hand leaves the window untouched.
    pub fn observe<C>(&mut self, frame: &FrameSnapshot, classifier: &C) -> GestureResult<DebounceOutcome>
    where
        C: SequenceClassifier + ?Sized,
    {
        let hand = match self.config.tracked_side {
            Some(side) => frame.first_of_side(side),
            None => frame.hands.first(),
        };
        let Some(hand) = hand else {
            return Ok(DebounceOutcome::default());
        };

        self.window.push(hand.flatten());
        if !self.window.is_full() {
            return Ok(DebounceOutcome::default());
        }

        if classifier.window_len() != self.window.capacity() {
            return Err(GestureError::classifier(format!(
                "classifier expects {} frames, window holds {}",
                classifier.window_len(),
                self.window.capacity()
            )));
        }

        let prediction = classifier.classify(self.window.as_slice())?;
        tracing::trace!(label = %prediction.label, score = prediction.score, "Window classified");
        let dispatched = self
            .record(prediction.label, frame.timestamp_ns)
            .then_some(prediction.label);

        Ok(DebounceOutcome {
            prediction: Some(prediction),
            dispatched,
        })
    }

    /// Feed one prediction through the stability and cooldown gate.
    ///
    /// Returns `true` when the label should be dispatched.
    pub fn record(&mut self, label: GestureLabel, now: TimestampNs) -> bool {
        if self.state.last_label == Some(label) {
            self.state.stable_repeat_count = self.state.stable_repeat_count.saturating_add(1);
        } else {
            self.state.stable_repeat_count = 0;
        }
        self.state.last_label = Some(label);

        let cooled = self
            .state
            .last_action_time
            .map_or(true, |last| SessionClock::secs_between(last, now) > self.config.cooldown_secs);

        if self.state.stable_repeat_count >= self.config.min_stable_count && cooled {
            self.state.last_action_time = Some(now);
            let count = self.counters.increment(label);
            tracing::info!(gesture = %label, count, "Classified gesture dispatched");
            true
        } else {
            false
        }
    }

    /// Clear the window and gate state. Counters survive.
    pub fn reset(&mut self) {
        self.window.clear();
        self.state = DebounceState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_NS: u64 = 50_000_000;

    #[test]
    fn test_needs_stable_repeats() {
        let mut d = ClassificationDebouncer::new(DebouncerConfig::default());
        let fired: Vec<bool> = (0..6)
            .map(|i| d.record(GestureLabel::Wave, i * FRAME_NS))
            .collect();
        assert_eq!(fired, vec![false, false, false, false, false, true]);
    }

    #[test]
    fn test_label_change_resets_count() {
        let mut d = ClassificationDebouncer::new(DebouncerConfig::default());
        for i in 0..4 {
            d.record(GestureLabel::Wave, i * FRAME_NS);
        }
        assert!(!d.record(GestureLabel::Shake, 4 * FRAME_NS));
        assert_eq!(d.state().stable_repeat_count, 0);
        assert_eq!(d.state().last_label, Some(GestureLabel::Shake));
    }

    #[test]
    fn test_cooldown_is_strict() {
        let mut d = ClassificationDebouncer::new(DebouncerConfig::default());
        for i in 0..6 {
            d.record(GestureLabel::Wave, i * FRAME_NS);
        }
        let fired_at = 5 * FRAME_NS;
        // Exactly two seconds later is still inside the cooldown.
        assert!(!d.record(GestureLabel::Wave, fired_at + 2_000_000_000));
        assert!(d.record(GestureLabel::Wave, fired_at + 2_050_000_000));
        assert_eq!(d.counters().get(GestureLabel::Wave), 2);
    }
}
