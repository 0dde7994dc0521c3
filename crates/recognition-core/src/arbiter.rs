//! Mode arbitration between discrete gestures and direct cursor control.
//!
//! A fist held inside the activation zone for `activation_secs` toggles the
//! mode once. The pose must be released before it can toggle again, and any
//! frame that breaks the pose restarts the hold from zero.
//!
//! In direct mode the activation-side hand points the cursor with its index
//! tip and the other hand clicks (pinch) or drags (fist). An open palm on the
//! pointing side locks out the other hand.

use serde::{Deserialize, Serialize};

use gestura_common::clock::{SessionClock, TimestampNs};
use gestura_hand_model::action::ActionCommand;
use gestura_hand_model::frame::FrameSnapshot;
use gestura_hand_model::landmark::{joint, HandObservation, Side};
use gestura_platform_core::ScreenSize;

use crate::cursor_smooth::{CursorSmoother, SmoothingAlgorithm};
use crate::pose::{is_extended, is_fist, is_okay_gesture_within, is_pointing, is_stop, OK_PINCH_THRESHOLD};

/// The two mutually exclusive control regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    #[default]
    Gesture,
    Direct,
}

impl ControlMode {
    pub fn toggled(&self) -> Self {
        match self {
            Self::Gesture => Self::Direct,
            Self::Direct => Self::Gesture,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gesture => "gesture",
            Self::Direct => "direct",
        }
    }
}

impl std::fmt::Display for ControlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Region the activation hand's wrist must sit in, in normalized frame units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivationZone {
    /// Anchored at the top-left corner: `x < max_x && y < max_y`.
    LeftEdge { max_x: f64, max_y: f64 },

    /// A box around the face region in the middle of the frame.
    NearFace {
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
    },
}

impl ActivationZone {
    pub fn left_edge() -> Self {
        Self::LeftEdge {
            max_x: 0.2,
            max_y: 0.5,
        }
    }

    pub fn near_face() -> Self {
        Self::NearFace {
            min_x: 0.35,
            max_x: 0.65,
            min_y: 0.2,
            max_y: 0.6,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        match *self {
            Self::LeftEdge { max_x, max_y } => x < max_x && y < max_y,
            Self::NearFace {
                min_x,
                max_x,
                min_y,
                max_y,
            } => x > min_x && x < max_x && y > min_y && y < max_y,
        }
    }
}

impl Default for ActivationZone {
    fn default() -> Self {
        Self::left_edge()
    }
}

/// Mode arbiter tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Hand that toggles the mode and points the cursor.
    pub activation_side: Side,

    pub activation_zone: ActivationZone,

    /// Continuous hold needed to toggle.
    pub activation_secs: f64,

    pub smoothing: SmoothingAlgorithm,

    /// Minimum gap between two clicks.
    pub click_refractory_secs: f64,

    /// How long a mode change stays in the status line.
    pub status_display_secs: f64,

    pub pinch_threshold: f64,

    pub screen: ScreenSize,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            activation_side: Side::Left,
            activation_zone: ActivationZone::default(),
            activation_secs: 4.0,
            smoothing: SmoothingAlgorithm::Ema { alpha: 0.5 },
            click_refractory_secs: 0.3,
            status_display_secs: 2.0,
            pinch_threshold: OK_PINCH_THRESHOLD,
            screen: ScreenSize::default(),
        }
    }
}

/// Session-scoped mode state.
///
/// `activation_timer_start` is set only while the activation pose holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeState {
    pub active_mode: ControlMode,
    pub activation_timer_start: Option<TimestampNs>,
    pub last_cursor_position: Option<(i32, i32)>,
    pub is_dragging: bool,
}

/// Result of one [`ModeArbiter::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArbiterOutput {
    /// Mode after this frame.
    pub mode: ControlMode,

    /// Set on the frame the mode toggled.
    pub mode_changed: Option<ControlMode>,

    /// Commands for the input injector, in order.
    pub commands: Vec<ActionCommand>,

    /// Seconds the activation pose has been held so far.
    pub activation_elapsed: Option<f64>,

    /// The pointing hand's open palm suppressed the action hand.
    pub locked: bool,

    /// Recent mode change message for the overlay.
    pub status: Option<&'static str>,
}

/// Held-pose mode toggle plus direct cursor and button control.
#[derive(Debug, Clone)]
pub struct ModeArbiter {
    config: ArbiterConfig,
    state: ModeState,
    smoother: CursorSmoother,
    latched: bool,
    click_blocked_until: TimestampNs,
    status_until: Option<TimestampNs>,
}

impl ModeArbiter {
    pub fn new(config: ArbiterConfig) -> Self {
        let smoother = CursorSmoother::new(config.smoothing);
        Self {
            config,
            state: ModeState::default(),
            smoother,
            latched: false,
            click_blocked_until: 0,
            status_until: None,
        }
    }

    pub fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    pub fn state(&self) -> &ModeState {
        &self.state
    }

    pub fn mode(&self) -> ControlMode {
        self.state.active_mode
    }

    /// Fraction of the activation hold completed, in `[0, 1]`.
    pub fn activation_progress(&self, now: TimestampNs) -> f64 {
        match self.state.activation_timer_start {
            Some(start) if self.config.activation_secs > 0.0 => {
                (SessionClock::secs_between(start, now) / self.config.activation_secs).min(1.0)
            }
            _ => 0.0,
        }
    }

    /// Advance one frame.
    pub fn update(&mut self, frame: &FrameSnapshot) -> ArbiterOutput {
        let now = frame.timestamp_ns;
        let mut out = ArbiterOutput::default();

        if let Some(next) = self.track_activation(frame, now, &mut out) {
            if self.state.active_mode == ControlMode::Direct && self.state.is_dragging {
                out.commands.push(ActionCommand::ButtonUp);
                self.state.is_dragging = false;
            }
            self.state.active_mode = next;
            self.smoother.reset();
            self.state.last_cursor_position = None;
            self.status_until = Some(now.saturating_add(SessionClock::secs_to_ns(
                self.config.status_display_secs,
            )));
            out.mode_changed = Some(next);
            tracing::info!(mode = %next, "Control mode toggled");
        }

        if self.state.active_mode == ControlMode::Direct {
            self.direct_control(frame, now, &mut out);
        }

        out.mode = self.state.active_mode;
        out.status = match self.status_until {
            Some(until) if now < until => Some(match self.state.active_mode {
                ControlMode::Direct => "Mouse mode enabled",
                ControlMode::Gesture => "Mouse mode disabled",
            }),
            _ => None,
        };
        out
    }

    /// Returns the new mode when the hold completes this frame.
    fn track_activation(
        &mut self,
        frame: &FrameSnapshot,
        now: TimestampNs,
        out: &mut ArbiterOutput,
    ) -> Option<ControlMode> {
        let holding = frame
            .first_of_side(self.config.activation_side)
            .is_some_and(|hand| self.activation_pose(hand));

        if !holding {
            if self.state.activation_timer_start.take().is_some() {
                tracing::debug!("Activation hold broken");
            }
            self.latched = false;
            return None;
        }
        if self.latched {
            return None;
        }

        let start = *self.state.activation_timer_start.get_or_insert(now);
        let elapsed = SessionClock::secs_between(start, now);
        out.activation_elapsed = Some(elapsed);

        if elapsed >= self.config.activation_secs {
            self.state.activation_timer_start = None;
            self.latched = true;
            Some(self.state.active_mode.toggled())
        } else {
            None
        }
    }

    fn activation_pose(&self, hand: &HandObservation) -> bool {
        let wrist = hand.wrist();
        is_fist(hand) && self.config.activation_zone.contains(wrist.x, wrist.y)
    }

    fn direct_control(&mut self, frame: &FrameSnapshot, now: TimestampNs, out: &mut ArbiterOutput) {
        let pointer = frame.first_of_side(self.config.activation_side);

        match pointer.filter(|hand| is_pointing(hand)) {
            Some(hand) => {
                let tip = hand.landmark(joint::INDEX_TIP);
                let (px, py) = self.config.screen.to_pixels(tip.x, tip.y);
                let pos = self.smoother.update((px as i32, py as i32));
                self.state.last_cursor_position = Some(pos);
                out.commands.push(ActionCommand::MoveTo { x: pos.0, y: pos.1 });
            }
            None => {
                self.smoother.reset();
                self.state.last_cursor_position = None;
            }
        }

        // A vanished action hand keeps any drag in progress. Opening it
        // releases the button even while the action hand is locked out.
        let action = frame.first_of_side(self.config.activation_side.opposite());
        let fist = action.is_some_and(is_fist);
        if self.state.is_dragging && action.is_some() && !fist {
            out.commands.push(ActionCommand::ButtonUp);
            self.state.is_dragging = false;
        }

        if pointer.is_some_and(is_stop) {
            out.locked = true;
            return;
        }

        let Some(action) = action else {
            return;
        };

        if is_extended(action) {
            return;
        }

        if is_okay_gesture_within(action, self.config.pinch_threshold) {
            if now >= self.click_blocked_until {
                out.commands.push(ActionCommand::Click);
                self.click_blocked_until = now.saturating_add(SessionClock::secs_to_ns(
                    self.config.click_refractory_secs,
                ));
            }
        } else if fist && !self.state.is_dragging {
            out.commands.push(ActionCommand::ButtonDown);
            self.state.is_dragging = true;
        }
    }
}

impl Default for ModeArbiter {
    fn default() -> Self {
        Self::new(ArbiterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::fixtures::{fist, flat, okay, pointing};

    const FRAME_NS: u64 = 50_000_000;

    fn at(i: u64, hands: Vec<HandObservation>) -> FrameSnapshot {
        FrameSnapshot::new(i * FRAME_NS, hands)
    }

    fn activation_fist() -> HandObservation {
        fist(Side::Left, 0.1, 0.3)
    }

    /// Toggle into direct mode and return the next free frame index.
    fn enter_direct(arb: &mut ModeArbiter) -> u64 {
        let mut i = 0;
        while arb.mode() != ControlMode::Direct {
            arb.update(&at(i, vec![activation_fist()]));
            i += 1;
            assert!(i < 200, "never toggled");
        }
        arb.update(&at(i, vec![]));
        i + 1
    }

    #[test]
    fn test_zone_presets() {
        assert!(ActivationZone::left_edge().contains(0.1, 0.3));
        assert!(!ActivationZone::left_edge().contains(0.3, 0.3));
        assert!(ActivationZone::near_face().contains(0.5, 0.4));
        assert!(!ActivationZone::near_face().contains(0.1, 0.4));
    }

    #[test]
    fn test_short_hold_does_not_toggle() {
        let mut arb = ModeArbiter::default();
        // 79 frames at 20 fps: 3.9 s elapsed on the last one.
        for i in 0..79 {
            let out = arb.update(&at(i, vec![activation_fist()]));
            assert!(out.mode_changed.is_none());
        }
        arb.update(&at(79, vec![]));
        assert_eq!(arb.mode(), ControlMode::Gesture);
        assert_eq!(arb.state().activation_timer_start, None);
    }

    #[test]
    fn test_long_hold_toggles_once() {
        let mut arb = ModeArbiter::default();
        let toggles = (0..200)
            .filter(|&i| arb.update(&at(i, vec![activation_fist()])).mode_changed.is_some())
            .count();
        assert_eq!(toggles, 1);
        assert_eq!(arb.mode(), ControlMode::Direct);
    }

    #[test]
    fn test_gap_restarts_hold() {
        let mut arb = ModeArbiter::default();
        for i in 0..60 {
            arb.update(&at(i, vec![activation_fist()]));
        }
        arb.update(&at(60, vec![fist(Side::Left, 0.5, 0.3)]));
        for i in 61..130 {
            arb.update(&at(i, vec![activation_fist()]));
        }
        assert_eq!(arb.mode(), ControlMode::Gesture);
        assert!(arb.activation_progress(129 * FRAME_NS) < 1.0);
    }

    #[test]
    fn test_status_shown_after_toggle() {
        let mut arb = ModeArbiter::default();
        let i = enter_direct(&mut arb);
        assert_eq!(arb.update(&at(i, vec![])).status, Some("Mouse mode enabled"));
        assert_eq!(arb.update(&at(i + 60, vec![])).status, None);
    }

    #[test]
    fn test_pointing_moves_cursor_with_smoothing() {
        let mut arb = ModeArbiter::default();
        let i = enter_direct(&mut arb);

        let first = arb.update(&at(i, vec![pointing(Side::Left, 0.5, 0.5)]));
        let tip = *pointing(Side::Left, 0.5, 0.5).landmark(joint::INDEX_TIP);
        let raw = ((tip.x * 1920.0) as i32, (tip.y * 1080.0) as i32);
        assert_eq!(first.commands, vec![ActionCommand::MoveTo { x: raw.0, y: raw.1 }]);

        let second = arb.update(&at(i + 1, vec![pointing(Side::Left, 0.7, 0.5)]));
        let tip2 = *pointing(Side::Left, 0.7, 0.5).landmark(joint::INDEX_TIP);
        let raw2 = ((tip2.x * 1920.0) as i32, (tip2.y * 1080.0) as i32);
        let expected_x = (raw.0 as f64 * 0.5 + raw2.0 as f64 * 0.5) as i32;
        assert_eq!(
            second.commands,
            vec![ActionCommand::MoveTo {
                x: expected_x,
                y: (raw.1 as f64 * 0.5 + raw2.1 as f64 * 0.5) as i32
            }]
        );

        // A gap resets smoothing, so the next sample snaps.
        arb.update(&at(i + 2, vec![]));
        let snapped = arb.update(&at(i + 3, vec![pointing(Side::Left, 0.7, 0.5)]));
        assert_eq!(snapped.commands, vec![ActionCommand::MoveTo { x: raw2.0, y: raw2.1 }]);
    }

    #[test]
    fn test_click_refractory() {
        let mut arb = ModeArbiter::default();
        let i = enter_direct(&mut arb);
        let pinch = || vec![okay(Side::Right, 0.7, 0.5)];

        let clicks: Vec<_> = (0..10)
            .map(|k| arb.update(&at(i + k, pinch())).commands.contains(&ActionCommand::Click))
            .collect();
        // 0.3 s refractory at 50 ms per frame: clicks on frames 0 and 6.
        assert_eq!(
            clicks,
            vec![true, false, false, false, false, false, true, false, false, false]
        );
    }

    #[test]
    fn test_fist_drags_and_release_ends_it() {
        let mut arb = ModeArbiter::default();
        let i = enter_direct(&mut arb);

        let down = arb.update(&at(i, vec![fist(Side::Right, 0.7, 0.5)]));
        assert_eq!(down.commands, vec![ActionCommand::ButtonDown]);
        assert!(arb.state().is_dragging);

        let held = arb.update(&at(i + 1, vec![fist(Side::Right, 0.7, 0.5)]));
        assert!(held.commands.is_empty());

        // Losing the action hand keeps the drag.
        arb.update(&at(i + 2, vec![]));
        assert!(arb.state().is_dragging);

        let up = arb.update(&at(i + 3, vec![pointing(Side::Right, 0.7, 0.5)]));
        assert_eq!(up.commands, vec![ActionCommand::ButtonUp]);
        assert!(!arb.state().is_dragging);
    }

    #[test]
    fn test_flat_action_hand_is_noop() {
        let mut arb = ModeArbiter::default();
        let i = enter_direct(&mut arb);
        let out = arb.update(&at(i, vec![flat(Side::Right, 0.7, 0.5)]));
        assert!(out.commands.is_empty());
        assert!(!out.locked);
    }

    #[test]
    fn test_stop_palm_locks_action_hand() {
        let mut arb = ModeArbiter::default();
        let i = enter_direct(&mut arb);
        let out = arb.update(&at(
            i,
            vec![flat(Side::Left, 0.3, 0.5), fist(Side::Right, 0.7, 0.5)],
        ));
        assert!(out.locked);
        assert!(out.commands.is_empty());
        assert!(!arb.state().is_dragging);
    }

    #[test]
    fn test_drag_released_under_stop_palm() {
        let mut arb = ModeArbiter::default();
        let i = enter_direct(&mut arb);
        arb.update(&at(i, vec![fist(Side::Right, 0.7, 0.5)]));
        assert!(arb.state().is_dragging);

        // Still clenched under the lockout: the drag holds.
        let held = arb.update(&at(
            i + 1,
            vec![flat(Side::Left, 0.3, 0.5), fist(Side::Right, 0.7, 0.5)],
        ));
        assert!(held.locked);
        assert!(held.commands.is_empty());
        assert!(arb.state().is_dragging);

        let up = arb.update(&at(
            i + 2,
            vec![flat(Side::Left, 0.3, 0.5), flat(Side::Right, 0.7, 0.5)],
        ));
        assert!(up.locked);
        assert_eq!(up.commands, vec![ActionCommand::ButtonUp]);
        assert!(!arb.state().is_dragging);

        // Clenching again while locked starts nothing.
        let relocked = arb.update(&at(
            i + 3,
            vec![flat(Side::Left, 0.3, 0.5), fist(Side::Right, 0.7, 0.5)],
        ));
        assert!(relocked.commands.is_empty());
        assert!(!arb.state().is_dragging);
    }

    #[test]
    fn test_leaving_direct_releases_drag() {
        let mut arb = ModeArbiter::default();
        let mut i = enter_direct(&mut arb);
        arb.update(&at(i, vec![fist(Side::Right, 0.7, 0.5)]));
        i += 1;

        let mut released = false;
        for k in 0..100 {
            let out = arb.update(&at(i + k, vec![activation_fist(), fist(Side::Right, 0.7, 0.5)]));
            if out.mode_changed == Some(ControlMode::Gesture) {
                assert_eq!(out.commands.first(), Some(&ActionCommand::ButtonUp));
                released = true;
                break;
            }
        }
        assert!(released);
        assert!(!arb.state().is_dragging);
    }
}
