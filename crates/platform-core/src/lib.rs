//! Gestura platform core contracts.
//!
//! The recognition core never touches cameras, models, or the OS input
//! stack directly. This crate names those collaborators as traits, plus the
//! screen geometry used to turn normalized landmarks into cursor pixels.

use serde::{Deserialize, Serialize};

use gestura_common::error::GestureResult;
use gestura_hand_model::action::ActionCommand;
use gestura_hand_model::frame::FrameSnapshot;
use gestura_hand_model::gesture::Classification;
use gestura_hand_model::landmark::FrameVector;

/// Produces one frame of hand observations per tick.
pub trait HandTracker: Send {
    /// Block until the next frame. `Ok(None)` means the stream has ended.
    ///
    /// A frame containing a malformed hand is reported as an error that
    /// satisfies [`gestura_common::GestureError::is_frame_local`], so the
    /// caller may skip it and keep going.
    fn next_frame(&mut self) -> GestureResult<Option<FrameSnapshot>>;

    /// Tracker name for logging.
    fn name(&self) -> &str;
}

/// Black-box sequence model: fixed-length window in, label and score out.
///
/// Implementations must be deterministic for identical input.
pub trait SequenceClassifier {
    fn classify(&self, window: &[FrameVector]) -> GestureResult<Classification>;

    /// Window length the model expects.
    fn window_len(&self) -> usize;
}

/// Fire-and-forget OS input injection.
pub trait InputInjector: Send {
    fn inject(&mut self, command: &ActionCommand) -> GestureResult<()>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Cues for the best-effort feedback side channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCue {
    ModeEnabled,
    ModeDisabled,
    GestureCommitted,
    Click,
}

/// Best-effort side channel (sounds, haptics). Failures never affect recognition state.
pub trait FeedbackChannel: Send {
    fn play(&mut self, cue: FeedbackCue) -> GestureResult<()>;
}

/// Feedback channel that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentFeedback;

impl FeedbackChannel for SilentFeedback {
    fn play(&mut self, _cue: FeedbackCue) -> GestureResult<()> {
        Ok(())
    }
}

/// Target screen dimensions in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Map a normalized point linearly onto the screen: `screen * coord`.
    pub fn to_pixels(&self, norm_x: f64, norm_y: f64) -> (f64, f64) {
        (
            self.width.max(1) as f64 * norm_x,
            self.height.max(1) as f64 * norm_y,
        )
    }
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

/// Denormalize `[0.0, 1.0]` coordinates back to absolute pixels.
pub fn denormalize_coords(norm_x: f64, norm_y: f64, width: u32, height: u32) -> (i32, i32) {
    let x = (norm_x.clamp(0.0, 1.0) * width.max(1) as f64) as i32;
    let y = (norm_y.clamp(0.0, 1.0) * height.max(1) as f64) as i32;
    (x, y)
}
