//! Gestura Hand Model
//!
//! Defines the core data contracts shared by every stage of the frame tick:
//! - **Landmarks:** 21 ordered 3D keypoints per tracked hand
//! - **Frames:** all hands observed in one tick, plus the recorded JSONL format
//! - **Gestures:** per-tick candidates and classifier labels
//! - **Actions:** commands handed to the input-injection collaborator
//! - **Sequences:** per-frame landmark vectors for sequence classification
//!
//! `x`/`y` are normalized to `[0.0, 1.0]` relative to the camera frame with
//! `y` growing downward; `z` is relative depth.

pub mod action;
pub mod frame;
pub mod gesture;
pub mod landmark;
pub mod sequence;

pub use action::*;
pub use frame::*;
pub use gesture::*;
pub use landmark::*;
pub use sequence::*;
