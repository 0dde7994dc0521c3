//! Frame-level gesture detectors.
//!
//! Each detector looks at one [`FrameSnapshot`] and nothing else. The
//! thresholds are deliberately coarse; landmark noise between frames is
//! absorbed later by the stabilizer.

use serde::{Deserialize, Serialize};

use gestura_hand_model::frame::FrameSnapshot;
use gestura_hand_model::gesture::GestureCandidate;
use gestura_hand_model::landmark::Side;

use crate::pose::{is_fist, is_flat};

/// Geometric thresholds, all in normalized frame units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Zoom in: maximum centroid distance between the two fists.
    pub zoom_in_max_distance: f64,

    /// Zoom in/out: maximum vertical offset between the two fists.
    pub max_vertical_offset: f64,

    /// Zoom out: minimum horizontal centroid separation.
    pub zoom_out_min_spread: f64,

    /// Stop: the flat left hand's centroid must sit at or left of this x.
    pub stop_max_x: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            zoom_in_max_distance: 0.15,
            max_vertical_offset: 0.05,
            zoom_out_min_spread: 0.35,
            stop_max_x: 0.2,
        }
    }
}

/// Evaluates frames against the two-hand and one-hand gesture patterns.
#[derive(Debug, Clone, Default)]
pub struct GestureDetector {
    config: DetectorConfig,
}

impl GestureDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// First matching candidate in priority order: zoom in, zoom out, stop.
    pub fn classify(&self, frame: &FrameSnapshot) -> GestureCandidate {
        if self.detect_zoom_in(frame) {
            GestureCandidate::ZoomIn
        } else if self.detect_zoom_out(frame) {
            GestureCandidate::ZoomOut
        } else if self.detect_stop(frame) {
            GestureCandidate::Stop
        } else {
            GestureCandidate::None
        }
    }

    /// Two fists brought close together at similar height.
    pub fn detect_zoom_in(&self, frame: &FrameSnapshot) -> bool {
        let Some(((lx, ly), (rx, ry))) = fisted_pair(frame) else {
            return false;
        };
        let dist = ((lx - rx).powi(2) + (ly - ry).powi(2)).sqrt();
        dist <= self.config.zoom_in_max_distance
            && (ly - ry).abs() <= self.config.max_vertical_offset
    }

    /// Two fists spread apart horizontally and level.
    pub fn detect_zoom_out(&self, frame: &FrameSnapshot) -> bool {
        let Some(((lx, ly), (rx, ry))) = fisted_pair(frame) else {
            return false;
        };
        (lx - rx).abs() >= self.config.zoom_out_min_spread
            && (ly - ry).abs() <= self.config.max_vertical_offset
    }

    /// A single flat left hand held out at the left edge of the frame.
    pub fn detect_stop(&self, frame: &FrameSnapshot) -> bool {
        if frame.hand_count() != 1 {
            return false;
        }
        let hand = &frame.hands[0];
        if hand.side() != Side::Left || !is_flat(hand) {
            return false;
        }
        hand.centroid().0 <= self.config.stop_max_x
    }
}

/// Centroids of a left and a right fist when the frame holds exactly those two hands.
fn fisted_pair(frame: &FrameSnapshot) -> Option<((f64, f64), (f64, f64))> {
    if frame.hand_count() != 2 {
        return None;
    }
    let (left, right) = frame.left_right();
    let (left, right) = (left?, right?);
    if !is_fist(left) || !is_fist(right) {
        return None;
    }
    Some((left.centroid(), right.centroid()))
}
