//! Landmark and hand observation types.

use serde::{Deserialize, Serialize};

use gestura_common::error::{GestureError, GestureResult};

/// Landmarks per tracked hand.
pub const LANDMARK_COUNT: usize = 21;

/// Values in one flattened hand vector (21 landmarks × xyz).
pub const CHANNELS: usize = LANDMARK_COUNT * 3;

/// One flattened per-frame hand vector.
pub type FrameVector = [f64; CHANNELS];

/// Named landmark indices in tracker order.
pub mod joint {
    pub const WRIST: usize = 0;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP: usize = 14;
    pub const RING_TIP: usize = 16;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;
}

/// A single 3D keypoint. Serialized as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Planar (x, y) Euclidean distance.
    pub fn distance_xy(&self, other: &Landmark) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<[f64; 3]> for Landmark {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Landmark> for [f64; 3] {
    fn from(lm: Landmark) -> Self {
        [lm.x, lm.y, lm.z]
    }
}

/// Handedness label reported by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unvalidated hand as it arrives from a tracker or a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHand {
    pub side: Side,
    pub landmarks: Vec<Landmark>,
}

/// One hand's full landmark set for one tick. Always carries exactly 21 landmarks.
#[derive(Debug, Clone, PartialEq)]
pub struct HandObservation {
    side: Side,
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl HandObservation {
    pub fn new(side: Side, landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { side, landmarks }
    }

    /// Build from an arbitrary landmark list, rejecting anything but 21 points.
    pub fn try_new(side: Side, landmarks: Vec<Landmark>) -> GestureResult<Self> {
        let count = landmarks.len();
        let landmarks: [Landmark; LANDMARK_COUNT] =
            landmarks
                .try_into()
                .map_err(|_| GestureError::MalformedHand {
                    side: side.to_string(),
                    count,
                })?;
        Ok(Self { side, landmarks })
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }

    /// Landmark at a tracker index (see [`joint`]).
    pub fn landmark(&self, index: usize) -> &Landmark {
        &self.landmarks[index]
    }

    pub fn wrist(&self) -> &Landmark {
        &self.landmarks[joint::WRIST]
    }

    /// Mean (x, y) over all 21 landmarks.
    pub fn centroid(&self) -> (f64, f64) {
        let n = LANDMARK_COUNT as f64;
        let (sx, sy) = self
            .landmarks
            .iter()
            .fold((0.0, 0.0), |(sx, sy), lm| (sx + lm.x, sy + lm.y));
        (sx / n, sy / n)
    }

    /// Flatten to `[x0, y0, z0, x1, ...]`.
    pub fn flatten(&self) -> FrameVector {
        let mut out = [0.0; CHANNELS];
        for (i, lm) in self.landmarks.iter().enumerate() {
            out[i * 3] = lm.x;
            out[i * 3 + 1] = lm.y;
            out[i * 3 + 2] = lm.z;
        }
        out
    }
}

impl TryFrom<RawHand> for HandObservation {
    type Error = GestureError;

    fn try_from(raw: RawHand) -> GestureResult<Self> {
        Self::try_new(raw.side, raw.landmarks)
    }
}

impl From<&HandObservation> for RawHand {
    fn from(hand: &HandObservation) -> Self {
        Self {
            side: hand.side,
            landmarks: hand.landmarks.to_vec(),
        }
    }
}
