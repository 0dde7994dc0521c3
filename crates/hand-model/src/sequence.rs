//! Variable-length landmark sequences for one tracked hand.

use std::collections::BTreeMap;

use gestura_common::error::{GestureError, GestureResult};

use crate::frame::FrameSnapshot;
use crate::landmark::{FrameVector, Side, CHANNELS};

/// Ordered per-frame hand vectors, oldest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LandmarkSequence {
    frames: Vec<FrameVector>,
}

impl LandmarkSequence {
    pub fn new(frames: Vec<FrameVector>) -> Self {
        Self { frames }
    }

    /// Parse JSON-style rows. Every row must hold exactly 63 values.
    pub fn from_rows(rows: &[Vec<f64>]) -> GestureResult<Self> {
        let frames = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                FrameVector::try_from(row.as_slice()).map_err(|_| {
                    GestureError::sequence(format!(
                        "row {i} has {} values, expected {CHANNELS}",
                        row.len()
                    ))
                })
            })
            .collect::<GestureResult<_>>()?;
        Ok(Self { frames })
    }

    /// Extract the dominant hand's sequence from recorded frames.
    ///
    /// The side seen in the most frames wins (ties go to `Left`); every frame
    /// carrying that side contributes its first matching hand.
    pub fn dominant_from_frames(frames: &[FrameSnapshot]) -> Option<(Side, Self)> {
        let mut counts: BTreeMap<Side, usize> = BTreeMap::new();
        for frame in frames {
            for hand in &frame.hands {
                *counts.entry(hand.side()).or_default() += 1;
            }
        }
        let side = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(side, _)| *side)?;

        let sequence = frames
            .iter()
            .filter_map(|frame| frame.first_of_side(side))
            .map(|hand| hand.flatten())
            .collect();
        Some((side, Self::new(sequence)))
    }

    pub fn push(&mut self, frame: FrameVector) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[FrameVector] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<FrameVector> {
        self.frames
    }

    /// Rows as plain vectors, for JSON output.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.frames.iter().map(|f| f.to_vec()).collect()
    }
}

impl From<Vec<FrameVector>> for LandmarkSequence {
    fn from(frames: Vec<FrameVector>) -> Self {
        Self::new(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{HandObservation, Landmark};

    fn hand(side: Side, x: f64) -> HandObservation {
        HandObservation::new(side, [Landmark::new(x, 0.5, 0.0); 21])
    }

    #[test]
    fn test_dominant_side_wins() {
        let frames = vec![
            FrameSnapshot::new(0, vec![hand(Side::Right, 0.1)]),
            FrameSnapshot::new(1, vec![hand(Side::Left, 0.2), hand(Side::Right, 0.3)]),
            FrameSnapshot::new(2, vec![hand(Side::Right, 0.4)]),
            FrameSnapshot::empty(3),
        ];
        let (side, seq) = LandmarkSequence::dominant_from_frames(&frames).unwrap();
        assert_eq!(side, Side::Right);
        assert_eq!(seq.len(), 3);
        let xs: Vec<f64> = seq.frames().iter().map(|f| f[0]).collect();
        assert_eq!(xs, vec![0.1, 0.3, 0.4]);
    }

    #[test]
    fn test_no_hands_yields_none() {
        assert!(LandmarkSequence::dominant_from_frames(&[FrameSnapshot::empty(0)]).is_none());
    }

    #[test]
    fn test_from_rows_rejects_short_rows() {
        let rows = vec![vec![0.0; 63], vec![0.0; 62], vec![1.0; 63]];
        let err = LandmarkSequence::from_rows(&rows).unwrap_err();
        assert!(err.to_string().contains("row 1 has 62 values"), "{err}");

        let rows = vec![vec![0.0; 63], vec![1.0; 63]];
        let seq = LandmarkSequence::from_rows(&rows).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.to_rows(), rows);
    }
}
