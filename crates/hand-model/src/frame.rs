//! Frame snapshots and the recorded-frame JSONL format.
//!
//! Recordings are append-only JSONL: an optional `# {header}` first line,
//! then one frame object per line:
//!
//! ```text
//! # {"schema_version":"1.0","fps":20,"source":"oak-d"}
//! {"t":0,"hands":[{"side":"left","landmarks":[[0.1,0.2,0.0], ...]}]}
//! ```

use serde::{Deserialize, Serialize};

use gestura_common::clock::TimestampNs;
use gestura_common::error::GestureResult;

use crate::landmark::{HandObservation, RawHand, Side};

/// All hands observed in one tick.
///
/// Zero, one, or two hands may be present. Side labels are not guaranteed
/// unique, so lookups by side take the first match.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameSnapshot {
    pub timestamp_ns: TimestampNs,
    pub hands: Vec<HandObservation>,
}

impl FrameSnapshot {
    pub fn new(timestamp_ns: TimestampNs, hands: Vec<HandObservation>) -> Self {
        Self {
            timestamp_ns,
            hands,
        }
    }

    /// A tick with no hands in view.
    pub fn empty(timestamp_ns: TimestampNs) -> Self {
        Self::new(timestamp_ns, Vec::new())
    }

    pub fn hand_count(&self) -> usize {
        self.hands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }

    /// First hand carrying the given side label.
    pub fn first_of_side(&self, side: Side) -> Option<&HandObservation> {
        self.hands.iter().find(|h| h.side() == side)
    }

    /// `(left, right)` by first match per side.
    pub fn left_right(&self) -> (Option<&HandObservation>, Option<&HandObservation>) {
        (self.first_of_side(Side::Left), self.first_of_side(Side::Right))
    }
}

/// Header line of a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Nominal tracker frame rate.
    pub fps: u32,

    /// Free-form description of the tracker that produced the frames.
    #[serde(default)]
    pub source: Option<String>,

    /// Wall-clock time at recording start (ISO 8601).
    #[serde(default)]
    pub epoch_wall: Option<String>,
}

impl RecordingHeader {
    pub fn new(fps: u32) -> Self {
        Self {
            schema_version: "1.0".to_string(),
            fps,
            source: None,
            epoch_wall: None,
        }
    }
}

/// A frame as stored on disk. Hands are unvalidated until [`RecordedFrame::into_snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    #[serde(default)]
    pub hands: Vec<RawHand>,
}

impl RecordedFrame {
    /// Validate every hand. Fails on the first hand without exactly 21 landmarks.
    pub fn into_snapshot(self) -> GestureResult<FrameSnapshot> {
        let hands = self
            .hands
            .into_iter()
            .map(HandObservation::try_from)
            .collect::<GestureResult<Vec<_>>>()?;
        Ok(FrameSnapshot::new(self.timestamp_ns, hands))
    }
}

impl From<&FrameSnapshot> for RecordedFrame {
    fn from(snapshot: &FrameSnapshot) -> Self {
        Self {
            timestamp_ns: snapshot.timestamp_ns,
            hands: snapshot.hands.iter().map(RawHand::from).collect(),
        }
    }
}

/// Parse frames from JSONL content, skipping blank and `#` lines.
pub fn parse_frames(jsonl: &str) -> Result<Vec<RecordedFrame>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Parse the `# {header}` line, if the content starts with one.
pub fn parse_header(jsonl: &str) -> Option<RecordingHeader> {
    let first = jsonl.lines().map(str::trim).find(|l| !l.is_empty())?;
    let body = first.strip_prefix('#')?;
    serde_json::from_str(body.trim()).ok()
}

/// Serialize frames to JSONL, with an optional header line.
pub fn serialize_frames(
    header: Option<&RecordingHeader>,
    frames: &[RecordedFrame],
) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    if let Some(header) = header {
        output.push_str("# ");
        output.push_str(&serde_json::to_string(header)?);
        output.push('\n');
    }
    for frame in frames {
        output.push_str(&serde_json::to_string(frame)?);
        output.push('\n');
    }
    Ok(output)
}
