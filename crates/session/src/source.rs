//! Hand tracker that replays a recorded JSONL file.

use std::collections::VecDeque;
use std::path::Path;

use gestura_common::error::{GestureError, GestureResult};
use gestura_hand_model::frame::{parse_frames, parse_header, FrameSnapshot, RecordedFrame, RecordingHeader};
use gestura_platform_core::HandTracker;

/// Replays recorded frames in file order.
///
/// Each frame is validated as it is handed out, so one malformed hand
/// costs one frame rather than the whole recording.
pub struct ReplayTracker {
    name: String,
    header: Option<RecordingHeader>,
    frames: VecDeque<RecordedFrame>,
}

impl ReplayTracker {
    pub fn from_frames(name: impl Into<String>, frames: Vec<RecordedFrame>) -> Self {
        Self {
            name: name.into(),
            header: None,
            frames: frames.into(),
        }
    }

    /// Parse a recording. Any line that is not valid JSON fails the whole load.
    pub fn from_jsonl(name: impl Into<String>, content: &str) -> GestureResult<Self> {
        let frames = parse_frames(content)
            .map_err(|e| GestureError::tracker(format!("Failed to parse recording: {e}")))?;
        Ok(Self {
            name: name.into(),
            header: parse_header(content),
            frames: frames.into(),
        })
    }

    /// Open a recording file. A missing file is a startup failure.
    pub fn open(path: &Path) -> GestureResult<Self> {
        if !path.exists() {
            return Err(GestureError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let tracker = Self::from_jsonl(path.display().to_string(), &content)?;
        tracing::info!(
            path = %path.display(),
            frames = tracker.remaining(),
            fps = tracker.header.as_ref().map(|h| h.fps),
            "Recording loaded"
        );
        Ok(tracker)
    }

    pub fn header(&self) -> Option<&RecordingHeader> {
        self.header.as_ref()
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl HandTracker for ReplayTracker {
    fn next_frame(&mut self) -> GestureResult<Option<FrameSnapshot>> {
        match self.frames.pop_front() {
            Some(frame) => frame.into_snapshot().map(Some),
            None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_json(side: &str, count: usize) -> String {
        let lms = vec!["[0.5,0.5,0.0]"; count].join(",");
        format!(r#"{{"side":"{side}","landmarks":[{lms}]}}"#)
    }

    #[test]
    fn test_replays_in_order_and_skips_bad_frames() {
        let content = format!(
            "# {{\"schema_version\":\"1.0\",\"fps\":20}}\n{{\"t\":0,\"hands\":[{}]}}\n{{\"t\":50000000,\"hands\":[{}]}}\n{{\"t\":100000000}}\n",
            hand_json("left", 21),
            hand_json("right", 20),
        );
        let mut tracker = ReplayTracker::from_jsonl("test", &content).unwrap();
        assert_eq!(tracker.header().map(|h| h.fps), Some(20));
        assert_eq!(tracker.remaining(), 3);

        let first = tracker.next_frame().unwrap().unwrap();
        assert_eq!(first.hand_count(), 1);

        let err = tracker.next_frame().unwrap_err();
        assert!(err.is_frame_local());

        let third = tracker.next_frame().unwrap().unwrap();
        assert_eq!(third.timestamp_ns, 100_000_000);
        assert!(third.is_empty());
        assert!(tracker.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("gestura-no-such-recording.jsonl");
        assert!(matches!(
            ReplayTracker::open(&path),
            Err(GestureError::FileNotFound { .. })
        ));
    }
}
