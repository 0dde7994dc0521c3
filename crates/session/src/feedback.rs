//! Best-effort feedback channels.

use std::io::Write;

use gestura_common::error::GestureResult;
use gestura_platform_core::{FeedbackChannel, FeedbackCue};

/// Logs each cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFeedback;

impl FeedbackChannel for LogFeedback {
    fn play(&mut self, cue: FeedbackCue) -> GestureResult<()> {
        tracing::info!(?cue, "Feedback");
        Ok(())
    }
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl FeedbackChannel for TerminalBell {
    fn play(&mut self, cue: FeedbackCue) -> GestureResult<()> {
        let rings = match cue {
            FeedbackCue::ModeEnabled => 2,
            FeedbackCue::ModeDisabled | FeedbackCue::GestureCommitted => 1,
            FeedbackCue::Click => 0,
        };
        let mut stderr = std::io::stderr().lock();
        for _ in 0..rings {
            stderr.write_all(b"\x07")?;
        }
        stderr.flush()?;
        Ok(())
    }
}
