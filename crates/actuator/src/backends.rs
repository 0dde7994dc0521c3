//! Input injection backends.
//!
//! OS-level injection lives outside this workspace; these backends cover
//! dry runs and tests.

use std::sync::{Arc, Mutex};

use gestura_common::error::{GestureError, GestureResult};
use gestura_hand_model::action::ActionCommand;
use gestura_platform_core::InputInjector;

/// Logs every command at info level and does nothing else.
#[derive(Debug, Default)]
pub struct LogInjector {
    injected: u64,
}

impl LogInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn injected(&self) -> u64 {
        self.injected
    }
}

impl InputInjector for LogInjector {
    fn inject(&mut self, command: &ActionCommand) -> GestureResult<()> {
        self.injected += 1;
        if command.is_pointer() {
            tracing::debug!(%command, "Inject");
        } else {
            tracing::info!(%command, "Inject");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Keeps injected commands in memory behind a shared handle.
#[derive(Debug, Clone, Default)]
pub struct RecordingInjector {
    commands: Arc<Mutex<Vec<ActionCommand>>>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything injected so far.
    pub fn commands(&self) -> Vec<ActionCommand> {
        self.commands
            .lock()
            .map(|cmds| cmds.clone())
            .unwrap_or_default()
    }
}

impl InputInjector for RecordingInjector {
    fn inject(&mut self, command: &ActionCommand) -> GestureResult<()> {
        self.commands
            .lock()
            .map_err(|_| GestureError::injection("recording injector lock poisoned"))?
            .push(command.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_handle_is_shared() {
        let recorder = RecordingInjector::new();
        let mut boxed: Box<dyn InputInjector> = Box::new(recorder.clone());
        boxed.inject(&ActionCommand::Click).unwrap();
        boxed.inject(&ActionCommand::press("f")).unwrap();
        assert_eq!(
            recorder.commands(),
            vec![ActionCommand::Click, ActionCommand::press("f")]
        );
    }

    #[test]
    fn test_log_injector_counts() {
        let mut log = LogInjector::new();
        log.inject(&ActionCommand::MoveTo { x: 1, y: 2 }).unwrap();
        assert_eq!(log.injected(), 1);
        assert_eq!(log.name(), "log");
    }
}
