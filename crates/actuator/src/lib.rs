//! Gestura Actuator
//!
//! Turns recognized gestures and direct-control intents into input
//! commands. A pluggable [`InputInjector`] backend executes them:
//!
//! - **Log:** writes each command to the tracing log (dry run)
//! - **Recording:** keeps commands in memory for inspection
//!
//! Every recognized gesture and dispatched command can also be appended to
//! a JSONL journal.

pub mod action_map;
pub mod backends;
pub mod writer;

pub use action_map::ActionMap;
pub use backends::{LogInjector, RecordingInjector};
pub use writer::{GestureSource, JournalHeader, JournalRecord, JournalWriter};

use gestura_common::clock::TimestampNs;
use gestura_common::error::GestureResult;
use gestura_hand_model::action::ActionCommand;
use gestura_platform_core::InputInjector;

/// Running totals for the session report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub commands: u64,
    pub failures: u64,
    pub unmapped: u64,
}

/// Routes commands to the injector and the journal.
///
/// Injection is fire-and-forget: a failing backend is logged and counted,
/// never propagated into recognition state.
pub struct ActionDispatcher {
    injector: Box<dyn InputInjector>,
    actions: ActionMap,
    journal: Option<JournalWriter>,
    stats: DispatchStats,
}

impl ActionDispatcher {
    pub fn new(injector: Box<dyn InputInjector>, actions: ActionMap) -> Self {
        tracing::debug!(backend = injector.name(), entries = actions.len(), "Action dispatcher ready");
        Self {
            injector,
            actions,
            journal: None,
            stats: DispatchStats::default(),
        }
    }

    pub fn with_journal(mut self, journal: JournalWriter) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn actions(&self) -> &ActionMap {
        &self.actions
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn injector_name(&self) -> &str {
        self.injector.name()
    }

    /// Look up a recognized gesture and inject its action.
    ///
    /// Unknown labels are logged and skipped.
    pub fn dispatch_gesture(
        &mut self,
        label: &str,
        source: GestureSource,
        now: TimestampNs,
    ) -> Option<ActionCommand> {
        self.journal(
            now,
            JournalRecord::Gesture {
                label: label.to_string(),
                source,
            },
        );

        let Some(command) = self.actions.get(label).cloned() else {
            tracing::warn!(gesture = label, "No action mapped for gesture");
            self.stats.unmapped += 1;
            self.journal(
                now,
                JournalRecord::Unmapped {
                    label: label.to_string(),
                },
            );
            return None;
        };

        self.execute(&command, now);
        Some(command)
    }

    /// Inject one command.
    pub fn execute(&mut self, command: &ActionCommand, now: TimestampNs) {
        self.stats.commands += 1;
        if let Err(e) = self.injector.inject(command) {
            self.stats.failures += 1;
            tracing::warn!(error = %e, %command, backend = self.injector.name(), "Input injection failed");
        }
        // Cursor moves arrive every frame; keep them out of the journal.
        if !matches!(command, ActionCommand::MoveTo { .. }) {
            self.journal(
                now,
                JournalRecord::Command {
                    command: command.clone(),
                },
            );
        }
    }

    pub fn flush(&mut self) -> GestureResult<()> {
        match self.journal.as_mut() {
            Some(journal) => journal.flush(),
            None => Ok(()),
        }
    }

    fn journal(&mut self, now: TimestampNs, record: JournalRecord) {
        if let Some(journal) = self.journal.as_mut() {
            if let Err(e) = journal.record(now, record) {
                tracing::warn!(error = %e, path = %journal.path().display(), "Journal write failed");
            }
        }
    }
}
