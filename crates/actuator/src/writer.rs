//! Append-only JSONL journal of recognized gestures and dispatched commands.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use gestura_common::clock::TimestampNs;
use gestura_common::error::{GestureError, GestureResult};
use gestura_hand_model::action::ActionCommand;

/// First line of a journal, written as `# {json}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalHeader {
    pub schema_version: String,
    pub epoch_wall: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl JournalHeader {
    pub fn new(epoch_wall: impl Into<String>) -> Self {
        Self {
            schema_version: "1.0".to_string(),
            epoch_wall: epoch_wall.into(),
            source: None,
        }
    }
}

/// Where a recognized gesture came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureSource {
    /// Committed by the countdown stabilizer.
    Stabilizer,
    /// Passed the sequence classifier debounce gate.
    Classifier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JournalRecord {
    Gesture { label: String, source: GestureSource },
    Command { command: ActionCommand },
    Unmapped { label: String },
}

/// One journal line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,
    #[serde(flatten)]
    pub record: JournalRecord,
}

/// Writes journal entries to a JSONL file.
pub struct JournalWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    entries_written: u64,
}

impl JournalWriter {
    /// Create the file, truncating any previous journal, and write the header.
    pub fn new(path: PathBuf, header: JournalHeader) -> GestureResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);
        let header_json = serde_json::to_string(&header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| GestureError::session(format!("Failed to write journal header: {e}")))?;

        Ok(Self {
            writer,
            path,
            entries_written: 0,
        })
    }

    pub fn write_entry(&mut self, entry: &JournalEntry) -> GestureResult<()> {
        let json = serde_json::to_string(entry)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| GestureError::session(format!("Failed to write journal entry: {e}")))?;
        self.entries_written += 1;

        if self.entries_written % 100 == 0 {
            self.flush()?;
        }
        Ok(())
    }

    pub fn record(&mut self, timestamp_ns: TimestampNs, record: JournalRecord) -> GestureResult<()> {
        self.write_entry(&JournalEntry {
            timestamp_ns,
            record,
        })
    }

    pub fn flush(&mut self) -> GestureResult<()> {
        self.writer
            .flush()
            .map_err(|e| GestureError::session(format!("Failed to flush journal: {e}")))
    }

    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for JournalWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Read a journal back, skipping the header and blank lines.
pub fn parse_journal(content: &str) -> Result<Vec<JournalEntry>, serde_json::Error> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}
