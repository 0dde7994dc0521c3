//! Error types shared across Gestura crates.

use std::path::PathBuf;

/// Top-level error type for Gestura operations.
#[derive(Debug, thiserror::Error)]
pub enum GestureError {
    #[error("Tracker error: {message}")]
    Tracker { message: String },

    #[error("Classifier error: {message}")]
    Classifier { message: String },

    #[error("Input injection error: {message}")]
    Injection { message: String },

    #[error("Sequence error: {message}")]
    Sequence { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Malformed {side} hand: expected 21 landmarks, got {count}")]
    MalformedHand { side: String, count: usize },

    #[error("Sequence too short: {frames} frames (minimum {min})")]
    SequenceTooShort { frames: usize, min: usize },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using GestureError.
pub type GestureResult<T> = Result<T, GestureError>;

impl GestureError {
    pub fn tracker(msg: impl Into<String>) -> Self {
        Self::Tracker {
            message: msg.into(),
        }
    }

    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier {
            message: msg.into(),
        }
    }

    pub fn injection(msg: impl Into<String>) -> Self {
        Self::Injection {
            message: msg.into(),
        }
    }

    pub fn sequence(msg: impl Into<String>) -> Self {
        Self::Sequence {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error only affects the current frame and the session may continue.
    pub fn is_frame_local(&self) -> bool {
        matches!(self, Self::MalformedHand { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_hand_is_frame_local() {
        let err = GestureError::MalformedHand {
            side: "left".to_string(),
            count: 20,
        };
        assert!(err.is_frame_local());
        assert_eq!(
            err.to_string(),
            "Malformed left hand: expected 21 landmarks, got 20"
        );
        assert!(!GestureError::tracker("camera gone").is_frame_local());
    }
}
