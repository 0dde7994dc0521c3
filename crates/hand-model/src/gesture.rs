//! Gesture candidates and classifier labels.

use serde::{Deserialize, Serialize};

/// Stateless per-tick geometric gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureCandidate {
    #[default]
    None,
    ZoomIn,
    ZoomOut,
    Stop,
}

impl GestureCandidate {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The action-table label for this candidate.
    pub fn label(&self) -> Option<GestureLabel> {
        match self {
            Self::None => None,
            Self::ZoomIn => Some(GestureLabel::ZoomIn),
            Self::ZoomOut => Some(GestureLabel::ZoomOut),
            Self::Stop => Some(GestureLabel::Stop),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::ZoomIn => "ZOOM_IN",
            Self::ZoomOut => "ZOOM_OUT",
            Self::Stop => "STOP",
        }
    }
}

impl std::fmt::Display for GestureCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of gesture labels known to the action table and sequence models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    Shake,
    Wave,
    Stop,
    WaveBoth,
    Freeze,
    WiggleV,
    ShakeSidechains,
    Rebuild,
    ZoomIn,
    ZoomOut,
    Ok,
    ThumbsUp,
}

impl GestureLabel {
    pub const ALL: [GestureLabel; 12] = [
        Self::Shake,
        Self::Wave,
        Self::Stop,
        Self::WaveBoth,
        Self::Freeze,
        Self::WiggleV,
        Self::ShakeSidechains,
        Self::Rebuild,
        Self::ZoomIn,
        Self::ZoomOut,
        Self::Ok,
        Self::ThumbsUp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shake => "shake",
            Self::Wave => "wave",
            Self::Stop => "stop",
            Self::WaveBoth => "wave_both",
            Self::Freeze => "freeze",
            Self::WiggleV => "wiggle_v",
            Self::ShakeSidechains => "shake_sidechains",
            Self::Rebuild => "rebuild",
            Self::ZoomIn => "zoom_in",
            Self::ZoomOut => "zoom_out",
            Self::Ok => "ok",
            Self::ThumbsUp => "thumbs_up",
        }
    }
}

impl std::fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label string names no known gesture.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gesture label: {0}")]
pub struct UnknownLabel(pub String);

impl std::str::FromStr for GestureLabel {
    type Err = UnknownLabel;

    /// Case-insensitive; accepts `-` or `_` as separator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == normalized)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// Output of the sequence classifier collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: GestureLabel,
    pub score: f64,
}
