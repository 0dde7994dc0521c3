//! Commands for the input-injection collaborator.

use serde::{Deserialize, Serialize};

/// A discrete, fire-and-forget input command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionCommand {
    /// Move the cursor to absolute screen pixels.
    MoveTo { x: i32, y: i32 },

    /// Press and hold the primary button.
    ButtonDown,

    /// Release the primary button.
    ButtonUp,

    /// Single primary-button click.
    Click,

    /// Press and release one key (e.g. "space", "pageup", "f").
    PressKey { key: String },

    /// Press keys together, in order, then release (e.g. ["ctrl", "s"]).
    Hotkey { keys: Vec<String> },
}

impl ActionCommand {
    pub fn press(key: impl Into<String>) -> Self {
        Self::PressKey { key: key.into() }
    }

    pub fn hotkey<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Hotkey {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this command drives the pointer rather than the keyboard.
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            Self::MoveTo { .. } | Self::ButtonDown | Self::ButtonUp | Self::Click
        )
    }
}

impl std::fmt::Display for ActionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MoveTo { x, y } => write!(f, "move_to({x}, {y})"),
            Self::ButtonDown => f.write_str("button_down"),
            Self::ButtonUp => f.write_str("button_up"),
            Self::Click => f.write_str("click"),
            Self::PressKey { key } => write!(f, "press({key})"),
            Self::Hotkey { keys } => write!(f, "hotkey({})", keys.join("+")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_format() {
        let json = serde_json::to_string(&ActionCommand::hotkey(["ctrl", "s"])).unwrap();
        assert_eq!(json, r#"{"type":"hotkey","keys":["ctrl","s"]}"#);

        let parsed: ActionCommand = serde_json::from_str(r#"{"type":"press_key","key":"space"}"#).unwrap();
        assert_eq!(parsed, ActionCommand::press("space"));
    }

    #[test]
    fn test_display_and_kind() {
        assert_eq!(ActionCommand::MoveTo { x: 3, y: 4 }.to_string(), "move_to(3, 4)");
        assert_eq!(ActionCommand::hotkey(["ctrl", "x"]).to_string(), "hotkey(ctrl+x)");
        assert!(ActionCommand::Click.is_pointer());
        assert!(!ActionCommand::press("f").is_pointer());
    }
}
