//! Gesture label → action table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gestura_hand_model::action::ActionCommand;
use gestura_hand_model::gesture::GestureLabel;

/// Maps committed gesture labels to one injected action each.
///
/// Keys are stored in canonical form (lowercase, `_` separators), so
/// `"ZOOM_IN"`, `"zoom-in"` and `"zoom_in"` all resolve to the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, ActionCommand>",
    into = "BTreeMap<String, ActionCommand>"
)]
pub struct ActionMap {
    entries: BTreeMap<String, ActionCommand>,
}

impl ActionMap {
    /// A table with no entries.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, label: &str, command: ActionCommand) -> Option<ActionCommand> {
        self.entries.insert(canonical(label), command)
    }

    pub fn with(mut self, label: GestureLabel, command: ActionCommand) -> Self {
        self.insert(label.as_str(), command);
        self
    }

    pub fn get(&self, label: &str) -> Option<&ActionCommand> {
        self.entries.get(&canonical(label))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionCommand)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries whose key names no known [`GestureLabel`].
    pub fn unknown_labels(&self) -> Vec<&str> {
        self.entries
            .keys()
            .filter(|k| k.parse::<GestureLabel>().is_err())
            .map(String::as_str)
            .collect()
    }
}

impl Default for ActionMap {
    fn default() -> Self {
        Self::empty()
            .with(GestureLabel::Shake, ActionCommand::hotkey(["ctrl", "a"]))
            .with(GestureLabel::Stop, ActionCommand::press("space"))
            .with(GestureLabel::Wave, ActionCommand::hotkey(["ctrl", "s"]))
            .with(GestureLabel::WaveBoth, ActionCommand::hotkey(["ctrl", "x"]))
            .with(GestureLabel::Freeze, ActionCommand::press("f"))
            .with(GestureLabel::WiggleV, ActionCommand::press("w"))
            .with(GestureLabel::ShakeSidechains, ActionCommand::press("s"))
            .with(GestureLabel::Rebuild, ActionCommand::press("o"))
            .with(GestureLabel::ZoomIn, ActionCommand::press("pageup"))
            .with(GestureLabel::ZoomOut, ActionCommand::press("pagedown"))
    }
}

impl From<BTreeMap<String, ActionCommand>> for ActionMap {
    fn from(raw: BTreeMap<String, ActionCommand>) -> Self {
        let mut map = Self::empty();
        for (label, command) in raw {
            map.insert(&label, command);
        }
        map
    }
}

impl From<ActionMap> for BTreeMap<String, ActionCommand> {
    fn from(map: ActionMap) -> Self {
        map.entries
    }
}

fn canonical(label: &str) -> String {
    label.trim().to_ascii_lowercase().replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let map = ActionMap::default();
        assert_eq!(map.len(), 10);
        assert_eq!(map.get("stop"), Some(&ActionCommand::press("space")));
        assert_eq!(map.get("ZOOM_IN"), Some(&ActionCommand::press("pageup")));
        assert_eq!(
            map.get("wave-both"),
            Some(&ActionCommand::hotkey(["ctrl", "x"]))
        );
        assert_eq!(map.get("thumbs_up"), None);
        assert!(map.unknown_labels().is_empty());
    }

    #[test]
    fn test_json_table() {
        let map: ActionMap = serde_json::from_str(
            r#"{"OK": {"type": "click"}, "moonwalk": {"type": "press_key", "key": "m"}}"#,
        )
        .unwrap();
        assert_eq!(map.get("ok"), Some(&ActionCommand::Click));
        assert_eq!(map.unknown_labels(), vec!["moonwalk"]);
    }
}
