use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::input::KeyAction;

/// Serialized shape of [`KeybindingOptions`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct KeybindingTable {
    bindings: HashMap<KeyAction, String>,
}

impl Default for KeybindingTable {
    fn default() -> Self {
        let bindings = HashMap::from([
            (KeyAction::ToggleAutoRotate, "r".into()),
            (KeyAction::ZoomIn, "+".into()),
            (KeyAction::ZoomOut, "-".into()),
            (KeyAction::RotateLeft, "ArrowLeft".into()),
            (KeyAction::RotateRight, "ArrowRight".into()),
            (KeyAction::RotateUp, "ArrowUp".into()),
            (KeyAction::RotateDown, "ArrowDown".into()),
            (KeyAction::ResetView, "Home".into()),
        ]);
        Self { bindings }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "KeybindingTable", into = "KeybindingTable")]
/// Configurable keyboard bindings mapping actions to DOM key values.
pub struct KeybindingOptions {
    /// Maps action → key string (e.g. `ZoomIn` → `"+"`).
    bindings: HashMap<KeyAction, String>,
    /// Reverse lookup cache (key string → action).
    key_to_action: HashMap<String, KeyAction>,
}

impl From<KeybindingTable> for KeybindingOptions {
    fn from(table: KeybindingTable) -> Self {
        let mut opts = Self {
            bindings: table.bindings,
            key_to_action: HashMap::new(),
        };
        opts.rebuild_reverse_map();
        opts
    }
}

impl From<KeybindingOptions> for KeybindingTable {
    fn from(opts: KeybindingOptions) -> Self {
        Self {
            bindings: opts.bindings,
        }
    }
}

impl Default for KeybindingOptions {
    fn default() -> Self {
        KeybindingTable::default().into()
    }
}

impl KeybindingOptions {
    fn rebuild_reverse_map(&mut self) {
        self.key_to_action.clear();
        for (action, key) in &self.bindings {
            let _ = self.key_to_action.insert(key.clone(), *action);
        }
    }

    /// Bind `action` to `key`, replacing its previous key.
    pub fn bind(&mut self, action: KeyAction, key: impl Into<String>) {
        let _ = self.bindings.insert(action, key.into());
        self.rebuild_reverse_map();
    }

    /// Key currently bound to `action`.
    #[must_use]
    pub fn key_for(&self, action: KeyAction) -> Option<&str> {
        self.bindings.get(&action).map(String::as_str)
    }

    /// Look up the action for a key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<KeyAction> {
        self.key_to_action.get(key).copied()
    }
}
