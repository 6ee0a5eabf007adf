//! Controller options with TOML preset support.
//!
//! Every tunable constant of the controls (sensitivity, click thresholds,
//! damping, autorotation, zoom, bounds, key bindings) lives here. Options
//! serialize to/from TOML so viewers can ship presets.

mod camera;
mod controls;
mod keybindings;

use std::path::Path;

pub use camera::{DistanceOptions, ProjectionOptions};
pub use controls::{ControlsOptions, LookAroundOptions};
pub use keybindings::KeybindingOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::OrbicamError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[controls]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Pointer, touch and wheel behavior.
    pub controls: ControlsOptions,
    /// First-person look-around mode.
    pub look_around: LookAroundOptions,
    /// Camera distance and zoom range.
    pub distance: DistanceOptions,
    /// Projection parameters.
    pub projection: ProjectionOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeybindingOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, OrbicamError> {
        toml::from_str(content)
            .map_err(|e| OrbicamError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, OrbicamError> {
        let content = std::fs::read_to_string(path).map_err(OrbicamError::Io)?;
        let options = Self::from_toml(&content)?;
        log::info!("loaded options from {}", path.display());
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), OrbicamError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| OrbicamError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(OrbicamError::Io)?;
        }
        std::fs::write(path, content).map_err(OrbicamError::Io)?;
        log::info!("saved options to {}", path.display());
        Ok(())
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyAction;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[controls]
sensitivity = 2.5
";
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.controls.sensitivity, 2.5);
        // Everything else should be default
        assert_eq!(opts.controls.click_max_cursor_delta, 3.0);
        assert_eq!(opts.distance.initial, 10.0);
        assert_eq!(opts.keybindings.lookup("r"), Some(KeyAction::ToggleAutoRotate));
    }

    #[test]
    fn invalid_toml_is_an_options_error() {
        let err = Options::from_toml("[controls\nsensitivity = ").unwrap_err();
        assert!(matches!(err, OrbicamError::OptionsParse(_)));
    }

    #[test]
    fn keybinding_lookup() {
        let mut opts = Options::default();
        assert_eq!(opts.keybindings.lookup("+"), Some(KeyAction::ZoomIn));
        assert_eq!(
            opts.keybindings.lookup("ArrowLeft"),
            Some(KeyAction::RotateLeft)
        );
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);

        opts.keybindings.bind(KeyAction::ZoomIn, "=");
        assert_eq!(opts.keybindings.lookup("="), Some(KeyAction::ZoomIn));
        assert_eq!(opts.keybindings.lookup("+"), None);
        assert_eq!(opts.keybindings.key_for(KeyAction::ZoomIn), Some("="));
    }

    #[test]
    fn save_load_and_list_presets() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = Options::default();
        opts.controls.zoom_step = 1.25;
        opts.save(&dir.path().join("close.toml")).unwrap();
        Options::default().save(&dir.path().join("default.toml")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let loaded = Options::load(&dir.path().join("close.toml")).unwrap();
        assert_eq!(loaded, opts);
        assert_eq!(
            Options::list_presets(dir.path()),
            vec!["close".to_owned(), "default".to_owned()]
        );
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("controls"));
        assert!(props.contains_key("distance"));
        assert!(props.contains_key("projection"));
        assert!(props.contains_key("look_around"));
        assert!(!props.contains_key("keybindings"));

        let controls = &props["controls"]["properties"];
        assert!(controls.get("sensitivity").is_some());
        assert!(controls.get("auto_rotation").is_none());
    }
}
