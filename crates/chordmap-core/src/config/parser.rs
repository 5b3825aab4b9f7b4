// Chordmap Config Parser - TOML with Serde
// Loads the profile choice, initial mode and timing overrides from TOML

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::keycode_parser::{parse_key_action, KeycodeParseError};
use crate::key_action::KeyAction;
use crate::mode::{ModeState, Variant};
use crate::policy::TapHoldRecord;
use crate::profile::{Profile, ProfileKind};

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid key '{key}': {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: KeycodeParseError,
    },

    #[error("Timeout value out of range: {0}")]
    TimeoutOutOfRange(String),
}

/// Main configuration structure (root TOML table)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    #[serde(default)]
    pub general: Option<GeneralConfig>,

    /// Mode applied at boot
    #[serde(default)]
    pub mode: Option<ModeConfig>,

    #[serde(default)]
    pub tapping: Option<TappingConfig>,

    #[serde(default)]
    pub combos: Option<CombosConfig>,

    #[serde(default)]
    pub auto_shift: Option<AutoShiftConfig>,
}

/// General settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Keymap revision to load
    pub profile: Option<ProfileKind>,
}

/// Initial mode flags
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeConfig {
    #[serde(default)]
    pub variant: Variant,
    #[serde(default)]
    pub gaming: bool,
    #[serde(default)]
    pub alpha_auto_shift: bool,
}

/// Tap-hold timing
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TappingConfig {
    /// Default tapping term in milliseconds
    pub term: Option<u16>,

    /// Per-key overrides
    #[serde(default)]
    pub keys: Vec<TappingKeyEntry>,
}

/// One per-key tap-hold override
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TappingKeyEntry {
    /// Keymap expression, e.g. `SFT_T(KC_SPC)`
    pub key: String,
    pub term: Option<u16>,
    pub ignore_interrupt: Option<bool>,
    pub hold_on_other_key_press: Option<bool>,
    pub permissive_hold: Option<bool>,
}

/// Combo timing
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CombosConfig {
    pub default_term: Option<u16>,

    #[serde(default)]
    pub overrides: Vec<ComboOverride>,
}

/// Timing override for one named combo
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComboOverride {
    pub name: String,
    pub term: Option<u16>,
    pub must_hold: Option<bool>,
}

/// Auto-shift timing
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutoShiftConfig {
    pub timeout: Option<u16>,
}

/// Validated configuration.
///
/// Every field is optional on disk; what is left unset keeps the profile's
/// own value.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub profile: ProfileKind,
    pub initial_mode: ModeState,
    pub tapping_term: Option<u16>,
    pub tap_overrides: Vec<(KeyAction, TapHoldRecord)>,
    pub combo_term: Option<u16>,
    pub combo_overrides: Vec<ComboOverride>,
    pub auto_shift_timeout: Option<u16>,
}

fn check_timeout(what: &str, value: Option<u16>) -> Result<Option<u16>, ConfigError> {
    match value {
        Some(0) => Err(ConfigError::TimeoutOutOfRange(format!("{} must be above 0", what))),
        other => Ok(other),
    }
}

impl ConfigToml {
    fn to_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::default();

        if let Some(profile) = self.general.as_ref().and_then(|g| g.profile) {
            config.profile = profile;
        }

        if let Some(mode) = &self.mode {
            config.initial_mode = ModeState::new(mode.variant, mode.gaming, mode.alpha_auto_shift);
        }

        if let Some(tapping) = &self.tapping {
            config.tapping_term = check_timeout("tapping.term", tapping.term)?;
            for entry in &tapping.keys {
                let action = parse_key_action(&entry.key).map_err(|source| {
                    ConfigError::InvalidKey {
                        key: entry.key.clone(),
                        source,
                    }
                })?;
                let record = TapHoldRecord {
                    tapping_term: check_timeout(&format!("term of {}", entry.key), entry.term)?,
                    ignore_interrupt: entry.ignore_interrupt,
                    hold_on_other_key_press: entry.hold_on_other_key_press,
                    permissive_hold: entry.permissive_hold,
                };
                log::trace!("tap-hold override for {}: {:?}", action, record);
                config.tap_overrides.push((action, record));
            }
        }

        if let Some(combos) = &self.combos {
            config.combo_term = check_timeout("combos.default_term", combos.default_term)?;
            for entry in &combos.overrides {
                check_timeout(&format!("term of combo {}", entry.name), entry.term)?;
                config.combo_overrides.push(entry.clone());
            }
        }

        if let Some(auto_shift) = &self.auto_shift {
            config.auto_shift_timeout = check_timeout("auto_shift.timeout", auto_shift.timeout)?;
        }

        Ok(config)
    }
}

impl Config {
    /// Parse a TOML configuration file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let toml_config: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
        toml_config.to_config()
    }

    /// Get the default config path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chordmap").join("config.toml"))
    }

    /// Load from the default location, or the defaults if there is no file
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                log::debug!("loading config from {}", path.display());
                return Self::from_toml_path(path);
            }
        }
        Ok(Self::default())
    }

    /// Build the selected profile with every override applied.
    ///
    /// Overrides naming a combo the profile does not declare are skipped
    /// with a warning.
    pub fn build_profile(&self) -> Profile {
        let mut profile = Profile::from_kind(self.profile).with_initial_mode(self.initial_mode);

        if let Some(term) = self.tapping_term {
            profile.tap_hold.set_default_term(term);
        }
        for (action, record) in &self.tap_overrides {
            if !action.is_tap_hold() && !matches!(action, KeyAction::TapDance(_)) {
                log::warn!("{} is not a tap-hold key, override skipped", action);
                continue;
            }
            profile.tap_hold.set_override(*action, *record);
        }

        if let Some(term) = self.combo_term {
            profile.combos.set_default_term(term);
        }
        for entry in &self.combo_overrides {
            let mut found = true;
            if let Some(term) = entry.term {
                found &= profile.combos.set_term(&entry.name, term);
            }
            if let Some(must_hold) = entry.must_hold {
                found &= profile.combos.set_must_hold(&entry.name, must_hold);
            }
            if !found || profile.combos.get(&entry.name).is_none() {
                log::warn!(
                    "combo '{}' is not declared by the {} profile, override skipped",
                    entry.name,
                    self.profile
                );
            }
        }

        if let Some(timeout) = self.auto_shift_timeout {
            profile.auto_shift.set_timeout(timeout);
        }

        log::debug!(
            "built {} profile: {} layers, {} combos, initial mode {}",
            self.profile,
            profile.keymap.len(),
            profile.combos.len(),
            profile.initial_mode
        );
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::kc::*;
    use crate::key_action::{k, mt, td};
    use crate::modifier::Mods;
    use crate::policy::{ComboPolicy, TapHoldPolicy};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.profile, ProfileKind::Modal);
        assert_eq!(config.initial_mode, ModeState::default());
        assert!(config.tap_overrides.is_empty());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[general]
profile = "classic"

[mode]
variant = "qwerty"
gaming = true

[tapping]
term = 180
[[tapping.keys]]
key = "SFT_T(KC_SPC)"
term = 200
ignore_interrupt = true

[combos]
default_term = 45
[[combos.overrides]]
name = "l_paren"
term = 25
must_hold = true

[auto_shift]
timeout = 150
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.profile, ProfileKind::Classic);
        assert_eq!(config.initial_mode.variant(), Variant::Qwerty);
        assert!(config.initial_mode.gaming());
        assert!(!config.initial_mode.alpha_auto_shift());

        let profile = config.build_profile();
        let space = mt(Mods::LSFT, KC_SPACE);
        assert_eq!(profile.tap_hold.tapping_term(&space), 200);
        assert!(profile.tap_hold.ignore_interrupt(&space));
        assert_eq!(profile.tap_hold.tapping_term(&mt(Mods::LCTL, KC_ENTER)), 180);

        let paren = profile.combos.index_of("l_paren").unwrap();
        assert_eq!(profile.combos.combo_term(paren), 25);
        assert!(profile.combos.combo_must_hold(paren));
        let brace = profile.combos.index_of("l_brace").unwrap();
        assert_eq!(profile.combos.combo_term(brace), 45);
        assert_eq!(profile.auto_shift.timeout(), 150);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = Config::from_toml("[general]\nprofile = \"modal\"\ntheme = \"dark\"\n");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_invalid_key_expression() {
        let toml = "[tapping]\n[[tapping.keys]]\nkey = \"LT(3)\"\nterm = 150\n";
        match Config::from_toml(toml) {
            Err(ConfigError::InvalidKey { key, .. }) => assert_eq!(key, "LT(3)"),
            other => panic!("expected InvalidKey, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let result = Config::from_toml("[auto_shift]\ntimeout = 0\n");
        assert!(matches!(result, Err(ConfigError::TimeoutOutOfRange(_))));
    }

    #[test]
    fn test_override_on_plain_key_is_skipped() {
        let toml = "[tapping]\n[[tapping.keys]]\nkey = \"KC_A\"\nterm = 300\n\n[[tapping.keys]]\nkey = \"TD(0)\"\nterm = 250\n";
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.tap_overrides.len(), 2);

        let profile = config.build_profile();
        assert!(profile.tap_hold.get_override(&k(KC_A)).is_none());
        assert_eq!(profile.tap_hold.tapping_term(&td(0)), 250);
        assert_eq!(profile.tap_hold.override_count(), 1);
    }

    #[test]
    fn test_unknown_combo_override_is_skipped() {
        let toml = "[combos]\n[[combos.overrides]]\nname = \"nope\"\nterm = 10\n";
        let profile = Config::from_toml(toml).unwrap().build_profile();
        assert!(profile.combos.get("nope").is_none());
    }
}
