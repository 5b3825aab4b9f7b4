// Chordmap Config API
// Keycode expression parsing and the TOML config loader

pub mod keycode_parser;

#[cfg(feature = "config-file")]
pub mod parser;

pub use keycode_parser::{parse_key_action, parse_keycode, KeycodeParseError};

#[cfg(feature = "config-file")]
pub use parser::{
    AutoShiftConfig, ComboOverride, CombosConfig, Config, ConfigError, ConfigToml, GeneralConfig,
    ModeConfig, TappingConfig, TappingKeyEntry,
};
