// Chordmap Core Library
// Keymap data, layer/mode state and the engines that drive tap-hold, combos and auto-shift

pub mod action;
pub mod auto_shift;
pub mod combo;
pub mod config;
pub mod custom;
pub mod engine;
pub mod key;
pub mod key_action;
pub mod layer;
pub mod mode;
pub mod modifier;
pub mod output;
pub mod policy;
pub mod profile;
pub mod state;
pub mod tap_dance;

pub use action::{Action, KeyEvent};
pub use auto_shift::{AutoShiftTable, SymbolPair};
pub use combo::{ComboDef, ComboGate, ComboOutput, ComboTable};
pub use config::{parse_key_action, parse_keycode, KeycodeParseError};
pub use custom::{process_record_user, MacroTable, Processing};
pub use engine::KeyboardEngine;
pub use key::Keycode;
pub use key_action::{CustomKeycode, KeyAction, SymbolKey};
pub use layer::{KeyPos, Keymap, Layer, LayerState};
pub use mode::{ModeState, Variant};
pub use modifier::{ModifierError, Mods};
pub use output::{HostEvent, HostOutput, PressedKeyState, RecordingHost};
pub use policy::{AutoShiftPolicy, ComboPolicy, TapHoldPolicy, TapHoldRecord, TapHoldTable};
pub use profile::{Profile, ProfileKind};
pub use state::{KeyboardState, ModeLayers};
pub use tap_dance::{TapDanceAction, TapDanceOutcome, TapDanceTable};

#[cfg(feature = "config-file")]
pub use config::{Config, ConfigError};
