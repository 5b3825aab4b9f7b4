// Chordmap Config - Keycode Expression Parser
// Parses keymap expressions like "LT(3, KC_COMM)" or "S(KC_9)" into key actions

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::key::keycode_from_name;
use crate::key::kc::{KC_NO, KC_TRANSPARENT};
use crate::key_action::{CustomKeycode, KeyAction, SymbolKey};
use crate::layer::{Layer, MAX_LAYERS};
use crate::modifier::{ModifierError, Mods};
use crate::Keycode;

/// Errors that can occur while parsing a keycode expression
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeycodeParseError {
    #[error("keycode expression cannot be empty")]
    EmptyInput,

    #[error("unknown keycode: '{0}'")]
    UnknownKeycode(String),

    #[error("unknown function: '{0}'")]
    UnknownFunction(String),

    #[error("{function} expects {expected} argument(s), got {got}")]
    WrongArity {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid number: '{0}'")]
    InvalidNumber(String),

    #[error("layer {0} is out of range")]
    LayerOutOfRange(u32),

    #[error("{0} does not take a keycode with modifiers")]
    ExpectedBasicKeycode(String),

    #[error(transparent)]
    Modifier(#[from] ModifierError),
}

/// `NAME(args)`, with the argument list kept whole for nested calls
fn call_regex() -> &'static Regex {
    static CALL: OnceLock<Regex> = OnceLock::new();
    CALL.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_]*)\s*\((.*)\)\s*$")
            .expect("keycode call pattern is a valid regex")
    })
}

/// Split on top-level commas only, so `S(KC_9)` stays one argument
fn split_args(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = args[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts
}

fn expect_args<'a>(
    function: &str,
    args: &'a str,
    expected: usize,
) -> Result<Vec<&'a str>, KeycodeParseError> {
    let parts = split_args(args);
    if parts.len() != expected {
        return Err(KeycodeParseError::WrongArity {
            function: function.to_string(),
            expected,
            got: parts.len(),
        });
    }
    Ok(parts)
}

fn parse_number(text: &str) -> Result<u32, KeycodeParseError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| KeycodeParseError::InvalidNumber(text.trim().to_string()))
}

fn parse_layer(text: &str) -> Result<Layer, KeycodeParseError> {
    let layer = parse_number(text)?;
    if layer as usize >= MAX_LAYERS {
        return Err(KeycodeParseError::LayerOutOfRange(layer));
    }
    Ok(layer as Layer)
}

fn parse_index(text: &str) -> Result<u8, KeycodeParseError> {
    let index = parse_number(text)?;
    u8::try_from(index).map_err(|_| KeycodeParseError::InvalidNumber(text.trim().to_string()))
}

/// `MOD_LSFT | MOD_LCTL` or `LSFT|LCTL`
fn parse_mod_list(text: &str) -> Result<Mods, KeycodeParseError> {
    let mut mods = Mods::empty();
    for part in text.split('|') {
        let name = part.trim();
        let name = name
            .strip_prefix("MOD_")
            .or_else(|| name.strip_prefix("mod_"))
            .unwrap_or(name);
        mods |= Mods::from_alias(name)?;
    }
    Ok(mods)
}

/// Parse a keycode, including modifier wrappers such as `S(KC_9)` or `C(S(KC_A))`
pub fn parse_keycode(exp: &str) -> Result<Keycode, KeycodeParseError> {
    let trimmed = exp.trim();
    if trimmed.is_empty() {
        return Err(KeycodeParseError::EmptyInput);
    }

    if let Some(caps) = call_regex().captures(trimmed) {
        let function = &caps[1];
        let mods = Mods::from_alias(function)
            .map_err(|_| KeycodeParseError::UnknownFunction(function.to_string()))?;
        let inner = expect_args(function, &caps[2], 1)?;
        return Ok(parse_keycode(inner[0])?.with_mods(mods));
    }

    keycode_from_name(trimmed).ok_or_else(|| KeycodeParseError::UnknownKeycode(trimmed.to_string()))
}

fn parse_basic_keycode(function: &str, exp: &str) -> Result<Keycode, KeycodeParseError> {
    let keycode = parse_keycode(exp)?;
    if keycode.mod_bits() != 0 {
        return Err(KeycodeParseError::ExpectedBasicKeycode(function.to_string()));
    }
    Ok(keycode)
}

/// Parse a keymap expression into the action it binds.
///
/// # Examples
/// ```
/// use chordmap_core::config::parse_key_action;
/// use chordmap_core::key_action::KeyAction;
///
/// let action = parse_key_action("LT(3, KC_COMM)").unwrap();
/// assert!(matches!(action, KeyAction::LayerTap { layer: 3, .. }));
/// ```
pub fn parse_key_action(exp: &str) -> Result<KeyAction, KeycodeParseError> {
    let trimmed = exp.trim();
    if trimmed.is_empty() {
        return Err(KeycodeParseError::EmptyInput);
    }

    if let Some(caps) = call_regex().captures(trimmed) {
        let function = caps[1].to_uppercase();
        let args = &caps[2];
        return match function.as_str() {
            "LT" => {
                let parts = expect_args(&function, args, 2)?;
                Ok(KeyAction::LayerTap {
                    layer: parse_layer(parts[0])?,
                    tap: parse_basic_keycode(&function, parts[1])?,
                })
            }
            "MT" => {
                let parts = expect_args(&function, args, 2)?;
                Ok(KeyAction::ModTap {
                    mods: parse_mod_list(parts[0])?,
                    tap: parse_basic_keycode(&function, parts[1])?,
                })
            }
            "MO" => Ok(KeyAction::Momentary(parse_layer(expect_args(&function, args, 1)?[0])?)),
            "DF" => Ok(KeyAction::DefaultLayer(parse_layer(
                expect_args(&function, args, 1)?[0],
            )?)),
            "TO" => Ok(KeyAction::ToLayer(parse_layer(expect_args(&function, args, 1)?[0])?)),
            "TD" => Ok(KeyAction::TapDance(parse_index(expect_args(&function, args, 1)?[0])?)),
            "MACRO" => Ok(KeyAction::Macro(parse_index(expect_args(&function, args, 1)?[0])?)),
            name if name.ends_with("_T") => {
                let mods = Mods::from_mod_tap(name)?;
                let parts = expect_args(&function, args, 1)?;
                Ok(KeyAction::ModTap {
                    mods,
                    tap: parse_basic_keycode(&function, parts[0])?,
                })
            }
            _ => parse_keycode(trimmed).map(KeyAction::Key),
        };
    }

    if let Ok(custom) = CustomKeycode::from_str(trimmed) {
        return Ok(KeyAction::Custom(custom));
    }
    if let Ok(symbol) = SymbolKey::from_str(trimmed) {
        return Ok(KeyAction::Symbol(symbol));
    }

    match trimmed.to_uppercase().as_str() {
        "TRNS" | "KC_TRNS" => return Ok(KeyAction::Transparent),
        "NO" => return Ok(KeyAction::No),
        _ => {}
    }

    let keycode = parse_keycode(trimmed)?;
    Ok(match keycode {
        KC_TRANSPARENT => KeyAction::Transparent,
        KC_NO => KeyAction::No,
        keycode => KeyAction::Key(keycode),
    })
}
