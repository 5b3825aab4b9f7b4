// Chordmap Key Actions
// What a physical key does on a given layer

use std::fmt;

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::layer::Layer;
use crate::modifier::Mods;
use crate::Keycode;

/// Reserved keycodes intercepted before normal key processing
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum CustomKeycode {
    /// Drop transient layers and rebuild the stack from the mode
    #[strum(serialize = "CK_HOME")]
    Home,
    /// Switch between the Colemak and Qwerty base variants
    #[strum(serialize = "CK_VARIANT")]
    ToggleVariant,
    #[strum(serialize = "CK_GAMING")]
    ToggleGaming,
    /// Auto-shift for letter keys
    #[strum(serialize = "CK_ALPHA_AS")]
    ToggleAlphaAutoShift,
}

/// Symbol keys whose shifted form is a different keycode, not just Shift+key
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum SymbolKey {
    #[strum(serialize = "SYM_0")]
    Zero,
    #[strum(serialize = "SYM_9")]
    Nine,
    #[strum(serialize = "SYM_PAREN")]
    Paren,
    #[strum(serialize = "SYM_BRACE")]
    Brace,
    #[strum(serialize = "SYM_BRACKET")]
    Bracket,
    #[strum(serialize = "SYM_ANGLE")]
    Angle,
}

/// The action bound to a key position on one layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Does nothing and stops layer fall-through
    No,
    /// Falls through to the next active layer
    Transparent,
    /// Plain keycode, possibly carrying modifier bits (`S(KC_9)`)
    Key(Keycode),
    /// Modifiers on hold, keycode on tap
    ModTap { mods: Mods, tap: Keycode },
    /// Layer on hold, keycode on tap
    LayerTap { layer: Layer, tap: Keycode },
    /// Layer on while held
    Momentary(Layer),
    /// Replace the default layer
    DefaultLayer(Layer),
    /// Turn on one layer and every other layer off
    ToLayer(Layer),
    TapDance(u8),
    Custom(CustomKeycode),
    Symbol(SymbolKey),
    /// Send the string at this index of the macro table
    Macro(u8),
}

impl KeyAction {
    /// Whether the tap-hold engine resolves this action
    pub fn is_tap_hold(&self) -> bool {
        matches!(self, KeyAction::ModTap { .. } | KeyAction::LayerTap { .. })
    }

    /// The keycode sent when this action is tapped
    pub fn tap_keycode(&self) -> Option<Keycode> {
        match self {
            KeyAction::Key(keycode) => Some(*keycode),
            KeyAction::ModTap { tap, .. } | KeyAction::LayerTap { tap, .. } => Some(*tap),
            _ => None,
        }
    }
}

impl Default for KeyAction {
    fn default() -> Self {
        KeyAction::No
    }
}

impl From<Keycode> for KeyAction {
    fn from(keycode: Keycode) -> Self {
        KeyAction::Key(keycode)
    }
}

fn mod_tap_name(mods: Mods) -> Option<&'static str> {
    match mods {
        m if m == Mods::LCTL => Some("CTL_T"),
        m if m == Mods::LSFT => Some("SFT_T"),
        m if m == Mods::LALT => Some("ALT_T"),
        m if m == Mods::LGUI => Some("GUI_T"),
        m if m == Mods::RCTL => Some("RCTL_T"),
        m if m == Mods::RSFT => Some("RSFT_T"),
        m if m == Mods::RALT => Some("RALT_T"),
        m if m == Mods::RGUI => Some("RGUI_T"),
        _ => None,
    }
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAction::No => write!(f, "XXXXXXX"),
            KeyAction::Transparent => write!(f, "_______"),
            KeyAction::Key(keycode) => write!(f, "{}", keycode),
            KeyAction::ModTap { mods, tap } => match mod_tap_name(*mods) {
                Some(name) => write!(f, "{}({})", name, tap),
                None => write!(f, "MT({}, {})", mods, tap),
            },
            KeyAction::LayerTap { layer, tap } => write!(f, "LT({}, {})", layer, tap),
            KeyAction::Momentary(layer) => write!(f, "MO({})", layer),
            KeyAction::DefaultLayer(layer) => write!(f, "DF({})", layer),
            KeyAction::ToLayer(layer) => write!(f, "TO({})", layer),
            KeyAction::TapDance(index) => write!(f, "TD({})", index),
            KeyAction::Custom(custom) => write!(f, "{}", custom),
            KeyAction::Symbol(symbol) => write!(f, "{}", symbol),
            KeyAction::Macro(index) => write!(f, "MACRO({})", index),
        }
    }
}

// Constructors shaped like the keymap macros, for declaring layouts

pub const NO: KeyAction = KeyAction::No;
pub const TRNS: KeyAction = KeyAction::Transparent;

pub const fn k(keycode: Keycode) -> KeyAction {
    KeyAction::Key(keycode)
}

/// Shifted keycode, `S(kc)`
pub const fn s(keycode: Keycode) -> Keycode {
    Keycode(keycode.0 | ((Mods::LSFT.bits() as u16) << 8))
}

/// GUI-modified keycode, `G(kc)`
pub const fn g(keycode: Keycode) -> Keycode {
    Keycode(keycode.0 | ((Mods::LGUI.bits() as u16) << 8))
}

pub const fn mt(mods: Mods, tap: Keycode) -> KeyAction {
    KeyAction::ModTap { mods, tap }
}

pub const fn lt(layer: Layer, tap: Keycode) -> KeyAction {
    KeyAction::LayerTap { layer, tap }
}

pub const fn mo(layer: Layer) -> KeyAction {
    KeyAction::Momentary(layer)
}

pub const fn df(layer: Layer) -> KeyAction {
    KeyAction::DefaultLayer(layer)
}

pub const fn to(layer: Layer) -> KeyAction {
    KeyAction::ToLayer(layer)
}

pub const fn td(index: u8) -> KeyAction {
    KeyAction::TapDance(index)
}

pub const fn ck(custom: CustomKeycode) -> KeyAction {
    KeyAction::Custom(custom)
}

pub const fn sym(symbol: SymbolKey) -> KeyAction {
    KeyAction::Symbol(symbol)
}
