// Chordmap Modifier System
// Modifier bit sets (Ctrl, Shift, Alt, Gui) and their keycode forms

use smallvec::SmallVec;
use std::fmt;

use crate::key::kc::*;
use crate::Keycode;

bitflags::bitflags! {
    /// A set of held modifiers, laid out like the HID report modifier byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Mods: u8 {
        const LCTL = 1 << 0;
        const LSFT = 1 << 1;
        const LALT = 1 << 2;
        const LGUI = 1 << 3;
        const RCTL = 1 << 4;
        const RSFT = 1 << 5;
        const RALT = 1 << 6;
        const RGUI = 1 << 7;
    }
}

/// Errors produced when parsing modifier names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModifierError {
    #[error("unknown modifier: '{0}'")]
    UnknownModifier(String),

    #[error("unknown mod-tap prefix: '{0}'")]
    UnknownModTap(String),
}

/// Alias table: (alias, bits). Aliases are matched case-insensitively.
const ALIASES: &[(&str, Mods)] = &[
    ("LCTL", Mods::LCTL),
    ("CTL", Mods::LCTL),
    ("CTRL", Mods::LCTL),
    ("C", Mods::LCTL),
    ("LSFT", Mods::LSFT),
    ("SFT", Mods::LSFT),
    ("SHIFT", Mods::LSFT),
    ("S", Mods::LSFT),
    ("LALT", Mods::LALT),
    ("ALT", Mods::LALT),
    ("LOPT", Mods::LALT),
    ("A", Mods::LALT),
    ("LGUI", Mods::LGUI),
    ("GUI", Mods::LGUI),
    ("LCMD", Mods::LGUI),
    ("G", Mods::LGUI),
    ("RCTL", Mods::RCTL),
    ("RSFT", Mods::RSFT),
    ("RALT", Mods::RALT),
    ("RGUI", Mods::RGUI),
    ("MEH", Mods::LCTL.union(Mods::LSFT).union(Mods::LALT)),
    (
        "HYPR",
        Mods::LCTL.union(Mods::LSFT).union(Mods::LALT).union(Mods::LGUI),
    ),
];

/// Wrapper names used when displaying a keycode with modifier bits.
const WRAPPERS: &[(Mods, &str)] = &[
    (Mods::LCTL, "C"),
    (Mods::LSFT, "S"),
    (Mods::LALT, "A"),
    (Mods::LGUI, "G"),
    (Mods::RCTL, "RCTL"),
    (Mods::RSFT, "RSFT"),
    (Mods::RALT, "RALT"),
    (Mods::RGUI, "RGUI"),
];

const MOD_KEYCODES: &[(Mods, Keycode)] = &[
    (Mods::LCTL, KC_LEFT_CTRL),
    (Mods::LSFT, KC_LEFT_SHIFT),
    (Mods::LALT, KC_LEFT_ALT),
    (Mods::LGUI, KC_LEFT_GUI),
    (Mods::RCTL, KC_RIGHT_CTRL),
    (Mods::RSFT, KC_RIGHT_SHIFT),
    (Mods::RALT, KC_RIGHT_ALT),
    (Mods::RGUI, KC_RIGHT_GUI),
];

impl Mods {
    /// Look up a modifier set by alias (`LSFT`, `S`, `CTL`, `MEH`, ...)
    pub fn from_alias(alias: &str) -> Result<Mods, ModifierError> {
        let upper = alias.trim().to_uppercase();
        ALIASES
            .iter()
            .find(|(name, _)| *name == upper)
            .map(|(_, mods)| *mods)
            .ok_or(ModifierError::UnknownModifier(alias.to_string()))
    }

    /// Look up the modifiers of a mod-tap macro name such as `SFT_T` or `LCTL_T`
    pub fn from_mod_tap(name: &str) -> Result<Mods, ModifierError> {
        let upper = name.trim().to_uppercase();
        let base = upper
            .strip_suffix("_T")
            .ok_or_else(|| ModifierError::UnknownModTap(name.to_string()))?;
        // Single-letter wrappers (S, C, A, G) are not mod-tap prefixes
        if base.len() < 3 {
            return Err(ModifierError::UnknownModTap(name.to_string()));
        }
        Mods::from_alias(base).map_err(|_| ModifierError::UnknownModTap(name.to_string()))
    }

    /// The modifier for a modifier keycode, if `keycode` is one
    pub fn from_keycode(keycode: Keycode) -> Option<Mods> {
        MOD_KEYCODES
            .iter()
            .find(|(_, kc)| *kc == keycode)
            .map(|(mods, _)| *mods)
    }

    /// The modifier keycodes to register for this set, in report bit order
    pub fn keycodes(self) -> SmallVec<[Keycode; 4]> {
        MOD_KEYCODES
            .iter()
            .filter(|(mods, _)| self.contains(*mods))
            .map(|(_, kc)| *kc)
            .collect()
    }

    /// Wrapper macro names (`S`, `C`, ...) for display, outermost first
    pub fn wrapper_names(self) -> SmallVec<[&'static str; 4]> {
        WRAPPERS
            .iter()
            .filter(|(mods, _)| self.contains(*mods))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Whether any shift bit is set
    pub fn has_shift(self) -> bool {
        self.intersects(Mods::LSFT | Mods::RSFT)
    }
}

impl fmt::Display for Mods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .iter_names()
            .map(|(name, _)| name)
            .collect();
        if names.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_alias() {
        assert_eq!(Mods::from_alias("LSFT"), Ok(Mods::LSFT));
        assert_eq!(Mods::from_alias("s"), Ok(Mods::LSFT));
        assert_eq!(Mods::from_alias("Ctl"), Ok(Mods::LCTL));
        assert_eq!(Mods::from_alias("RALT"), Ok(Mods::RALT));
        assert_eq!(
            Mods::from_alias("MEH"),
            Ok(Mods::LCTL | Mods::LSFT | Mods::LALT)
        );
        assert!(matches!(
            Mods::from_alias("SUPERDUPER"),
            Err(ModifierError::UnknownModifier(_))
        ));
    }

    #[test]
    fn test_from_mod_tap() {
        assert_eq!(Mods::from_mod_tap("SFT_T"), Ok(Mods::LSFT));
        assert_eq!(Mods::from_mod_tap("CTL_T"), Ok(Mods::LCTL));
        assert_eq!(Mods::from_mod_tap("ALT_T"), Ok(Mods::LALT));
        assert_eq!(Mods::from_mod_tap("RGUI_T"), Ok(Mods::RGUI));
        assert!(Mods::from_mod_tap("S_T").is_err());
        assert!(Mods::from_mod_tap("SFT").is_err());
    }

    #[test]
    fn test_keycodes_roundtrip() {
        let mods = Mods::LCTL | Mods::LSFT;
        let keys = mods.keycodes();
        assert_eq!(keys.as_slice(), &[KC_LEFT_CTRL, KC_LEFT_SHIFT]);
        for key in keys {
            assert!(Mods::from_keycode(key).is_some());
        }
        assert_eq!(Mods::from_keycode(KC_A), None);
    }

    #[test]
    fn test_has_shift() {
        assert!(Mods::LSFT.has_shift());
        assert!(Mods::RSFT.has_shift());
        assert!(!Mods::LCTL.has_shift());
    }

    #[test]
    fn test_display() {
        assert_eq!(Mods::empty().to_string(), "NONE");
        assert_eq!((Mods::LCTL | Mods::LALT).to_string(), "LCTL|LALT");
    }
}
