// Chordmap Keycode Type
// Represents a single keycode in the firmware's 16-bit keycode space

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::modifier::Mods;

include!(concat!(env!("OUT_DIR"), "/keycodes.rs"));

/// Basic keycode constants, named the way keymap sources name them.
pub mod kc {
    use super::Keycode;

    pub const KC_NO: Keycode = Keycode(0x00);
    pub const KC_TRANSPARENT: Keycode = Keycode(0x01);

    pub const KC_A: Keycode = Keycode(0x04);
    pub const KC_B: Keycode = Keycode(0x05);
    pub const KC_C: Keycode = Keycode(0x06);
    pub const KC_D: Keycode = Keycode(0x07);
    pub const KC_E: Keycode = Keycode(0x08);
    pub const KC_F: Keycode = Keycode(0x09);
    pub const KC_G: Keycode = Keycode(0x0A);
    pub const KC_H: Keycode = Keycode(0x0B);
    pub const KC_I: Keycode = Keycode(0x0C);
    pub const KC_J: Keycode = Keycode(0x0D);
    pub const KC_K: Keycode = Keycode(0x0E);
    pub const KC_L: Keycode = Keycode(0x0F);
    pub const KC_M: Keycode = Keycode(0x10);
    pub const KC_N: Keycode = Keycode(0x11);
    pub const KC_O: Keycode = Keycode(0x12);
    pub const KC_P: Keycode = Keycode(0x13);
    pub const KC_Q: Keycode = Keycode(0x14);
    pub const KC_R: Keycode = Keycode(0x15);
    pub const KC_S: Keycode = Keycode(0x16);
    pub const KC_T: Keycode = Keycode(0x17);
    pub const KC_U: Keycode = Keycode(0x18);
    pub const KC_V: Keycode = Keycode(0x19);
    pub const KC_W: Keycode = Keycode(0x1A);
    pub const KC_X: Keycode = Keycode(0x1B);
    pub const KC_Y: Keycode = Keycode(0x1C);
    pub const KC_Z: Keycode = Keycode(0x1D);

    pub const KC_1: Keycode = Keycode(0x1E);
    pub const KC_2: Keycode = Keycode(0x1F);
    pub const KC_3: Keycode = Keycode(0x20);
    pub const KC_4: Keycode = Keycode(0x21);
    pub const KC_5: Keycode = Keycode(0x22);
    pub const KC_6: Keycode = Keycode(0x23);
    pub const KC_7: Keycode = Keycode(0x24);
    pub const KC_8: Keycode = Keycode(0x25);
    pub const KC_9: Keycode = Keycode(0x26);
    pub const KC_0: Keycode = Keycode(0x27);

    pub const KC_ENTER: Keycode = Keycode(0x28);
    pub const KC_ESCAPE: Keycode = Keycode(0x29);
    pub const KC_BACKSPACE: Keycode = Keycode(0x2A);
    pub const KC_TAB: Keycode = Keycode(0x2B);
    pub const KC_SPACE: Keycode = Keycode(0x2C);
    pub const KC_MINUS: Keycode = Keycode(0x2D);
    pub const KC_EQUAL: Keycode = Keycode(0x2E);
    pub const KC_LEFT_BRACKET: Keycode = Keycode(0x2F);
    pub const KC_RIGHT_BRACKET: Keycode = Keycode(0x30);
    pub const KC_BACKSLASH: Keycode = Keycode(0x31);
    pub const KC_NONUS_HASH: Keycode = Keycode(0x32);
    pub const KC_SEMICOLON: Keycode = Keycode(0x33);
    pub const KC_QUOTE: Keycode = Keycode(0x34);
    pub const KC_GRAVE: Keycode = Keycode(0x35);
    pub const KC_COMMA: Keycode = Keycode(0x36);
    pub const KC_DOT: Keycode = Keycode(0x37);
    pub const KC_SLASH: Keycode = Keycode(0x38);
    pub const KC_CAPS_LOCK: Keycode = Keycode(0x39);

    pub const KC_F1: Keycode = Keycode(0x3A);
    pub const KC_F2: Keycode = Keycode(0x3B);
    pub const KC_F3: Keycode = Keycode(0x3C);
    pub const KC_F4: Keycode = Keycode(0x3D);
    pub const KC_F5: Keycode = Keycode(0x3E);
    pub const KC_F6: Keycode = Keycode(0x3F);
    pub const KC_F7: Keycode = Keycode(0x40);
    pub const KC_F8: Keycode = Keycode(0x41);
    pub const KC_F9: Keycode = Keycode(0x42);
    pub const KC_F10: Keycode = Keycode(0x43);
    pub const KC_F11: Keycode = Keycode(0x44);
    pub const KC_F12: Keycode = Keycode(0x45);

    pub const KC_PRINT_SCREEN: Keycode = Keycode(0x46);
    pub const KC_SCROLL_LOCK: Keycode = Keycode(0x47);
    pub const KC_PAUSE: Keycode = Keycode(0x48);
    pub const KC_INSERT: Keycode = Keycode(0x49);
    pub const KC_HOME: Keycode = Keycode(0x4A);
    pub const KC_PAGE_UP: Keycode = Keycode(0x4B);
    pub const KC_DELETE: Keycode = Keycode(0x4C);
    pub const KC_END: Keycode = Keycode(0x4D);
    pub const KC_PAGE_DOWN: Keycode = Keycode(0x4E);
    pub const KC_RIGHT: Keycode = Keycode(0x4F);
    pub const KC_LEFT: Keycode = Keycode(0x50);
    pub const KC_DOWN: Keycode = Keycode(0x51);
    pub const KC_UP: Keycode = Keycode(0x52);

    pub const KC_NUM_LOCK: Keycode = Keycode(0x53);
    pub const KC_KP_SLASH: Keycode = Keycode(0x54);
    pub const KC_KP_ASTERISK: Keycode = Keycode(0x55);
    pub const KC_KP_MINUS: Keycode = Keycode(0x56);
    pub const KC_KP_PLUS: Keycode = Keycode(0x57);
    pub const KC_KP_ENTER: Keycode = Keycode(0x58);
    pub const KC_KP_1: Keycode = Keycode(0x59);
    pub const KC_KP_2: Keycode = Keycode(0x5A);
    pub const KC_KP_3: Keycode = Keycode(0x5B);
    pub const KC_KP_4: Keycode = Keycode(0x5C);
    pub const KC_KP_5: Keycode = Keycode(0x5D);
    pub const KC_KP_6: Keycode = Keycode(0x5E);
    pub const KC_KP_7: Keycode = Keycode(0x5F);
    pub const KC_KP_8: Keycode = Keycode(0x60);
    pub const KC_KP_9: Keycode = Keycode(0x61);
    pub const KC_KP_0: Keycode = Keycode(0x62);
    pub const KC_KP_DOT: Keycode = Keycode(0x63);
    pub const KC_NONUS_BACKSLASH: Keycode = Keycode(0x64);
    pub const KC_APPLICATION: Keycode = Keycode(0x65);

    pub const KC_MS_UP: Keycode = Keycode(0xCD);
    pub const KC_MS_DOWN: Keycode = Keycode(0xCE);
    pub const KC_MS_LEFT: Keycode = Keycode(0xCF);
    pub const KC_MS_RIGHT: Keycode = Keycode(0xD0);
    pub const KC_MS_BTN1: Keycode = Keycode(0xD1);
    pub const KC_MS_BTN2: Keycode = Keycode(0xD2);
    pub const KC_MS_BTN3: Keycode = Keycode(0xD3);
    pub const KC_MS_WH_UP: Keycode = Keycode(0xD9);
    pub const KC_MS_WH_DOWN: Keycode = Keycode(0xDA);

    pub const KC_LEFT_CTRL: Keycode = Keycode(0xE0);
    pub const KC_LEFT_SHIFT: Keycode = Keycode(0xE1);
    pub const KC_LEFT_ALT: Keycode = Keycode(0xE2);
    pub const KC_LEFT_GUI: Keycode = Keycode(0xE3);
    pub const KC_RIGHT_CTRL: Keycode = Keycode(0xE4);
    pub const KC_RIGHT_SHIFT: Keycode = Keycode(0xE5);
    pub const KC_RIGHT_ALT: Keycode = Keycode(0xE6);
    pub const KC_RIGHT_GUI: Keycode = Keycode(0xE7);
}

use kc::*;

/// Canonical name and accepted aliases, one row per basic keycode.
const NAME_TABLE: &[(Keycode, &str, &[&str])] = &[
    (KC_NO, "KC_NO", &["XXXXXXX"]),
    (KC_TRANSPARENT, "KC_TRANSPARENT", &["KC_TRNS", "_______"]),
    (KC_A, "KC_A", &[]),
    (KC_B, "KC_B", &[]),
    (KC_C, "KC_C", &[]),
    (KC_D, "KC_D", &[]),
    (KC_E, "KC_E", &[]),
    (KC_F, "KC_F", &[]),
    (KC_G, "KC_G", &[]),
    (KC_H, "KC_H", &[]),
    (KC_I, "KC_I", &[]),
    (KC_J, "KC_J", &[]),
    (KC_K, "KC_K", &[]),
    (KC_L, "KC_L", &[]),
    (KC_M, "KC_M", &[]),
    (KC_N, "KC_N", &[]),
    (KC_O, "KC_O", &[]),
    (KC_P, "KC_P", &[]),
    (KC_Q, "KC_Q", &[]),
    (KC_R, "KC_R", &[]),
    (KC_S, "KC_S", &[]),
    (KC_T, "KC_T", &[]),
    (KC_U, "KC_U", &[]),
    (KC_V, "KC_V", &[]),
    (KC_W, "KC_W", &[]),
    (KC_X, "KC_X", &[]),
    (KC_Y, "KC_Y", &[]),
    (KC_Z, "KC_Z", &[]),
    (KC_1, "KC_1", &[]),
    (KC_2, "KC_2", &[]),
    (KC_3, "KC_3", &[]),
    (KC_4, "KC_4", &[]),
    (KC_5, "KC_5", &[]),
    (KC_6, "KC_6", &[]),
    (KC_7, "KC_7", &[]),
    (KC_8, "KC_8", &[]),
    (KC_9, "KC_9", &[]),
    (KC_0, "KC_0", &[]),
    (KC_ENTER, "KC_ENTER", &["KC_ENT"]),
    (KC_ESCAPE, "KC_ESCAPE", &["KC_ESC"]),
    (KC_BACKSPACE, "KC_BACKSPACE", &["KC_BSPC"]),
    (KC_TAB, "KC_TAB", &[]),
    (KC_SPACE, "KC_SPACE", &["KC_SPC"]),
    (KC_MINUS, "KC_MINUS", &["KC_MINS"]),
    (KC_EQUAL, "KC_EQUAL", &["KC_EQL"]),
    (KC_LEFT_BRACKET, "KC_LEFT_BRACKET", &["KC_LBRC"]),
    (KC_RIGHT_BRACKET, "KC_RIGHT_BRACKET", &["KC_RBRC"]),
    (KC_BACKSLASH, "KC_BACKSLASH", &["KC_BSLS"]),
    (KC_NONUS_HASH, "KC_NONUS_HASH", &["KC_NUHS"]),
    (KC_SEMICOLON, "KC_SEMICOLON", &["KC_SCLN"]),
    (KC_QUOTE, "KC_QUOTE", &["KC_QUOT"]),
    (KC_GRAVE, "KC_GRAVE", &["KC_GRV"]),
    (KC_COMMA, "KC_COMMA", &["KC_COMM"]),
    (KC_DOT, "KC_DOT", &[]),
    (KC_SLASH, "KC_SLASH", &["KC_SLSH"]),
    (KC_CAPS_LOCK, "KC_CAPS_LOCK", &["KC_CAPS"]),
    (KC_F1, "KC_F1", &[]),
    (KC_F2, "KC_F2", &[]),
    (KC_F3, "KC_F3", &[]),
    (KC_F4, "KC_F4", &[]),
    (KC_F5, "KC_F5", &[]),
    (KC_F6, "KC_F6", &[]),
    (KC_F7, "KC_F7", &[]),
    (KC_F8, "KC_F8", &[]),
    (KC_F9, "KC_F9", &[]),
    (KC_F10, "KC_F10", &[]),
    (KC_F11, "KC_F11", &[]),
    (KC_F12, "KC_F12", &[]),
    (KC_PRINT_SCREEN, "KC_PRINT_SCREEN", &["KC_PSCR"]),
    (KC_SCROLL_LOCK, "KC_SCROLL_LOCK", &["KC_SCRL"]),
    (KC_PAUSE, "KC_PAUSE", &["KC_PAUS"]),
    (KC_INSERT, "KC_INSERT", &["KC_INS"]),
    (KC_HOME, "KC_HOME", &[]),
    (KC_PAGE_UP, "KC_PAGE_UP", &["KC_PGUP"]),
    (KC_DELETE, "KC_DELETE", &["KC_DEL"]),
    (KC_END, "KC_END", &[]),
    (KC_PAGE_DOWN, "KC_PAGE_DOWN", &["KC_PGDN"]),
    (KC_RIGHT, "KC_RIGHT", &["KC_RGHT"]),
    (KC_LEFT, "KC_LEFT", &[]),
    (KC_DOWN, "KC_DOWN", &[]),
    (KC_UP, "KC_UP", &[]),
    (KC_NUM_LOCK, "KC_NUM_LOCK", &["KC_NUM"]),
    (KC_KP_SLASH, "KC_KP_SLASH", &["KC_PSLS"]),
    (KC_KP_ASTERISK, "KC_KP_ASTERISK", &["KC_PAST"]),
    (KC_KP_MINUS, "KC_KP_MINUS", &["KC_PMNS"]),
    (KC_KP_PLUS, "KC_KP_PLUS", &["KC_PPLS"]),
    (KC_KP_ENTER, "KC_KP_ENTER", &["KC_PENT"]),
    (KC_KP_1, "KC_KP_1", &["KC_P1"]),
    (KC_KP_2, "KC_KP_2", &["KC_P2"]),
    (KC_KP_3, "KC_KP_3", &["KC_P3"]),
    (KC_KP_4, "KC_KP_4", &["KC_P4"]),
    (KC_KP_5, "KC_KP_5", &["KC_P5"]),
    (KC_KP_6, "KC_KP_6", &["KC_P6"]),
    (KC_KP_7, "KC_KP_7", &["KC_P7"]),
    (KC_KP_8, "KC_KP_8", &["KC_P8"]),
    (KC_KP_9, "KC_KP_9", &["KC_P9"]),
    (KC_KP_0, "KC_KP_0", &["KC_P0"]),
    (KC_KP_DOT, "KC_KP_DOT", &["KC_PDOT"]),
    (KC_NONUS_BACKSLASH, "KC_NONUS_BACKSLASH", &["KC_NUBS"]),
    (KC_APPLICATION, "KC_APPLICATION", &["KC_APP"]),
    (KC_MS_UP, "KC_MS_UP", &["KC_MS_U"]),
    (KC_MS_DOWN, "KC_MS_DOWN", &["KC_MS_D"]),
    (KC_MS_LEFT, "KC_MS_LEFT", &["KC_MS_L"]),
    (KC_MS_RIGHT, "KC_MS_RIGHT", &["KC_MS_R"]),
    (KC_MS_BTN1, "KC_MS_BTN1", &["KC_BTN1"]),
    (KC_MS_BTN2, "KC_MS_BTN2", &["KC_BTN2"]),
    (KC_MS_BTN3, "KC_MS_BTN3", &["KC_BTN3"]),
    (KC_MS_WH_UP, "KC_MS_WH_UP", &["KC_WH_U"]),
    (KC_MS_WH_DOWN, "KC_MS_WH_DOWN", &["KC_WH_D"]),
    (KC_LEFT_CTRL, "KC_LEFT_CTRL", &["KC_LCTL"]),
    (KC_LEFT_SHIFT, "KC_LEFT_SHIFT", &["KC_LSFT"]),
    (KC_LEFT_ALT, "KC_LEFT_ALT", &["KC_LALT"]),
    (KC_LEFT_GUI, "KC_LEFT_GUI", &["KC_LGUI"]),
    (KC_RIGHT_CTRL, "KC_RIGHT_CTRL", &["KC_RCTL"]),
    (KC_RIGHT_SHIFT, "KC_RIGHT_SHIFT", &["KC_RSFT"]),
    (KC_RIGHT_ALT, "KC_RIGHT_ALT", &["KC_RALT"]),
    (KC_RIGHT_GUI, "KC_RIGHT_GUI", &["KC_RGUI"]),
];

/// Display name for a basic keycode
pub fn keycode_name(code: u16) -> &'static str {
    static NAMES: OnceLock<Vec<&'static str>> = OnceLock::new();
    NAMES
        .get_or_init(|| {
            let mut names = vec!["KC_UNKNOWN"; 0x100];
            for (keycode, name, _) in NAME_TABLE {
                names[keycode.code() as usize] = *name;
            }
            names
        })
        .get(code as usize)
        .copied()
        .unwrap_or("KC_UNKNOWN")
}

/// Try to parse a basic keycode name
///
/// Accepts canonical names (`KC_COMMA`), short aliases (`KC_COMM`),
/// and names without the `KC_` prefix (`comma`), case-insensitively.
pub fn keycode_from_name(name: &str) -> Option<Keycode> {
    static NAME_TO_CODE: OnceLock<Vec<(String, Keycode)>> = OnceLock::new();
    let map = NAME_TO_CODE.get_or_init(|| {
        let mut entries = Vec::new();
        for (keycode, name, aliases) in NAME_TABLE {
            entries.push((name.to_string(), *keycode));
            for alias in aliases.iter() {
                entries.push((alias.to_string(), *keycode));
            }
        }
        entries
    });

    let upper = name.trim().to_uppercase();
    let lookup = |wanted: &str| {
        map.iter()
            .find(|(n, _)| n == wanted)
            .map(|(_, keycode)| *keycode)
    };
    lookup(&upper).or_else(|| lookup(&format!("KC_{}", upper)))
}

fn display_keycode(keycode: Keycode, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mods = Mods::from_bits_truncate(keycode.mod_bits());
    if mods.is_empty() {
        return write!(f, "{}", keycode.name());
    }
    let wrappers = mods.wrapper_names();
    for wrapper in &wrappers {
        write!(f, "{}(", wrapper)?;
    }
    write!(f, "{}", keycode.name())?;
    for _ in &wrappers {
        write!(f, ")")?;
    }
    Ok(())
}

impl Keycode {
    /// Whether this is one of the 26 letter keys
    pub fn is_alpha(self) -> bool {
        (KC_A.code()..=KC_Z.code()).contains(&self.code())
    }

    /// Whether this is a top-row digit key, `KC_1` through `KC_0`
    pub fn is_digit(self) -> bool {
        (KC_1.code()..=KC_0.code()).contains(&self.code())
    }

    /// Whether this is a punctuation key, `KC_MINUS` through `KC_SLASH`
    /// or the ISO extra backslash
    pub fn is_punctuation(self) -> bool {
        (KC_MINUS.code()..=KC_SLASH.code()).contains(&self.code())
            || self == KC_NONUS_BACKSLASH
    }

    /// Whether this is a modifier key (`KC_LEFT_CTRL` through `KC_RIGHT_GUI`)
    pub fn is_modifier(self) -> bool {
        (KC_LEFT_CTRL.code()..=KC_RIGHT_GUI.code()).contains(&self.code())
    }

    /// Add modifier bits to this keycode
    pub fn with_mods(self, mods: Mods) -> Keycode {
        Keycode(self.0 | (u16::from(mods.bits()) << 8))
    }

    /// The modifiers carried by this keycode
    pub fn mods(self) -> Mods {
        Mods::from_bits_truncate(self.mod_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keycode_from_name() {
        assert_eq!(keycode_from_name("KC_A"), Some(KC_A));
        assert_eq!(keycode_from_name("a"), Some(KC_A));
        assert_eq!(keycode_from_name("KC_COMM"), Some(KC_COMMA));
        assert_eq!(keycode_from_name("comma"), Some(KC_COMMA));
        assert_eq!(keycode_from_name("KC_P0"), Some(KC_KP_0));
        assert_eq!(keycode_from_name("_______"), Some(KC_TRANSPARENT));
        assert_eq!(keycode_from_name("XXXXXXX"), Some(KC_NO));
        assert_eq!(keycode_from_name("KC_BOGUS"), None);
    }

    #[test]
    fn test_keycode_display() {
        assert_eq!(KC_A.to_string(), "KC_A");
        assert_eq!(KC_SEMICOLON.to_string(), "KC_SEMICOLON");
        assert_eq!(KC_9.with_mods(Mods::LSFT).to_string(), "S(KC_9)");
        assert_eq!(
            KC_A.with_mods(Mods::LCTL | Mods::LSFT).to_string(),
            "C(S(KC_A))"
        );
    }

    #[test]
    fn test_keycode_classes() {
        assert!(KC_A.is_alpha());
        assert!(KC_Z.is_alpha());
        assert!(!KC_1.is_alpha());
        assert!(KC_1.is_digit());
        assert!(KC_0.is_digit());
        assert!(!KC_KP_0.is_digit());
        assert!(KC_MINUS.is_punctuation());
        assert!(KC_SLASH.is_punctuation());
        assert!(KC_NONUS_BACKSLASH.is_punctuation());
        assert!(!KC_CAPS_LOCK.is_punctuation());
        assert!(KC_LEFT_SHIFT.is_modifier());
        assert!(!KC_SPACE.is_modifier());
    }

    #[test]
    fn test_keycode_mods_roundtrip() {
        let shifted = KC_9.with_mods(Mods::LSFT);
        assert_eq!(shifted.basic(), KC_9);
        assert_eq!(shifted.mods(), Mods::LSFT);
        assert_eq!(KC_9.mods(), Mods::empty());
    }

    #[test]
    fn test_keycode_ordering_and_hash() {
        use std::collections::HashMap;
        assert!(KC_A < KC_B);
        let mut map = HashMap::new();
        map.insert(KC_A, "value");
        assert_eq!(map.get(&Keycode::from(0x04)), Some(&"value"));
    }
}
