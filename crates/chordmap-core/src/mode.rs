// Chordmap Mode State
// Session flags selecting base variant, gaming mode and letter auto-shift

use std::fmt;

use serde::Deserialize;
use strum_macros::{Display, EnumIter, EnumString};

/// Base layout variant. Colemak is the default; Qwerty is an overlay.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Colemak,
    Qwerty,
}

impl Variant {
    pub fn is_default(self) -> bool {
        self == Variant::default()
    }

    pub fn toggled(self) -> Variant {
        match self {
            Variant::Colemak => Variant::Qwerty,
            Variant::Qwerty => Variant::Colemak,
        }
    }
}

bitflags::bitflags! {
    /// Raw mode bits, the way the firmware stores them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModeFlags: u8 {
        const QWERTY = 1 << 0;
        const GAMING = 1 << 1;
        const ALPHA_AUTO_SHIFT = 1 << 2;
    }
}

/// The session mode. Resets to defaults at every boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModeState {
    flags: ModeFlags,
}

impl ModeState {
    pub fn new(variant: Variant, gaming: bool, alpha_auto_shift: bool) -> Self {
        let mut mode = Self::default();
        mode.set_variant(variant);
        mode.set_gaming(gaming);
        mode.set_alpha_auto_shift(alpha_auto_shift);
        mode
    }

    pub fn variant(&self) -> Variant {
        if self.flags.contains(ModeFlags::QWERTY) {
            Variant::Qwerty
        } else {
            Variant::Colemak
        }
    }

    pub fn gaming(&self) -> bool {
        self.flags.contains(ModeFlags::GAMING)
    }

    pub fn alpha_auto_shift(&self) -> bool {
        self.flags.contains(ModeFlags::ALPHA_AUTO_SHIFT)
    }

    pub fn flags(&self) -> ModeFlags {
        self.flags
    }

    pub(crate) fn set_variant(&mut self, variant: Variant) {
        self.flags.set(ModeFlags::QWERTY, variant == Variant::Qwerty);
    }

    pub(crate) fn set_gaming(&mut self, gaming: bool) {
        self.flags.set(ModeFlags::GAMING, gaming);
    }

    pub(crate) fn set_alpha_auto_shift(&mut self, enabled: bool) {
        self.flags.set(ModeFlags::ALPHA_AUTO_SHIFT, enabled);
    }
}

impl fmt::Display for ModeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "variant={} gaming={} alpha_auto_shift={}",
            self.variant(),
            self.gaming(),
            self.alpha_auto_shift()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_mode_defaults() {
        let mode = ModeState::default();
        assert_eq!(mode.variant(), Variant::Colemak);
        assert!(!mode.gaming());
        assert!(!mode.alpha_auto_shift());
        assert!(mode.flags().is_empty());
    }

    #[test]
    fn test_mode_setters_touch_one_flag() {
        let mut mode = ModeState::new(Variant::Qwerty, false, true);
        assert_eq!(mode.flags(), ModeFlags::QWERTY | ModeFlags::ALPHA_AUTO_SHIFT);

        mode.set_gaming(true);
        assert!(mode.gaming());
        assert_eq!(mode.variant(), Variant::Qwerty);

        mode.set_variant(Variant::Colemak);
        assert_eq!(mode.flags(), ModeFlags::GAMING | ModeFlags::ALPHA_AUTO_SHIFT);
    }

    #[test]
    fn test_variant_parse_and_toggle() {
        assert_eq!(Variant::from_str("qwerty"), Ok(Variant::Qwerty));
        assert_eq!(Variant::from_str("Colemak"), Ok(Variant::Colemak));
        assert_eq!(Variant::Colemak.toggled(), Variant::Qwerty);
        assert!(Variant::Colemak.is_default());
        assert_eq!(Variant::Qwerty.to_string(), "qwerty");
    }
}
