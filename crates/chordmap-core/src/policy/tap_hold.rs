// Chordmap Tap-Hold Table
// Declarative per-key tap-hold settings with documented defaults

use std::collections::HashMap;

use super::TapHoldPolicy;
use crate::key_action::KeyAction;

pub const DEFAULT_TAPPING_TERM: u16 = 175;

/// Per-key overrides. `None` fields fall back to the table defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TapHoldRecord {
    pub tapping_term: Option<u16>,
    pub ignore_interrupt: Option<bool>,
    pub hold_on_other_key_press: Option<bool>,
    pub permissive_hold: Option<bool>,
}

impl TapHoldRecord {
    pub fn with_term(term: u16) -> Self {
        Self {
            tapping_term: Some(term),
            ..Self::default()
        }
    }
}

/// Keyed tap-hold settings.
///
/// Defaults: term 175 ms, interrupts honoured, hold on other key press,
/// permissive hold.
#[derive(Debug, Clone)]
pub struct TapHoldTable {
    tapping_term: u16,
    ignore_interrupt: bool,
    hold_on_other_key_press: bool,
    permissive_hold: bool,
    overrides: HashMap<KeyAction, TapHoldRecord>,
}

impl Default for TapHoldTable {
    fn default() -> Self {
        Self {
            tapping_term: DEFAULT_TAPPING_TERM,
            ignore_interrupt: false,
            hold_on_other_key_press: true,
            permissive_hold: true,
            overrides: HashMap::new(),
        }
    }
}

impl TapHoldTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the term used by keys without their own
    pub fn set_default_term(&mut self, term: u16) {
        self.tapping_term = term;
    }

    pub fn default_term(&self) -> u16 {
        self.tapping_term
    }

    /// Add or merge an override; set fields replace earlier ones
    pub fn set_override(&mut self, action: KeyAction, record: TapHoldRecord) {
        let entry = self.overrides.entry(action).or_default();
        entry.tapping_term = record.tapping_term.or(entry.tapping_term);
        entry.ignore_interrupt = record.ignore_interrupt.or(entry.ignore_interrupt);
        entry.hold_on_other_key_press = record
            .hold_on_other_key_press
            .or(entry.hold_on_other_key_press);
        entry.permissive_hold = record.permissive_hold.or(entry.permissive_hold);
    }

    pub fn get_override(&self, action: &KeyAction) -> Option<&TapHoldRecord> {
        self.overrides.get(action)
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl TapHoldPolicy for TapHoldTable {
    fn tapping_term(&self, action: &KeyAction) -> u16 {
        self.get_override(action)
            .and_then(|r| r.tapping_term)
            .unwrap_or(self.tapping_term)
    }

    fn ignore_interrupt(&self, action: &KeyAction) -> bool {
        self.get_override(action)
            .and_then(|r| r.ignore_interrupt)
            .unwrap_or(self.ignore_interrupt)
    }

    fn hold_on_other_key_press(&self, action: &KeyAction) -> bool {
        self.get_override(action)
            .and_then(|r| r.hold_on_other_key_press)
            .unwrap_or(self.hold_on_other_key_press)
    }

    fn permissive_hold(&self, action: &KeyAction) -> bool {
        self.get_override(action)
            .and_then(|r| r.permissive_hold)
            .unwrap_or(self.permissive_hold)
    }
}
