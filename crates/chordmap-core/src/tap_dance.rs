// Chordmap Tap Dance
// Keys whose action depends on tap count and whether the last tap is held

use crate::key::kc::*;
use crate::output::HostOutput;
use crate::Keycode;

/// How a tap-dance sequence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapDanceOutcome {
    pub count: u8,
    /// Still held when the sequence finished, and not interrupted
    pub is_hold: bool,
}

impl TapDanceOutcome {
    pub fn new(count: u8, pressed: bool, interrupted: bool) -> Self {
        Self {
            count,
            is_hold: pressed && !interrupted,
        }
    }
}

/// A tap dance with distinct single-tap, single-hold and double-tap keycodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapDanceAction {
    pub name: &'static str,
    pub single_tap: Keycode,
    pub single_hold: Keycode,
    pub double_tap: Keycode,
}

impl TapDanceAction {
    /// The keycode for an outcome; counts above two do nothing
    pub fn keycode_for(&self, outcome: TapDanceOutcome) -> Option<Keycode> {
        match outcome.count {
            1 if outcome.is_hold => Some(self.single_hold),
            1 => Some(self.single_tap),
            2 => Some(self.double_tap),
            _ => None,
        }
    }

    /// Sequence finished: register the chosen keycode
    pub fn finished(&self, outcome: TapDanceOutcome, host: &mut dyn HostOutput) {
        if let Some(keycode) = self.keycode_for(outcome) {
            log::debug!(
                "tap dance {} finished: count={} hold={} -> {}",
                self.name,
                outcome.count,
                outcome.is_hold,
                keycode
            );
            host.register_code(keycode);
        }
    }

    /// Key released after the sequence finished. Takes the outcome given to
    /// `finished`, so the same keycode is unregistered.
    pub fn reset(&self, outcome: TapDanceOutcome, host: &mut dyn HostOutput) {
        if let Some(keycode) = self.keycode_for(outcome) {
            host.unregister_code(keycode);
        }
    }
}

/// `TD_LALT`: Home on tap, left Alt on hold, End on double tap
pub const TD_LALT: TapDanceAction = TapDanceAction {
    name: "TD_LALT",
    single_tap: KC_HOME,
    single_hold: KC_LEFT_ALT,
    double_tap: KC_END,
};

/// Tap dances by index, as referenced by `TD(n)`
#[derive(Debug, Clone, Default)]
pub struct TapDanceTable {
    actions: Vec<TapDanceAction>,
}

impl TapDanceTable {
    pub fn new(actions: Vec<TapDanceAction>) -> Self {
        Self { actions }
    }

    pub fn get(&self, index: u8) -> Option<&TapDanceAction> {
        self.actions.get(index as usize)
    }

    pub fn index_of(&self, name: &str) -> Option<u8> {
        self.actions
            .iter()
            .position(|action| action.name.eq_ignore_ascii_case(name))
            .map(|index| index as u8)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{HostEvent, RecordingHost};

    #[test]
    fn test_outcome_hold_needs_uninterrupted_press() {
        assert!(TapDanceOutcome::new(1, true, false).is_hold);
        assert!(!TapDanceOutcome::new(1, true, true).is_hold);
        assert!(!TapDanceOutcome::new(1, false, false).is_hold);
    }

    #[test]
    fn test_td_lalt_keycodes() {
        assert_eq!(TD_LALT.keycode_for(TapDanceOutcome::new(1, false, false)), Some(KC_HOME));
        assert_eq!(TD_LALT.keycode_for(TapDanceOutcome::new(1, true, false)), Some(KC_LEFT_ALT));
        assert_eq!(TD_LALT.keycode_for(TapDanceOutcome::new(2, true, false)), Some(KC_END));
        assert_eq!(TD_LALT.keycode_for(TapDanceOutcome::new(3, false, false)), None);
    }

    #[test]
    fn test_reset_mirrors_finished() {
        for outcome in [
            TapDanceOutcome::new(1, false, false),
            TapDanceOutcome::new(1, true, false),
            TapDanceOutcome::new(1, true, true),
            TapDanceOutcome::new(2, false, false),
            TapDanceOutcome::new(4, true, false),
        ] {
            let mut host = RecordingHost::new();
            TD_LALT.finished(outcome, &mut host);
            TD_LALT.reset(outcome, &mut host);
            assert!(host.stuck_keys().is_empty());
            assert!(host.unbalanced_releases().is_empty());
        }
    }

    #[test]
    fn test_hold_registers_alt() {
        let mut host = RecordingHost::new();
        TD_LALT.finished(TapDanceOutcome::new(1, true, false), &mut host);
        assert_eq!(host.events(), &[HostEvent::Register(KC_LEFT_ALT)]);
    }

    #[test]
    fn test_table_lookup() {
        let table = TapDanceTable::new(vec![TD_LALT]);
        assert_eq!(table.index_of("td_lalt"), Some(0));
        assert_eq!(table.get(0).map(|td| td.single_tap), Some(KC_HOME));
        assert!(table.get(1).is_none());
    }
}
