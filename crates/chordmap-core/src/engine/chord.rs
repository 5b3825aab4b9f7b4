// Chordmap Chord Matching
// Buffers presses that may form a combo and decides which combo fires

use smallvec::SmallVec;

use crate::action::KeyEvent;
use crate::key_action::KeyAction;
use crate::layer::KeyPos;
use crate::policy::ComboPolicy;
use crate::state::KeyboardState;

/// A press held back while a chord may still complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferedPress {
    pub event: KeyEvent,
    /// The action that identifies this key in combo declarations
    pub action: KeyAction,
}

/// A combo that fired and whose keys are not all released yet
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveCombo {
    index: usize,
    positions: SmallVec<[KeyPos; 4]>,
    released: bool,
}

/// The combo to fire and the buffer entries it consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordMatch {
    pub index: usize,
    pub used: SmallVec<[usize; 4]>,
}

/// Whether every action is a distinct member of `keys`
fn fits(keys: &[KeyAction], actions: &[KeyAction]) -> bool {
    actions.len() <= keys.len()
        && actions
            .iter()
            .enumerate()
            .all(|(i, action)| keys.contains(action) && !actions[..i].contains(action))
}

/// Chord buffer and active combos.
///
/// Only presses that can still grow into an eligible combo are buffered.
/// When nothing more can complete, the longest complete combo wins, with
/// declaration order breaking ties; presses it does not use are flushed.
#[derive(Debug, Clone, Default)]
pub struct ChordMatcher {
    buffer: Vec<BufferedPress>,
    active: Vec<ActiveCombo>,
}

impl ChordMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_buffering(&self) -> bool {
        !self.buffer.is_empty()
    }

    pub fn is_buffered(&self, pos: KeyPos) -> bool {
        self.buffer.iter().any(|p| p.event.pos == pos)
    }

    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }

    fn start(&self) -> Option<u32> {
        self.buffer.first().map(|p| p.event.time)
    }

    fn actions(&self) -> SmallVec<[KeyAction; 4]> {
        self.buffer.iter().map(|p| p.action).collect()
    }

    fn elapsed(&self, now: u32) -> u32 {
        self.start().map_or(0, |start| now.wrapping_sub(start))
    }

    /// Whether a press of `action` at `time` can join the buffer
    pub fn accepts(
        &self,
        action: &KeyAction,
        time: u32,
        combos: &dyn ComboPolicy,
        state: &KeyboardState,
    ) -> bool {
        let mut actions = self.actions();
        actions.push(*action);
        let elapsed = self.elapsed(time);
        (0..combos.combo_count()).any(|index| {
            fits(combos.combo_keys(index), &actions)
                && elapsed < u32::from(combos.combo_term(index))
                && combos.combo_should_trigger(index, action, state)
        })
    }

    pub fn push(&mut self, press: BufferedPress) {
        log::trace!("chord buffer: {} ({})", press.event, press.action);
        self.buffer.push(press);
    }

    /// Whether the buffer should keep waiting at `now`: a larger combo may
    /// still complete, or a complete must-hold combo has not been held long
    /// enough
    pub fn should_wait(&self, now: u32, combos: &dyn ComboPolicy, state: &KeyboardState) -> bool {
        let actions = self.actions();
        let Some(trigger) = actions.last() else {
            return false;
        };
        let elapsed = self.elapsed(now);
        (0..combos.combo_count()).any(|index| {
            let keys = combos.combo_keys(index);
            fits(keys, &actions)
                && elapsed < u32::from(combos.combo_term(index))
                && (actions.len() < keys.len() || combos.combo_must_hold(index))
                && combos.combo_should_trigger(index, trigger, state)
        })
    }

    /// Pick the combo to fire from the buffer.
    ///
    /// `released` means a buffered key went up, which rules out must-hold
    /// combos.
    pub fn decide(
        &self,
        now: u32,
        released: bool,
        combos: &dyn ComboPolicy,
        state: &KeyboardState,
    ) -> Option<ChordMatch> {
        let trigger = self.buffer.last()?.action;
        let start = self.start()?;
        let held_for = now.wrapping_sub(start);
        let mut best: Option<ChordMatch> = None;

        'combos: for index in 0..combos.combo_count() {
            let keys = combos.combo_keys(index);
            if keys.is_empty() || !combos.combo_should_trigger(index, &trigger, state) {
                continue;
            }
            let mut used: SmallVec<[usize; 4]> = SmallVec::new();
            for key in keys {
                match self.buffer.iter().position(|p| p.action == *key) {
                    Some(slot) => used.push(slot),
                    None => continue 'combos,
                }
            }

            // Offsets from the start of the buffer, safe across clock wrap
            let offsets = used
                .iter()
                .map(|&slot| self.buffer[slot].event.time.wrapping_sub(start));
            let first = offsets.clone().min().unwrap_or(0);
            let last = offsets.max().unwrap_or(0);
            let term = u32::from(combos.combo_term(index));
            if last - first >= term {
                continue;
            }
            if combos.combo_must_hold(index)
                && (released || held_for.saturating_sub(first) < term)
            {
                continue;
            }

            let longer = best.as_ref().map_or(true, |b| used.len() > b.used.len());
            if longer {
                best = Some(ChordMatch { index, used });
            }
        }
        best
    }

    /// Empty the buffer, in press order
    pub fn take_buffer(&mut self) -> Vec<BufferedPress> {
        std::mem::take(&mut self.buffer)
    }

    pub fn activate(&mut self, index: usize, positions: SmallVec<[KeyPos; 4]>) {
        self.active.push(ActiveCombo {
            index,
            positions,
            released: false,
        });
    }

    /// A key went up. Returns the combo it belongs to and whether this is
    /// the first of its keys to be released.
    pub fn release_active(&mut self, pos: KeyPos) -> Option<(usize, bool)> {
        let slot = self
            .active
            .iter()
            .position(|combo| combo.positions.contains(&pos))?;
        let combo = &mut self.active[slot];
        combo.positions.retain(|p| *p != pos);
        let first = !combo.released;
        combo.released = true;
        let index = combo.index;
        if combo.positions.is_empty() {
            self.active.remove(slot);
        }
        Some((index, first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combo::{ComboDef, ComboGate, ComboOutput, ComboTable};
    use crate::key::kc::*;
    use crate::key_action::{k, s};
    use crate::mode::{ModeState, Variant};
    use crate::output::RecordingHost;
    use crate::state::ModeLayers;

    fn combos() -> ComboTable {
        let mut table = ComboTable::new();
        table.push(
            ComboDef::new("l_paren", &[k(KC_S), k(KC_T)], ComboOutput::Key(s(KC_9))).with_term(30),
        );
        table.push(ComboDef::new("r_brack", &[k(KC_L), k(KC_U)], ComboOutput::Key(KC_RIGHT_BRACKET)));
        table.push(ComboDef::new(
            "settings",
            &[k(KC_L), k(KC_U), k(KC_Y), k(KC_SEMICOLON)],
            ComboOutput::OneShotLayer(5),
        ));
        table.push(
            ComboDef::new("held", &[k(KC_Z), k(KC_X)], ComboOutput::Key(KC_ESCAPE))
                .with_must_hold(true),
        );
        table.push(
            ComboDef::new("qwerty_only", &[k(KC_V), k(KC_B)], ComboOutput::Key(KC_TAB))
                .with_gate(ComboGate::Variant(Variant::Qwerty)),
        );
        table
    }

    fn state() -> KeyboardState {
        let mut host = RecordingHost::new();
        let mut state = KeyboardState::new(ModeLayers::default());
        state.post_init(ModeState::default(), &mut host);
        state
    }

    fn press(matcher: &mut ChordMatcher, col: u8, keycode: crate::Keycode, time: u32) {
        matcher.push(BufferedPress {
            event: KeyEvent::press(KeyPos::new(0, col), time),
            action: k(keycode),
        });
    }

    #[test]
    fn test_fits() {
        let keys = [k(KC_L), k(KC_U), k(KC_Y)];
        assert!(fits(&keys, &[k(KC_U)]));
        assert!(fits(&keys, &[k(KC_Y), k(KC_L)]));
        assert!(!fits(&keys, &[k(KC_U), k(KC_U)]));
        assert!(!fits(&keys, &[k(KC_A)]));
    }

    #[test]
    fn test_accepts_only_eligible_constituents() {
        let (table, state) = (combos(), state());
        let matcher = ChordMatcher::new();
        assert!(matcher.accepts(&k(KC_S), 0, &table, &state));
        assert!(!matcher.accepts(&k(KC_A), 0, &table, &state));
        // Gated to the other variant
        assert!(!matcher.accepts(&k(KC_V), 0, &table, &state));
    }

    #[test]
    fn test_accepts_respects_term() {
        let (table, state) = (combos(), state());
        let mut matcher = ChordMatcher::new();
        press(&mut matcher, 3, KC_S, 100);
        assert!(matcher.accepts(&k(KC_T), 129, &table, &state));
        assert!(!matcher.accepts(&k(KC_T), 130, &table, &state));
    }

    #[test]
    fn test_complete_pair_fires_without_waiting() {
        let (table, state) = (combos(), state());
        let mut matcher = ChordMatcher::new();
        press(&mut matcher, 3, KC_S, 0);
        assert!(matcher.should_wait(0, &table, &state));
        press(&mut matcher, 4, KC_T, 10);
        assert!(!matcher.should_wait(10, &table, &state));

        let decision = matcher.decide(10, false, &table, &state);
        assert_eq!(decision.map(|d| d.index), Some(0));
    }

    #[test]
    fn test_subset_waits_for_larger_combo() {
        let (table, state) = (combos(), state());
        let mut matcher = ChordMatcher::new();
        press(&mut matcher, 7, KC_L, 0);
        press(&mut matcher, 8, KC_U, 5);
        // r_brack is complete but settings could still grow
        assert!(matcher.should_wait(5, &table, &state));
        assert_eq!(matcher.decide(5, false, &table, &state).map(|d| d.index), Some(1));

        press(&mut matcher, 9, KC_Y, 10);
        press(&mut matcher, 10, KC_SEMICOLON, 15);
        assert!(!matcher.should_wait(15, &table, &state));
        let decision = matcher.decide(15, false, &table, &state);
        assert_eq!(decision.as_ref().map(|d| d.index), Some(2));
        assert_eq!(decision.map(|d| d.used.len()), Some(4));

        // Window closed: nothing left to wait for
        let mut partial = ChordMatcher::new();
        press(&mut partial, 7, KC_L, 0);
        press(&mut partial, 8, KC_U, 5);
        assert!(!partial.should_wait(40, &table, &state));
    }

    #[test]
    fn test_must_hold_needs_full_term() {
        let (table, state) = (combos(), state());
        let mut matcher = ChordMatcher::new();
        press(&mut matcher, 1, KC_Z, 0);
        press(&mut matcher, 2, KC_X, 5);

        assert!(matcher.should_wait(5, &table, &state));
        assert_eq!(matcher.decide(5, false, &table, &state), None);
        assert_eq!(matcher.decide(20, true, &table, &state), None);
        assert!(!matcher.should_wait(40, &table, &state));
        assert_eq!(matcher.decide(40, false, &table, &state).map(|d| d.index), Some(3));
    }

    #[test]
    fn test_release_active_reports_first_release_once() {
        let mut matcher = ChordMatcher::new();
        let positions: SmallVec<[KeyPos; 4]> =
            [KeyPos::new(1, 3), KeyPos::new(1, 4)].into_iter().collect();
        matcher.activate(0, positions);

        assert_eq!(matcher.release_active(KeyPos::new(1, 4)), Some((0, true)));
        assert!(matcher.has_active());
        assert_eq!(matcher.release_active(KeyPos::new(1, 3)), Some((0, false)));
        assert!(!matcher.has_active());
        assert_eq!(matcher.release_active(KeyPos::new(1, 3)), None);
    }
}
