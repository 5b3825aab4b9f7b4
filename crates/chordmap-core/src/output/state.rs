// Chordmap Registered Key State
// HashMap-based O(1) lookup for keycodes currently held down on the host

use crate::Keycode;
use std::collections::HashMap;

/// Tracks keycodes registered on the host with O(1) lookup.
///
/// Registrations are counted so two sources holding the same modifier
/// (a mod-tap hold and a shifted keycode, say) release it only when both
/// have unregistered.
#[derive(Debug, Clone, Default)]
pub struct PressedKeyState {
    pressed: HashMap<Keycode, u32>,
}

impl PressedKeyState {
    /// Create a new empty pressed key state
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one registration of a keycode
    pub fn add(&mut self, keycode: Keycode) {
        *self.pressed.entry(keycode).or_insert(0) += 1;
    }

    /// Drop one registration of a keycode.
    /// Returns false if the keycode was not registered.
    pub fn remove(&mut self, keycode: Keycode) -> bool {
        match self.pressed.get_mut(&keycode) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.pressed.remove(&keycode);
                true
            }
            None => false,
        }
    }

    /// Check if a keycode is currently registered
    pub fn is_pressed(&self, keycode: Keycode) -> bool {
        self.pressed.contains_key(&keycode)
    }

    /// Get all registered keycodes, sorted for stable comparisons
    pub fn get_all(&self) -> Vec<Keycode> {
        let mut all: Vec<Keycode> = self.pressed.keys().copied().collect();
        all.sort();
        all
    }

    /// Get the number of distinct registered keycodes
    pub fn len(&self) -> usize {
        self.pressed.len()
    }

    /// Check if the state is empty
    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::kc::*;

    #[test]
    fn test_state_add_remove() {
        let mut state = PressedKeyState::new();

        assert!(!state.is_pressed(KC_A));
        state.add(KC_A);
        assert!(state.is_pressed(KC_A));
        assert!(state.remove(KC_A));
        assert!(!state.is_pressed(KC_A));
    }

    #[test]
    fn test_state_counts_registrations() {
        let mut state = PressedKeyState::new();
        state.add(KC_LEFT_SHIFT);
        state.add(KC_LEFT_SHIFT);
        assert_eq!(state.len(), 1);

        state.remove(KC_LEFT_SHIFT);
        assert!(state.is_pressed(KC_LEFT_SHIFT));
        state.remove(KC_LEFT_SHIFT);
        assert!(state.is_empty());
    }

    #[test]
    fn test_state_get_all_sorted() {
        let mut state = PressedKeyState::new();
        state.add(KC_C);
        state.add(KC_A);
        state.add(KC_B);
        assert_eq!(state.get_all(), vec![KC_A, KC_B, KC_C]);
    }

    #[test]
    fn test_state_remove_nonexistent() {
        let mut state = PressedKeyState::new();
        // Removing a key that was never registered is reported, not a panic
        assert!(!state.remove(KC_A));
        assert!(state.is_empty());
    }
}
