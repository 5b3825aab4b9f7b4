// Chordmap Keystore
// Press-time records for held keys, so every release mirrors its press

use std::collections::HashMap;

use crate::action::KeyEvent;
use crate::key_action::KeyAction;
use crate::layer::{KeyPos, Layer};
use crate::modifier::Mods;
use crate::tap_dance::TapDanceOutcome;
use crate::Keycode;

/// What the press of a key did, which is what its release must undo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Nothing to undo (no-op keys, DF, TO)
    Nothing,
    /// A 16-bit keycode was registered
    Registered(Keycode),
    /// Momentary layer turned on
    Layer(Layer),
    /// Tap-hold resolved as a modifier hold
    ModHold(Mods),
    /// Tap-hold resolved as a layer hold
    LayerHold(Layer),
    /// Auto-shift emitted, shifted or not
    AutoShift { shifted: bool },
    /// Intercepted by custom action dispatch
    Custom,
    /// Tap dance finished while the key was still down
    TapDance(TapDanceOutcome),
}

/// State of one held key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keystate {
    pub pos: KeyPos,
    /// The action resolved when the key went down
    pub action: KeyAction,
    /// Press timestamp in milliseconds
    pub pressed_at: u32,
    pub handled: Handled,
}

impl Keystate {
    pub fn new(event: &KeyEvent, action: KeyAction, handled: Handled) -> Self {
        Self {
            pos: event.pos,
            action,
            pressed_at: event.time,
            handled,
        }
    }
}

/// Held keys by matrix position.
///
/// Release looks up the record stored at press time instead of resolving
/// the key again, so a layer change while a key is down cannot strand it.
#[derive(Debug, Clone, Default)]
pub struct Keystore {
    states: HashMap<KeyPos, Keystate>,
}

impl Keystore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, pos: KeyPos) -> Option<&Keystate> {
        self.states.get(&pos)
    }

    /// Record a press, replacing any stale record at the same position
    pub fn insert(&mut self, keystate: Keystate) {
        if let Some(stale) = self.states.insert(keystate.pos, keystate) {
            log::warn!("key {} pressed twice without release ({})", stale.pos, stale.action);
        }
    }

    pub fn remove(&mut self, pos: KeyPos) -> Option<Keystate> {
        self.states.remove(&pos)
    }

    pub fn is_held(&self, pos: KeyPos) -> bool {
        self.states.contains_key(&pos)
    }

    /// Held keys ordered by press time
    pub fn held(&self) -> Vec<Keystate> {
        let mut held: Vec<Keystate> = self.states.values().copied().collect();
        held.sort_by_key(|ks| (ks.pressed_at, ks.pos));
        held
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::kc::*;
    use crate::key_action::{k, mo};

    #[test]
    fn test_keystore_insert_remove() {
        let mut store = Keystore::new();
        let event = KeyEvent::press(KeyPos::new(0, 1), 10);
        store.insert(Keystate::new(&event, k(KC_Q), Handled::Registered(KC_Q)));

        assert!(store.is_held(KeyPos::new(0, 1)));
        assert_eq!(store.len(), 1);

        let removed = store.remove(KeyPos::new(0, 1));
        assert_eq!(removed.map(|ks| ks.handled), Some(Handled::Registered(KC_Q)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_keystore_held_in_press_order() {
        let mut store = Keystore::new();
        let late = KeyEvent::press(KeyPos::new(0, 0), 30);
        let early = KeyEvent::press(KeyPos::new(3, 8), 5);
        store.insert(Keystate::new(&late, k(KC_TAB), Handled::Registered(KC_TAB)));
        store.insert(Keystate::new(&early, mo(5), Handled::Layer(5)));

        let held = store.held();
        assert_eq!(held[0].pos, KeyPos::new(3, 8));
        assert_eq!(held[1].pos, KeyPos::new(0, 0));
    }
}
