// Chordmap 16-bit Keycode Sending
// Splits a keycode with modifier bits into the presses the host needs

use smallvec::SmallVec;

use super::HostOutput;
use crate::key::kc::KC_NO;
use crate::Keycode;

/// Keys to press, in order, to send a 16-bit keycode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code16Sequence {
    /// Modifier keycodes, pressed before and released after the main key
    pub modifiers: SmallVec<[Keycode; 4]>,
    /// The basic keycode
    pub main_key: Keycode,
}

/// Calculate the modifier and main-key presses for a 16-bit keycode
pub fn code16_sequence(keycode: Keycode) -> Code16Sequence {
    Code16Sequence {
        modifiers: keycode.mods().keycodes(),
        main_key: keycode.basic(),
    }
}

/// Register a keycode together with the modifiers it carries
pub fn register_code16(host: &mut dyn HostOutput, keycode: Keycode) {
    let sequence = code16_sequence(keycode);
    for modifier in &sequence.modifiers {
        host.register_code(*modifier);
    }
    if sequence.main_key != KC_NO {
        host.register_code(sequence.main_key);
    }
}

/// Unregister a keycode registered with `register_code16`, in reverse order
pub fn unregister_code16(host: &mut dyn HostOutput, keycode: Keycode) {
    let sequence = code16_sequence(keycode);
    if sequence.main_key != KC_NO {
        host.unregister_code(sequence.main_key);
    }
    for modifier in sequence.modifiers.iter().rev() {
        host.unregister_code(*modifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::kc::*;
    use crate::key_action::s;
    use crate::modifier::Mods;
    use crate::output::{HostEvent, RecordingHost};

    #[test]
    fn test_sequence_no_modifiers() {
        let sequence = code16_sequence(KC_A);
        assert!(sequence.modifiers.is_empty());
        assert_eq!(sequence.main_key, KC_A);
    }

    #[test]
    fn test_sequence_with_modifiers() {
        let sequence = code16_sequence(KC_A.with_mods(Mods::LCTL | Mods::LSFT));
        assert_eq!(sequence.modifiers.as_slice(), &[KC_LEFT_CTRL, KC_LEFT_SHIFT]);
        assert_eq!(sequence.main_key, KC_A);
    }

    #[test]
    fn test_register_unregister_code16_order() {
        let mut host = RecordingHost::new();
        register_code16(&mut host, s(KC_9));
        unregister_code16(&mut host, s(KC_9));

        assert_eq!(
            host.events(),
            &[
                HostEvent::Register(KC_LEFT_SHIFT),
                HostEvent::Register(KC_9),
                HostEvent::Unregister(KC_9),
                HostEvent::Unregister(KC_LEFT_SHIFT),
            ]
        );
        assert!(host.stuck_keys().is_empty());
    }
}
