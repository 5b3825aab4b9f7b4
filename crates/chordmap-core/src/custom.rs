// Chordmap Custom Actions
// Reserved keycodes handled before normal key processing

use crate::key_action::{CustomKeycode, KeyAction};
use crate::output::HostOutput;
use crate::state::KeyboardState;

/// Whether default processing should run after the user hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processing {
    /// The key was consumed
    Handled,
    Continue,
}

impl Processing {
    pub fn is_handled(self) -> bool {
        self == Processing::Handled
    }
}

/// Literal strings sent by `MACRO(n)` keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    strings: Vec<String>,
}

impl MacroTable {
    pub fn new<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strings: strings.into_iter().map(Into::into).collect(),
        }
    }

    pub fn get(&self, index: u8) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Intercept reserved keycodes.
///
/// Press applies the action; release does nothing. Both are reported as
/// `Handled` so the key never reaches default processing.
pub fn process_record_user(
    action: &KeyAction,
    pressed: bool,
    state: &mut KeyboardState,
    macros: &MacroTable,
    host: &mut dyn HostOutput,
) -> Processing {
    match action {
        KeyAction::Custom(custom) => {
            if pressed {
                log::debug!("custom keycode {}", custom);
                match custom {
                    CustomKeycode::Home => state.home(host),
                    CustomKeycode::ToggleVariant => state.toggle_variant(host),
                    CustomKeycode::ToggleGaming => state.toggle_gaming(host),
                    CustomKeycode::ToggleAlphaAutoShift => state.toggle_alpha_auto_shift(host),
                }
            }
            Processing::Handled
        }
        KeyAction::Macro(index) => {
            if pressed {
                match macros.get(*index) {
                    Some(text) => host.send_string(text),
                    None => log::warn!("MACRO({}) has no string", index),
                }
            }
            Processing::Handled
        }
        _ => Processing::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::kc::*;
    use crate::key_action::{ck, k};
    use crate::mode::{ModeState, Variant};
    use crate::output::RecordingHost;
    use crate::state::ModeLayers;

    fn setup() -> (KeyboardState, RecordingHost, MacroTable) {
        let mut host = RecordingHost::new();
        let mut state = KeyboardState::new(ModeLayers {
            base: 0,
            variant_overlay: Some(1),
            gaming_overlay: Some(2),
        });
        state.post_init(ModeState::default(), &mut host);
        host.take_events();
        (state, host, MacroTable::new(["->"]))
    }

    #[test]
    fn test_toggles_apply_on_press_only() {
        let (mut state, mut host, macros) = setup();
        let gaming = ck(CustomKeycode::ToggleGaming);

        let pressed = process_record_user(&gaming, true, &mut state, &macros, &mut host);
        assert_eq!(pressed, Processing::Handled);
        assert!(state.mode().gaming());

        let released = process_record_user(&gaming, false, &mut state, &macros, &mut host);
        assert_eq!(released, Processing::Handled);
        assert!(state.mode().gaming());
        assert_eq!(state.layers().active_layers().as_slice(), &[0, 2]);
    }

    #[test]
    fn test_variant_and_alpha_toggles() {
        let (mut state, mut host, macros) = setup();
        process_record_user(&ck(CustomKeycode::ToggleVariant), true, &mut state, &macros, &mut host);
        process_record_user(
            &ck(CustomKeycode::ToggleAlphaAutoShift),
            true,
            &mut state,
            &macros,
            &mut host,
        );
        assert_eq!(state.variant(), Variant::Qwerty);
        assert!(state.mode().alpha_auto_shift());
        assert_eq!(state.layers().active_layers().as_slice(), &[0, 1]);
    }

    #[test]
    fn test_home_clears_transient_layers() {
        let (mut state, mut host, macros) = setup();
        state.layers_mut().layer_on(3);
        process_record_user(&ck(CustomKeycode::Home), true, &mut state, &macros, &mut host);
        assert_eq!(state.layers().active_layers().as_slice(), &[0]);
    }

    #[test]
    fn test_macro_sends_string() {
        let (mut state, mut host, macros) = setup();
        assert!(process_record_user(&KeyAction::Macro(0), true, &mut state, &macros, &mut host)
            .is_handled());
        assert!(process_record_user(&KeyAction::Macro(9), true, &mut state, &macros, &mut host)
            .is_handled());
        assert_eq!(host.sent_strings(), vec!["->"]);
    }

    #[test]
    fn test_other_keys_continue() {
        let (mut state, mut host, macros) = setup();
        let result = process_record_user(&k(KC_A), true, &mut state, &macros, &mut host);
        assert_eq!(result, Processing::Continue);
        assert!(host.events().is_empty());
    }
}
