// Chordmap Output Layer
// The host side of the keyboard: key output primitives and layer reporting

mod code16;
mod state;

pub use code16::{code16_sequence, register_code16, unregister_code16, Code16Sequence};
pub use state::PressedKeyState;

use std::fmt;

use crate::layer::{Layer, LayerState};
use crate::Keycode;

/// Output primitives supplied by the firmware.
///
/// Everything the keymap emits goes through this trait; nothing in the
/// crate talks to USB or the matrix directly.
pub trait HostOutput {
    /// Press a basic keycode on the host
    fn register_code(&mut self, keycode: Keycode);

    /// Release a basic keycode on the host
    fn unregister_code(&mut self, keycode: Keycode);

    /// Type a literal string
    fn send_string(&mut self, text: &str);

    /// The active layer stack changed
    fn layer_state_changed(&mut self, layers: &LayerState);
}

/// One call made on a `RecordingHost`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Register(Keycode),
    Unregister(Keycode),
    SendString(String),
    /// Active layers (ascending) after a stack change
    LayerState(Vec<Layer>),
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostEvent::Register(keycode) => write!(f, "register   {}", keycode),
            HostEvent::Unregister(keycode) => write!(f, "unregister {}", keycode),
            HostEvent::SendString(text) => write!(f, "send_string {:?}", text),
            HostEvent::LayerState(layers) => write!(f, "layers     {:?}", layers),
        }
    }
}

/// A host that records every call, for tests and the simulator.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    events: Vec<HostEvent>,
    pressed: PressedKeyState,
    unbalanced_releases: Vec<Keycode>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Take the recorded events, leaving held-key tracking intact
    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// Only the register/unregister events
    pub fn key_events(&self) -> Vec<HostEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, HostEvent::Register(_) | HostEvent::Unregister(_)))
            .cloned()
            .collect()
    }

    /// Keycodes registered and never unregistered
    pub fn stuck_keys(&self) -> Vec<Keycode> {
        self.pressed.get_all()
    }

    /// Keycodes unregistered without a matching registration
    pub fn unbalanced_releases(&self) -> &[Keycode] {
        &self.unbalanced_releases
    }

    pub fn is_pressed(&self, keycode: Keycode) -> bool {
        self.pressed.is_pressed(keycode)
    }

    /// The most recently reported layer stack
    pub fn last_layer_state(&self) -> Option<&[Layer]> {
        self.events.iter().rev().find_map(|e| match e {
            HostEvent::LayerState(layers) => Some(layers.as_slice()),
            _ => None,
        })
    }

    /// Strings sent, in order
    pub fn sent_strings(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::SendString(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl HostOutput for RecordingHost {
    fn register_code(&mut self, keycode: Keycode) {
        self.pressed.add(keycode);
        self.events.push(HostEvent::Register(keycode));
    }

    fn unregister_code(&mut self, keycode: Keycode) {
        if !self.pressed.remove(keycode) {
            log::warn!("unregister of {} without a matching register", keycode);
            self.unbalanced_releases.push(keycode);
        }
        self.events.push(HostEvent::Unregister(keycode));
    }

    fn send_string(&mut self, text: &str) {
        self.events.push(HostEvent::SendString(text.to_string()));
    }

    fn layer_state_changed(&mut self, layers: &LayerState) {
        self.events
            .push(HostEvent::LayerState(layers.active_layers().to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::kc::*;

    #[test]
    fn test_recording_host_tracks_held_keys() {
        let mut host = RecordingHost::new();
        host.register_code(KC_A);
        host.register_code(KC_B);
        host.unregister_code(KC_A);

        assert_eq!(host.stuck_keys(), vec![KC_B]);
        assert!(host.is_pressed(KC_B));
        assert_eq!(host.key_events().len(), 3);
    }

    #[test]
    fn test_recording_host_flags_unbalanced_release() {
        let mut host = RecordingHost::new();
        host.unregister_code(KC_A);
        assert_eq!(host.unbalanced_releases(), &[KC_A]);
    }

    #[test]
    fn test_recording_host_layer_and_string_events() {
        let mut host = RecordingHost::new();
        let mut layers = LayerState::new();
        layers.layer_on(0);
        layers.layer_on(2);
        host.layer_state_changed(&layers);
        host.send_string("->");

        assert_eq!(host.last_layer_state(), Some(&[0, 2][..]));
        assert_eq!(host.sent_strings(), vec!["->"]);

        let taken = host.take_events();
        assert_eq!(taken.len(), 2);
        assert!(host.events().is_empty());
    }
}
