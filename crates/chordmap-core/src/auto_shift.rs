// Chordmap Auto-Shift
// Hold-to-shift eligibility and the keycodes each decision emits

use std::collections::HashMap;

use crate::key::kc::KC_NO;
use crate::key_action::{s, KeyAction, SymbolKey};
use crate::layer::Layer;
use crate::output::{register_code16, unregister_code16, HostOutput};
use crate::policy::AutoShiftPolicy;
use crate::state::KeyboardState;
use crate::Keycode;

pub const DEFAULT_AUTO_SHIFT_TIMEOUT: u16 = 175;

/// The two keycodes a symbol key emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolPair {
    pub unshifted: Keycode,
    pub shifted: Keycode,
}

impl SymbolPair {
    pub const fn new(unshifted: Keycode, shifted: Keycode) -> Self {
        Self { unshifted, shifted }
    }

    pub fn pick(self, shifted: bool) -> Keycode {
        if shifted {
            self.shifted
        } else {
            self.unshifted
        }
    }
}

/// Auto-shift settings for a profile.
///
/// Plain keys shift to `S(kc)`; symbol keys emit their declared pair,
/// which need not be related by Shift at all.
#[derive(Debug, Clone)]
pub struct AutoShiftTable {
    timeout: u16,
    symbols: HashMap<SymbolKey, SymbolPair>,
    gaming_layer: Option<Layer>,
}

impl Default for AutoShiftTable {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_AUTO_SHIFT_TIMEOUT,
            symbols: HashMap::new(),
            gaming_layer: None,
        }
    }
}

impl AutoShiftTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable auto-shift whenever `layer` is active
    pub fn with_gaming_layer(mut self, layer: Layer) -> Self {
        self.gaming_layer = Some(layer);
        self
    }

    pub fn with_symbol(mut self, symbol: SymbolKey, pair: SymbolPair) -> Self {
        self.symbols.insert(symbol, pair);
        self
    }

    pub fn set_timeout(&mut self, timeout: u16) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> u16 {
        self.timeout
    }

    pub fn symbol(&self, symbol: SymbolKey) -> Option<SymbolPair> {
        self.symbols.get(&symbol).copied()
    }

    /// The keycode a press with this decision registers
    pub fn emitted_keycode(&self, action: &KeyAction, shifted: bool) -> Keycode {
        match action {
            KeyAction::Key(keycode) if shifted => s(*keycode),
            KeyAction::Key(keycode) => *keycode,
            KeyAction::Symbol(symbol) => match self.symbol(*symbol) {
                Some(pair) => pair.pick(shifted),
                None => {
                    log::warn!("symbol key {} has no keycode pair", symbol);
                    KC_NO
                }
            },
            _ => KC_NO,
        }
    }
}

impl AutoShiftPolicy for AutoShiftTable {
    fn is_auto_shift_eligible(&self, action: &KeyAction, state: &KeyboardState) -> bool {
        let gaming_layer_on = self
            .gaming_layer
            .is_some_and(|layer| state.layers().is_on(layer));
        if state.mode().gaming() || gaming_layer_on {
            return false;
        }
        match action {
            KeyAction::Key(keycode) if keycode.mod_bits() == 0 => {
                if keycode.is_alpha() {
                    state.mode().alpha_auto_shift()
                } else {
                    keycode.is_digit() || keycode.is_punctuation()
                }
            }
            KeyAction::Symbol(symbol) => self.symbols.contains_key(symbol),
            _ => false,
        }
    }

    fn auto_shift_timeout(&self, _action: &KeyAction) -> u16 {
        self.timeout
    }

    fn auto_shift_press(
        &self,
        action: &KeyAction,
        shifted: bool,
        host: &mut dyn HostOutput,
    ) -> Keycode {
        let keycode = self.emitted_keycode(action, shifted);
        log::trace!("auto-shift press {} shifted={} -> {}", action, shifted, keycode);
        register_code16(host, keycode);
        keycode
    }

    fn auto_shift_release(
        &self,
        action: &KeyAction,
        shifted: bool,
        host: &mut dyn HostOutput,
    ) -> Keycode {
        let keycode = self.emitted_keycode(action, shifted);
        unregister_code16(host, keycode);
        keycode
    }
}
