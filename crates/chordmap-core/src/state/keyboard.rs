// Chordmap Keyboard State
// Mode flags and the layer stack they imply, passed explicitly to every handler

use smallvec::SmallVec;
use std::fmt;

use crate::layer::{Layer, LayerState};
use crate::mode::{ModeState, Variant};
use crate::output::HostOutput;

/// Which layers the mode flags turn on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeLayers {
    /// Always active, at the bottom of the stack
    pub base: Layer,
    /// Active while the variant is not the default one
    pub variant_overlay: Option<Layer>,
    /// Active while gaming mode is on
    pub gaming_overlay: Option<Layer>,
}

impl Default for ModeLayers {
    fn default() -> Self {
        Self {
            base: 0,
            variant_overlay: None,
            gaming_overlay: None,
        }
    }
}

/// The single application state object.
///
/// Mode setters always rebuild the whole layer stack from the mode flags, so
/// no transient or stale layer survives a mode change.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    mode: ModeState,
    layers: LayerState,
    mode_layers: ModeLayers,
}

impl KeyboardState {
    pub fn new(mode_layers: ModeLayers) -> Self {
        let mut layers = LayerState::new();
        layers.set_default_layer(mode_layers.base);
        Self {
            mode: ModeState::default(),
            layers,
            mode_layers,
        }
    }

    pub fn mode(&self) -> &ModeState {
        &self.mode
    }

    pub fn layers(&self) -> &LayerState {
        &self.layers
    }

    /// Layer primitives for transient layer actions (MO, LT holds, DF, TO, one-shot)
    pub fn layers_mut(&mut self) -> &mut LayerState {
        &mut self.layers
    }

    pub fn mode_layers(&self) -> &ModeLayers {
        &self.mode_layers
    }

    pub fn variant(&self) -> Variant {
        self.mode.variant()
    }

    /// Whether gaming is on, by mode flag or because the gaming layer is active
    pub fn is_gaming(&self) -> bool {
        self.mode.gaming()
            || self
                .mode_layers
                .gaming_overlay
                .is_some_and(|layer| self.layers.is_on(layer))
    }

    /// Boot hook: install the initial mode and build the first layer stack
    pub fn post_init(&mut self, initial: ModeState, host: &mut dyn HostOutput) {
        log::debug!("post_init: {}", initial);
        self.mode = initial;
        self.layers.set_default_layer(self.mode_layers.base);
        self.recompute_layer_stack(host);
    }

    pub fn set_variant(&mut self, variant: Variant, host: &mut dyn HostOutput) {
        log::debug!("set_variant: {} -> {}", self.mode.variant(), variant);
        self.mode.set_variant(variant);
        self.recompute_layer_stack(host);
    }

    pub fn set_gaming(&mut self, gaming: bool, host: &mut dyn HostOutput) {
        log::debug!("set_gaming: {} -> {}", self.mode.gaming(), gaming);
        self.mode.set_gaming(gaming);
        self.recompute_layer_stack(host);
    }

    pub fn set_alpha_auto_shift(&mut self, enabled: bool, host: &mut dyn HostOutput) {
        log::debug!(
            "set_alpha_auto_shift: {} -> {}",
            self.mode.alpha_auto_shift(),
            enabled
        );
        self.mode.set_alpha_auto_shift(enabled);
        self.recompute_layer_stack(host);
    }

    pub fn toggle_variant(&mut self, host: &mut dyn HostOutput) {
        self.set_variant(self.mode.variant().toggled(), host);
    }

    pub fn toggle_gaming(&mut self, host: &mut dyn HostOutput) {
        self.set_gaming(!self.mode.gaming(), host);
    }

    pub fn toggle_alpha_auto_shift(&mut self, host: &mut dyn HostOutput) {
        self.set_alpha_auto_shift(!self.mode.alpha_auto_shift(), host);
    }

    /// Home-layer recall: drop transient layers and any locked default layer
    pub fn home(&mut self, host: &mut dyn HostOutput) {
        log::debug!("home: dropping transient layers");
        self.layers.set_default_layer(self.mode_layers.base);
        self.recompute_layer_stack(host);
    }

    /// The stack the mode flags call for: base, then variant, then gaming
    pub fn expected_stack(&self) -> SmallVec<[Layer; 4]> {
        let mut stack = SmallVec::new();
        stack.push(self.mode_layers.base);
        if !self.mode.variant().is_default() {
            if let Some(overlay) = self.mode_layers.variant_overlay {
                stack.push(overlay);
            }
        }
        if self.mode.gaming() {
            if let Some(overlay) = self.mode_layers.gaming_overlay {
                stack.push(overlay);
            }
        }
        stack
    }

    /// Clear every active layer and turn the mode layers back on
    pub fn recompute_layer_stack(&mut self, host: &mut dyn HostOutput) {
        self.layers.layer_clear();
        for layer in self.expected_stack() {
            self.layers.layer_on(layer);
        }
        log::debug!("layer stack recomputed: {} ({})", self.layers, self.mode);
        host.layer_state_changed(&self.layers);
    }

    /// Report the current stack after a transient layer change
    pub fn report_layers(&self, host: &mut dyn HostOutput) {
        log::trace!("layer stack: {}", self.layers);
        host.layer_state_changed(&self.layers);
    }
}

impl fmt::Display for KeyboardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} layers {}", self.mode, self.layers)
    }
}
