// Chordmap Policies
// Per-key decisions the tap-hold, combo and auto-shift engines ask for

mod tap_hold;

pub use tap_hold::{TapHoldRecord, TapHoldTable, DEFAULT_TAPPING_TERM};

use crate::key_action::KeyAction;
use crate::layer::Layer;
use crate::output::HostOutput;
use crate::state::KeyboardState;
use crate::Keycode;

/// Tap-versus-hold decisions for dual-role keys.
///
/// All four are pure functions of the key action; unlisted keys get the
/// defaults.
pub trait TapHoldPolicy {
    /// Milliseconds a key must be held to count as a hold
    fn tapping_term(&self, action: &KeyAction) -> u16;

    /// Never let an interrupting key force the hold action
    fn ignore_interrupt(&self, action: &KeyAction) -> bool;

    /// Choose hold as soon as another key is pressed
    fn hold_on_other_key_press(&self, action: &KeyAction) -> bool;

    /// Choose hold when another key is tapped while this one is down
    fn permissive_hold(&self, action: &KeyAction) -> bool;
}

/// Combo enablement and dispatch.
///
/// Combos are addressed by index in declaration order.
pub trait ComboPolicy {
    fn combo_count(&self) -> usize;

    /// Name for logging
    fn combo_name(&self, index: usize) -> &str;

    /// Key actions that make up the chord
    fn combo_keys(&self, index: usize) -> &[KeyAction];

    /// Chord window in milliseconds
    fn combo_term(&self, index: usize) -> u16;

    /// Whether the chord must be held for its full term before firing
    fn combo_must_hold(&self, index: usize) -> bool;

    /// Whether the combo may fire given the triggering key and current state
    fn combo_should_trigger(&self, index: usize, action: &KeyAction, state: &KeyboardState)
        -> bool;

    /// Emit the combo's effect on press, undo it on release
    fn process_combo_event(
        &self,
        index: usize,
        pressed: bool,
        state: &mut KeyboardState,
        host: &mut dyn HostOutput,
    );

    /// Layer whose actions identify chord keys, or `None` for the active stack
    fn combo_lookup_layer(&self) -> Option<Layer> {
        None
    }
}

/// Auto-shift enablement and emission.
///
/// Release is always told the `shifted` decision made at press time, so it
/// unregisters exactly what the press registered.
pub trait AutoShiftPolicy {
    fn is_auto_shift_eligible(&self, action: &KeyAction, state: &KeyboardState) -> bool;

    /// Milliseconds a key must be held to emit its shifted form
    fn auto_shift_timeout(&self, action: &KeyAction) -> u16;

    /// Register the unshifted or shifted form; returns the keycode registered
    fn auto_shift_press(&self, action: &KeyAction, shifted: bool, host: &mut dyn HostOutput)
        -> Keycode;

    /// Unregister what `auto_shift_press` registered for the same inputs
    fn auto_shift_release(
        &self,
        action: &KeyAction,
        shifted: bool,
        host: &mut dyn HostOutput,
    ) -> Keycode;
}
