// Chordmap Engine
// Drives key events through combos, tap-hold, tap dance and auto-shift

mod chord;
mod tap_hold;

pub use chord::{BufferedPress, ChordMatch, ChordMatcher};
pub use tap_hold::{PendingTapHold, TapHoldManager};

use smallvec::SmallVec;

use crate::action::{Action, KeyEvent};
use crate::custom::{process_record_user, MacroTable};
use crate::key::kc::KC_NO;
use crate::key_action::KeyAction;
use crate::layer::{KeyPos, Keymap};
use crate::mode::{ModeState, Variant};
use crate::output::{register_code16, unregister_code16, HostOutput};
use crate::policy::{AutoShiftPolicy, ComboPolicy, TapHoldPolicy};
use crate::profile::Profile;
use crate::state::{Handled, KeyboardState, Keystate, Keystore};
use crate::tap_dance::{TapDanceOutcome, TapDanceTable};

/// An auto-shift key waiting to learn whether it is held past the timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingAutoShift {
    pos: KeyPos,
    action: KeyAction,
    pressed_at: u32,
}

/// A tap-dance sequence still counting taps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TapDanceRun {
    index: u8,
    pos: KeyPos,
    count: u8,
    pressed: bool,
    last_press: u32,
}

/// Whether `now` is at or after `since` on the wrapping millisecond clock
fn not_before(now: u32, since: u32) -> bool {
    (now.wrapping_sub(since) as i32) >= 0
}

/// Simulates the firmware engines around the keymap's policies.
///
/// Events pass through the chord stage first; presses that do not form a
/// combo reach the dispatcher, which resolves tap-hold, tap dance,
/// auto-shift and layer keys. Time only moves forward through event
/// timestamps and `tick`.
pub struct KeyboardEngine<H: HostOutput> {
    keymap: Keymap,
    state: KeyboardState,
    initial_mode: ModeState,
    tap_hold: Box<dyn TapHoldPolicy>,
    combos: Box<dyn ComboPolicy>,
    auto_shift: Box<dyn AutoShiftPolicy>,
    tap_dances: TapDanceTable,
    macros: MacroTable,
    host: H,
    keystore: Keystore,
    tap_holds: TapHoldManager,
    chords: ChordMatcher,
    pending_auto_shift: Option<PendingAutoShift>,
    tap_dance: Option<TapDanceRun>,
    now: u32,
}

impl<H: HostOutput> KeyboardEngine<H> {
    pub fn new(profile: Profile, host: H) -> Self {
        Self {
            keymap: profile.keymap,
            state: KeyboardState::new(profile.mode_layers),
            initial_mode: profile.initial_mode,
            tap_hold: Box::new(profile.tap_hold),
            combos: Box::new(profile.combos),
            auto_shift: Box::new(profile.auto_shift),
            tap_dances: profile.tap_dances,
            macros: profile.macros,
            host,
            keystore: Keystore::new(),
            tap_holds: TapHoldManager::new(),
            chords: ChordMatcher::new(),
            pending_auto_shift: None,
            tap_dance: None,
            now: 0,
        }
    }

    pub fn with_tap_hold_policy(mut self, policy: Box<dyn TapHoldPolicy>) -> Self {
        self.tap_hold = policy;
        self
    }

    pub fn with_combo_policy(mut self, policy: Box<dyn ComboPolicy>) -> Self {
        self.combos = policy;
        self
    }

    pub fn with_auto_shift_policy(mut self, policy: Box<dyn AutoShiftPolicy>) -> Self {
        self.auto_shift = policy;
        self
    }

    /// Boot hook: apply the initial mode and report the first layer stack
    pub fn post_init(&mut self) {
        self.state.post_init(self.initial_mode, &mut self.host);
    }

    pub fn state(&self) -> &KeyboardState {
        &self.state
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn now(&self) -> u32 {
        self.now
    }

    /// Keys currently held, oldest first
    pub fn held_keys(&self) -> Vec<Keystate> {
        self.keystore.held()
    }

    /// Whether no decision is outstanding
    pub fn is_idle(&self) -> bool {
        !self.chords.is_buffering()
            && !self.tap_holds.has_active()
            && self.pending_auto_shift.is_none()
            && self.tap_dance.is_none()
    }

    pub fn set_variant(&mut self, variant: Variant) {
        self.state.set_variant(variant, &mut self.host);
    }

    pub fn set_gaming(&mut self, gaming: bool) {
        self.state.set_gaming(gaming, &mut self.host);
    }

    pub fn set_alpha_auto_shift(&mut self, enabled: bool) {
        self.state.set_alpha_auto_shift(enabled, &mut self.host);
    }

    pub fn press(&mut self, pos: KeyPos, time: u32) {
        self.process(KeyEvent::press(pos, time));
    }

    pub fn release(&mut self, pos: KeyPos, time: u32) {
        self.process(KeyEvent::release(pos, time));
    }

    /// Feed one physical key edge
    pub fn process(&mut self, event: KeyEvent) {
        log::trace!("event {}", event);
        self.tick(event.time);
        match event.action {
            Action::Press => self.chord_press(event),
            Action::Release => self.chord_release(event),
        }
    }

    /// Advance the clock, resolving every timer that has run out
    pub fn tick(&mut self, now: u32) {
        if not_before(now, self.now) {
            self.now = now;
        }
        let now = self.now;

        if self.chords.is_buffering() && !self.chords.should_wait(now, &*self.combos, &self.state)
        {
            self.decide_chord(now, false);
        }

        while let Some(pending) = self.tap_holds.pending() {
            let term = self.tap_hold.tapping_term(&pending.action);
            if !self.tap_holds.timed_out(now, term) {
                break;
            }
            self.resolve_hold();
        }

        if let Some(run) = self.tap_dance {
            let term = self.tap_hold.tapping_term(&KeyAction::TapDance(run.index));
            if now.wrapping_sub(run.last_press) >= u32::from(term) {
                self.finish_tap_dance(false);
            }
        }

        if let Some(pending) = self.pending_auto_shift {
            let timeout = self.auto_shift.auto_shift_timeout(&pending.action);
            if now.wrapping_sub(pending.pressed_at) >= u32::from(timeout) {
                self.resolve_auto_shift(true);
            }
        }
    }

    // Chord stage

    /// The action that identifies a key in combo declarations
    fn combo_action(&self, pos: KeyPos) -> KeyAction {
        match self.combos.combo_lookup_layer() {
            Some(layer) => self.keymap.action_on_layer(layer, pos),
            None => self.keymap.resolve(pos, self.state.layers()),
        }
    }

    fn chord_accepts(&self, action: &KeyAction, time: u32) -> bool {
        // A chord never starts underneath an undecided tap-hold key
        if !self.chords.is_buffering() && self.tap_holds.has_active() {
            return false;
        }
        self.chords
            .accepts(action, time, &*self.combos, &self.state)
    }

    fn chord_press(&mut self, event: KeyEvent) {
        let action = self.combo_action(event.pos);
        if self.chords.is_buffering() && !self.chord_accepts(&action, event.time) {
            self.decide_chord(event.time, false);
        }
        if self.chord_accepts(&action, event.time) {
            self.chords.push(BufferedPress { event, action });
            if !self
                .chords
                .should_wait(event.time, &*self.combos, &self.state)
            {
                self.decide_chord(event.time, false);
            }
        } else {
            self.dispatch(event);
        }
    }

    fn chord_release(&mut self, event: KeyEvent) {
        if self.release_combo_key(event.pos) {
            return;
        }
        if self.chords.is_buffered(event.pos) {
            self.decide_chord(event.time, true);
            if self.release_combo_key(event.pos) {
                return;
            }
        }
        self.dispatch(event);
    }

    /// Release a key belonging to a fired combo; the first such release
    /// ends the combo
    fn release_combo_key(&mut self, pos: KeyPos) -> bool {
        match self.chords.release_active(pos) {
            Some((index, first)) => {
                if first {
                    self.combos
                        .process_combo_event(index, false, &mut self.state, &mut self.host);
                    self.release_oneshot();
                }
                true
            }
            None => false,
        }
    }

    fn decide_chord(&mut self, now: u32, released: bool) {
        let decision = self
            .chords
            .decide(now, released, &*self.combos, &self.state);
        let buffer = self.chords.take_buffer();

        let Some(ChordMatch { index, used }) = decision else {
            log::trace!("chord abandoned, flushing {} presses", buffer.len());
            for press in buffer {
                self.dispatch(press.event);
            }
            return;
        };

        log::trace!("chord matched {}", self.combos.combo_name(index));
        self.interrupt_pending();
        self.state.layers_mut().oneshot_use();
        self.combos
            .process_combo_event(index, true, &mut self.state, &mut self.host);
        let positions: SmallVec<[KeyPos; 4]> =
            used.iter().map(|&slot| buffer[slot].event.pos).collect();
        self.chords.activate(index, positions);

        for (slot, press) in buffer.into_iter().enumerate() {
            if !used.contains(&slot) {
                self.dispatch(press.event);
            }
        }
    }

    /// Resolve decisions another key's press settles: a tap dance is
    /// interrupted, a tap-hold key may become a hold, and a pending
    /// auto-shift key goes out unshifted
    fn interrupt_pending(&mut self) {
        if self.tap_dance.is_some() {
            self.finish_tap_dance(true);
        }
        if let Some(pending) = self.tap_holds.pending() {
            let action = pending.action;
            if self.tap_hold.hold_on_other_key_press(&action)
                && !self.tap_hold.ignore_interrupt(&action)
            {
                self.resolve_hold();
            }
        }
        if self.pending_auto_shift.is_some() {
            self.resolve_auto_shift(false);
        }
    }

    // Dispatch stage

    fn dispatch(&mut self, event: KeyEvent) {
        match event.action {
            Action::Press => self.dispatch_press(event),
            Action::Release => self.dispatch_release(event),
        }
    }

    fn dispatch_press(&mut self, event: KeyEvent) {
        if let Some(pending) = self.tap_holds.pending() {
            let action = pending.action;
            if self.tap_hold.hold_on_other_key_press(&action)
                && !self.tap_hold.ignore_interrupt(&action)
            {
                self.resolve_hold();
            } else {
                self.tap_holds.buffer(event);
                return;
            }
        }

        if let Some(run) = self.tap_dance {
            if run.pos != event.pos {
                self.finish_tap_dance(true);
            }
        }
        if self.pending_auto_shift.is_some() {
            self.resolve_auto_shift(false);
        }

        let action = self.keymap.resolve(event.pos, self.state.layers());
        log::trace!("press {} -> {}", event.pos, action);
        self.state.layers_mut().oneshot_use();

        if process_record_user(&action, true, &mut self.state, &self.macros, &mut self.host)
            .is_handled()
        {
            self.keystore
                .insert(Keystate::new(&event, action, Handled::Custom));
            return;
        }

        let handled = match action {
            KeyAction::No | KeyAction::Transparent => Handled::Nothing,
            KeyAction::Key(_) | KeyAction::Symbol(_)
                if self.auto_shift.is_auto_shift_eligible(&action, &self.state) =>
            {
                self.pending_auto_shift = Some(PendingAutoShift {
                    pos: event.pos,
                    action,
                    pressed_at: event.time,
                });
                return;
            }
            KeyAction::Key(keycode) => {
                register_code16(&mut self.host, keycode);
                Handled::Registered(keycode)
            }
            KeyAction::Symbol(_) => {
                self.auto_shift
                    .auto_shift_press(&action, false, &mut self.host);
                Handled::AutoShift { shifted: false }
            }
            KeyAction::ModTap { .. } | KeyAction::LayerTap { .. } => {
                self.tap_holds.start(&event, action);
                return;
            }
            KeyAction::Momentary(layer) => {
                self.state.layers_mut().layer_on(layer);
                self.state.report_layers(&mut self.host);
                Handled::Layer(layer)
            }
            KeyAction::DefaultLayer(layer) => {
                log::debug!("default layer -> {}", layer);
                self.state.layers_mut().set_default_layer(layer);
                self.state.report_layers(&mut self.host);
                Handled::Nothing
            }
            KeyAction::ToLayer(layer) => {
                log::debug!("move to layer {}", layer);
                self.state.layers_mut().layer_move(layer);
                self.state.report_layers(&mut self.host);
                Handled::Nothing
            }
            KeyAction::TapDance(index) => {
                self.tap_dance_press(&event, index);
                return;
            }
            KeyAction::Custom(_) | KeyAction::Macro(_) => Handled::Custom,
        };
        self.keystore.insert(Keystate::new(&event, action, handled));
    }

    fn dispatch_release(&mut self, event: KeyEvent) {
        let pending = self
            .tap_holds
            .pending()
            .map(|p| (p.pos, p.action, p.has_buffered_press(event.pos)));
        if let Some((pos, action, buffered)) = pending {
            if pos == event.pos {
                self.resolve_tap();
                self.release_oneshot();
                return;
            }
            if buffered {
                if self.tap_hold.permissive_hold(&action) && !self.tap_hold.ignore_interrupt(&action)
                {
                    self.resolve_hold();
                } else {
                    self.tap_holds.buffer(event);
                    return;
                }
            }
        }

        if let Some(pending) = self.pending_auto_shift {
            if pending.pos == event.pos {
                self.pending_auto_shift = None;
                self.auto_shift
                    .auto_shift_press(&pending.action, false, &mut self.host);
                self.auto_shift
                    .auto_shift_release(&pending.action, false, &mut self.host);
                self.release_oneshot();
                return;
            }
        }

        if let Some(run) = self.tap_dance.as_mut() {
            if run.pos == event.pos {
                run.pressed = false;
                self.release_oneshot();
                return;
            }
        }

        match self.keystore.remove(event.pos) {
            Some(keystate) => self.undo(keystate),
            None => log::trace!("release of {} with no press record", event.pos),
        }
        self.release_oneshot();
    }

    /// Reverse exactly what a press did
    fn undo(&mut self, keystate: Keystate) {
        match keystate.handled {
            Handled::Nothing => {}
            Handled::Registered(keycode) => unregister_code16(&mut self.host, keycode),
            Handled::Layer(layer) | Handled::LayerHold(layer) => {
                self.state.layers_mut().layer_off(layer);
                self.state.report_layers(&mut self.host);
            }
            Handled::ModHold(mods) => {
                for keycode in mods.keycodes().iter().rev() {
                    self.host.unregister_code(*keycode);
                }
            }
            Handled::AutoShift { shifted } => {
                self.auto_shift
                    .auto_shift_release(&keystate.action, shifted, &mut self.host);
            }
            Handled::Custom => {
                process_record_user(
                    &keystate.action,
                    false,
                    &mut self.state,
                    &self.macros,
                    &mut self.host,
                );
            }
            Handled::TapDance(outcome) => {
                if let KeyAction::TapDance(index) = keystate.action {
                    if let Some(dance) = self.tap_dances.get(index).copied() {
                        dance.reset(outcome, &mut self.host);
                    }
                }
            }
        }
    }

    fn release_oneshot(&mut self) {
        if self.state.layers_mut().oneshot_release() {
            log::debug!("one-shot layer released");
            self.state.report_layers(&mut self.host);
        }
    }

    // Tap-hold

    fn resolve_hold(&mut self) {
        let Some(pending) = self.tap_holds.take() else {
            return;
        };
        log::debug!("{} held", pending.action);
        let handled = match pending.action {
            KeyAction::ModTap { mods, .. } => {
                for keycode in mods.keycodes() {
                    self.host.register_code(keycode);
                }
                Handled::ModHold(mods)
            }
            KeyAction::LayerTap { layer, .. } => {
                self.state.layers_mut().layer_on(layer);
                self.state.report_layers(&mut self.host);
                Handled::LayerHold(layer)
            }
            _ => Handled::Nothing,
        };
        self.keystore.insert(Keystate {
            pos: pending.pos,
            action: pending.action,
            pressed_at: pending.pressed_at,
            handled,
        });
        for event in pending.into_buffer() {
            self.dispatch(event);
        }
    }

    fn resolve_tap(&mut self) {
        let Some(pending) = self.tap_holds.take() else {
            return;
        };
        log::debug!("{} tapped", pending.action);
        let tap = pending.action.tap_keycode().unwrap_or(KC_NO);
        register_code16(&mut self.host, tap);
        for event in pending.into_buffer() {
            self.dispatch(event);
        }
        unregister_code16(&mut self.host, tap);
    }

    // Auto-shift

    fn resolve_auto_shift(&mut self, shifted: bool) {
        let Some(pending) = self.pending_auto_shift.take() else {
            return;
        };
        self.auto_shift
            .auto_shift_press(&pending.action, shifted, &mut self.host);
        self.keystore.insert(Keystate {
            pos: pending.pos,
            action: pending.action,
            pressed_at: pending.pressed_at,
            handled: Handled::AutoShift { shifted },
        });
    }

    // Tap dance

    fn tap_dance_press(&mut self, event: &KeyEvent, index: u8) {
        let same_run = self
            .tap_dance
            .is_some_and(|run| run.index == index && run.pos == event.pos);
        if same_run {
            if let Some(run) = self.tap_dance.as_mut() {
                run.count = run.count.saturating_add(1);
                run.pressed = true;
                run.last_press = event.time;
            }
            return;
        }
        if self.tap_dance.is_some() {
            self.finish_tap_dance(true);
        }
        self.tap_dance = Some(TapDanceRun {
            index,
            pos: event.pos,
            count: 1,
            pressed: true,
            last_press: event.time,
        });
    }

    fn finish_tap_dance(&mut self, interrupted: bool) {
        let Some(run) = self.tap_dance.take() else {
            return;
        };
        let Some(dance) = self.tap_dances.get(run.index).copied() else {
            log::warn!("TD({}) is not declared", run.index);
            return;
        };
        let outcome = TapDanceOutcome::new(run.count, run.pressed, interrupted);
        dance.finished(outcome, &mut self.host);
        if run.pressed {
            self.keystore.insert(Keystate {
                pos: run.pos,
                action: KeyAction::TapDance(run.index),
                pressed_at: run.last_press,
                handled: Handled::TapDance(outcome),
            });
        } else {
            dance.reset(outcome, &mut self.host);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::kc::*;
    use crate::output::{HostEvent, RecordingHost};
    use crate::profile::Profile;

    fn engine() -> KeyboardEngine<RecordingHost> {
        let mut engine = KeyboardEngine::new(Profile::classic(), RecordingHost::new());
        engine.post_init();
        engine.host_mut().take_events();
        engine
    }

    const Q: KeyPos = KeyPos::new(0, 1);
    const SPACE: KeyPos = KeyPos::new(3, 4);

    #[test]
    fn test_not_before_wraps() {
        assert!(not_before(5, 5));
        assert!(not_before(10, 5));
        assert!(!not_before(5, 10));
        assert!(not_before(3, u32::MAX - 3));
    }

    #[test]
    fn test_plain_key_tap() {
        let mut engine = engine();
        engine.press(Q, 0);
        engine.release(Q, 30);
        assert_eq!(
            engine.host().key_events(),
            vec![HostEvent::Register(KC_Q), HostEvent::Unregister(KC_Q)]
        );
        assert!(engine.is_idle());
    }

    #[test]
    fn test_tick_resolves_hold() {
        let mut engine = engine();
        engine.press(SPACE, 0);
        assert!(!engine.is_idle());
        engine.tick(174);
        assert!(engine.host().key_events().is_empty());
        engine.tick(175);
        assert_eq!(engine.host().key_events(), vec![HostEvent::Register(KC_LEFT_SHIFT)]);
        engine.release(SPACE, 300);
        assert!(engine.host().stuck_keys().is_empty());
        assert!(engine.held_keys().is_empty());
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut engine = engine();
        engine.tick(500);
        engine.tick(100);
        assert_eq!(engine.now(), 500);
    }
}
