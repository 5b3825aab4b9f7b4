// Chordmap Combos
// Chord declarations, their gates and what they emit

use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt;

use crate::key_action::KeyAction;
use crate::layer::Layer;
use crate::mode::Variant;
use crate::output::{register_code16, unregister_code16, HostOutput};
use crate::policy::ComboPolicy;
use crate::state::KeyboardState;
use crate::Keycode;

pub const DEFAULT_COMBO_TERM: u16 = 40;

/// What a combo does while the chord is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboOutput {
    /// Register a keycode (with its modifier bits) until release
    Key(Keycode),
    /// Bring up a layer for the next key only
    OneShotLayer(Layer),
}

impl fmt::Display for ComboOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComboOutput::Key(keycode) => write!(f, "{}", keycode),
            ComboOutput::OneShotLayer(layer) => write!(f, "OSL({})", layer),
        }
    }
}

/// When a combo may fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboGate {
    Always,
    /// Only while no layer above the default layer is active
    BaseLayerOnly,
    /// Only while this base variant is selected
    Variant(Variant),
}

impl ComboGate {
    pub fn allows(self, state: &KeyboardState) -> bool {
        match self {
            ComboGate::Always => true,
            ComboGate::BaseLayerOnly => state.layers().is_base_only(),
            ComboGate::Variant(variant) => state.variant() == variant,
        }
    }
}

/// A declared chord
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboDef {
    pub name: String,
    pub keys: SmallVec<[KeyAction; 4]>,
    pub output: ComboOutput,
    /// Chord window; `None` uses the table default
    pub term: Option<u16>,
    pub must_hold: bool,
    pub gate: ComboGate,
}

impl ComboDef {
    pub fn new(name: impl Into<String>, keys: &[KeyAction], output: ComboOutput) -> Self {
        Self {
            name: name.into(),
            keys: keys.iter().copied().collect(),
            output,
            term: None,
            must_hold: false,
            gate: ComboGate::Always,
        }
    }

    pub fn with_term(mut self, term: u16) -> Self {
        self.term = Some(term);
        self
    }

    pub fn with_must_hold(mut self, must_hold: bool) -> Self {
        self.must_hold = must_hold;
        self
    }

    pub fn with_gate(mut self, gate: ComboGate) -> Self {
        self.gate = gate;
        self
    }
}

impl fmt::Display for ComboDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.keys.iter().map(|k| k.to_string()).collect();
        write!(f, "{}: {{{}}} -> {}", self.name, keys.join(", "), self.output)
    }
}

/// Combos in declaration order, keyed by name
#[derive(Debug, Clone)]
pub struct ComboTable {
    combos: IndexMap<String, ComboDef>,
    default_term: u16,
    lookup_layer: Option<Layer>,
}

impl Default for ComboTable {
    fn default() -> Self {
        Self {
            combos: IndexMap::new(),
            default_term: DEFAULT_COMBO_TERM,
            lookup_layer: None,
        }
    }
}

impl ComboTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identify chord keys by their action on `layer` instead of the active stack
    pub fn with_lookup_layer(mut self, layer: Layer) -> Self {
        self.lookup_layer = Some(layer);
        self
    }

    /// Append a combo; a combo with the same name is replaced in place
    pub fn push(&mut self, combo: ComboDef) {
        if let Some(old) = self.combos.insert(combo.name.clone(), combo) {
            log::warn!("combo '{}' declared twice, keeping the later one", old.name);
        }
    }

    pub fn len(&self) -> usize {
        self.combos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combos.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ComboDef> {
        self.combos.get(name)
    }

    pub fn get_index(&self, index: usize) -> Option<&ComboDef> {
        self.combos.get_index(index).map(|(_, def)| def)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.combos.get_index_of(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComboDef> {
        self.combos.values()
    }

    pub fn default_term(&self) -> u16 {
        self.default_term
    }

    pub fn set_default_term(&mut self, term: u16) {
        self.default_term = term;
    }

    /// Returns false if no combo has this name
    pub fn set_term(&mut self, name: &str, term: u16) -> bool {
        match self.combos.get_mut(name) {
            Some(def) => {
                def.term = Some(term);
                true
            }
            None => false,
        }
    }

    /// Returns false if no combo has this name
    pub fn set_must_hold(&mut self, name: &str, must_hold: bool) -> bool {
        match self.combos.get_mut(name) {
            Some(def) => {
                def.must_hold = must_hold;
                true
            }
            None => false,
        }
    }
}

impl ComboPolicy for ComboTable {
    fn combo_count(&self) -> usize {
        self.combos.len()
    }

    fn combo_name(&self, index: usize) -> &str {
        self.get_index(index).map(|def| def.name.as_str()).unwrap_or("?")
    }

    fn combo_keys(&self, index: usize) -> &[KeyAction] {
        self.get_index(index).map(|def| def.keys.as_slice()).unwrap_or(&[])
    }

    fn combo_term(&self, index: usize) -> u16 {
        self.get_index(index)
            .and_then(|def| def.term)
            .unwrap_or(self.default_term)
    }

    fn combo_must_hold(&self, index: usize) -> bool {
        self.get_index(index).is_some_and(|def| def.must_hold)
    }

    fn combo_should_trigger(
        &self,
        index: usize,
        _action: &KeyAction,
        state: &KeyboardState,
    ) -> bool {
        self.get_index(index).is_some_and(|def| def.gate.allows(state))
    }

    fn process_combo_event(
        &self,
        index: usize,
        pressed: bool,
        state: &mut KeyboardState,
        host: &mut dyn HostOutput,
    ) {
        let Some(def) = self.get_index(index) else {
            log::warn!("combo event for unknown index {}", index);
            return;
        };
        log::debug!(
            "combo {} {}",
            def.name,
            if pressed { "pressed" } else { "released" }
        );
        match (def.output, pressed) {
            (ComboOutput::Key(keycode), true) => register_code16(host, keycode),
            (ComboOutput::Key(keycode), false) => unregister_code16(host, keycode),
            (ComboOutput::OneShotLayer(layer), true) => {
                state.layers_mut().oneshot_start(layer);
                state.report_layers(host);
            }
            (ComboOutput::OneShotLayer(_), false) => state.layers_mut().oneshot_pressed(),
        }
    }

    fn combo_lookup_layer(&self) -> Option<Layer> {
        self.lookup_layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::kc::*;
    use crate::key_action::{k, s};
    use crate::mode::ModeState;
    use crate::output::{HostEvent, RecordingHost};
    use crate::state::ModeLayers;

    fn table() -> ComboTable {
        let mut table = ComboTable::new();
        table.push(
            ComboDef::new("l_paren", &[k(KC_S), k(KC_T)], ComboOutput::Key(s(KC_9)))
                .with_term(30)
                .with_gate(ComboGate::Variant(Variant::Colemak)),
        );
        table.push(
            ComboDef::new(
                "settings",
                &[k(KC_L), k(KC_U), k(KC_Y), k(KC_SEMICOLON)],
                ComboOutput::OneShotLayer(5),
            ),
        );
        table
    }

    fn state(variant: Variant) -> (KeyboardState, RecordingHost) {
        let mut host = RecordingHost::new();
        let mut state = KeyboardState::new(ModeLayers {
            base: 0,
            variant_overlay: Some(1),
            gaming_overlay: Some(2),
        });
        state.post_init(ModeState::new(variant, false, false), &mut host);
        (state, host)
    }

    #[test]
    fn test_terms_and_lookup() {
        let mut table = table();
        assert_eq!(table.combo_term(0), 30);
        assert_eq!(table.combo_term(1), DEFAULT_COMBO_TERM);
        assert_eq!(table.index_of("settings"), Some(1));
        assert_eq!(table.combo_keys(1).len(), 4);

        table.set_default_term(45);
        assert!(table.set_term("settings", 60));
        assert!(!table.set_term("missing", 60));
        assert_eq!(table.combo_term(1), 60);
        assert!(!table.combo_must_hold(1));
        assert!(table.set_must_hold("settings", true));
        assert!(table.combo_must_hold(1));
    }

    #[test]
    fn test_should_trigger_follows_gate() {
        let table = table();
        for variant in [Variant::Colemak, Variant::Qwerty] {
            let (state, _) = state(variant);
            assert!(table.combo_should_trigger(1, &k(KC_L), &state));
            assert_eq!(
                table.combo_should_trigger(0, &k(KC_S), &state),
                variant == Variant::Colemak
            );
        }
    }

    #[test]
    fn test_base_layer_gate() {
        let (mut state, _) = state(Variant::Colemak);
        assert!(ComboGate::BaseLayerOnly.allows(&state));
        state.layers_mut().layer_on(3);
        assert!(!ComboGate::BaseLayerOnly.allows(&state));
    }

    #[test]
    fn test_key_combo_event_is_balanced() {
        let table = table();
        let (mut state, mut host) = state(Variant::Colemak);
        host.take_events();

        table.process_combo_event(0, true, &mut state, &mut host);
        table.process_combo_event(0, false, &mut state, &mut host);
        assert_eq!(
            host.key_events(),
            vec![
                HostEvent::Register(KC_LEFT_SHIFT),
                HostEvent::Register(KC_9),
                HostEvent::Unregister(KC_9),
                HostEvent::Unregister(KC_LEFT_SHIFT),
            ]
        );
    }

    #[test]
    fn test_settings_combo_starts_oneshot_layer() {
        let table = table();
        let (mut state, mut host) = state(Variant::Colemak);

        table.process_combo_event(1, true, &mut state, &mut host);
        assert_eq!(state.layers().oneshot_layer(), Some(5));
        assert_eq!(host.last_layer_state(), Some(&[0, 5][..]));

        table.process_combo_event(1, false, &mut state, &mut host);
        // Still up until another key is used
        assert!(state.layers().is_on(5));
    }

    #[test]
    fn test_display() {
        let table = table();
        assert_eq!(
            table.get("l_paren").map(|d| d.to_string()),
            Some("l_paren: {KC_S, KC_T} -> S(KC_9)".to_string())
        );
    }
}
