// Chordmap Layers
// Layer stack state and the layered keymap of a split 3x6+3 board

use smallvec::SmallVec;
use std::fmt;

use crate::key_action::KeyAction;

/// A layer identifier. At most 32 layers, like the firmware's layer bit mask.
pub type Layer = u8;

pub const MAX_LAYERS: usize = 32;

/// Logical matrix: three rows of twelve keys plus a row of six thumb keys
pub const MATRIX_ROWS: usize = 4;
pub const MATRIX_COLS: usize = 12;

/// Number of physical keys on the 3x6+3 layout
pub const LAYOUT_KEYS: usize = 42;

/// Columns of the thumb row that carry a key (three per half)
const THUMB_COLS: [usize; 6] = [3, 4, 5, 6, 7, 8];

/// Position of a physical key in the logical matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

impl KeyPos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Whether this position exists on the 3x6+3 layout
    pub fn is_valid(self) -> bool {
        let (row, col) = (self.row as usize, self.col as usize);
        match row {
            0..=2 => col < MATRIX_COLS,
            3 => THUMB_COLS.contains(&col),
            _ => false,
        }
    }

    /// Position of the `index`-th key in layout order (left to right, top to bottom)
    pub fn from_layout_index(index: usize) -> Option<Self> {
        match index {
            0..=35 => Some(Self::new((index / MATRIX_COLS) as u8, (index % MATRIX_COLS) as u8)),
            36..=41 => Some(Self::new(3, THUMB_COLS[index - 36] as u8)),
            _ => None,
        }
    }
}

impl fmt::Display for KeyPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// One layer of key actions over the logical matrix
pub type LayerMap = [[KeyAction; MATRIX_COLS]; MATRIX_ROWS];

/// Arrange 42 actions given in layout order into a matrix.
///
/// Matrix slots the layout does not use hold `KeyAction::No`.
pub fn layout_split_3x6_3(keys: [KeyAction; LAYOUT_KEYS]) -> LayerMap {
    let mut map = [[KeyAction::No; MATRIX_COLS]; MATRIX_ROWS];
    for (index, action) in keys.into_iter().enumerate() {
        if let Some(pos) = KeyPos::from_layout_index(index) {
            map[pos.row as usize][pos.col as usize] = action;
        }
    }
    map
}

/// A layer whose lifetime is "until the next key is tapped"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OneShotLayer {
    layer: Layer,
    /// The key that started the one-shot is still held
    start_held: bool,
    /// Another key was pressed while the one-shot was active
    in_use: bool,
}

/// Active layer stack.
///
/// `bits` holds every layer turned on explicitly (including the base layer
/// when the resolver turns it on). The default layer is merged into that set
/// by number when keys are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayerState {
    bits: u32,
    default_layer: Layer,
    oneshot: Option<OneShotLayer>,
}

impl LayerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn every layer off
    pub fn layer_clear(&mut self) {
        self.bits = 0;
        self.oneshot = None;
    }

    pub fn layer_on(&mut self, layer: Layer) {
        if (layer as usize) < MAX_LAYERS {
            self.bits |= 1 << layer;
        }
    }

    pub fn layer_off(&mut self, layer: Layer) {
        if (layer as usize) < MAX_LAYERS {
            self.bits &= !(1 << layer);
        }
    }

    /// Turn `layer` on and every other layer off
    pub fn layer_move(&mut self, layer: Layer) {
        self.layer_clear();
        self.layer_on(layer);
    }

    pub fn set_default_layer(&mut self, layer: Layer) {
        self.default_layer = layer;
    }

    pub fn default_layer(&self) -> Layer {
        self.default_layer
    }

    /// Whether `layer` is on, counting the default layer as on
    pub fn is_on(&self, layer: Layer) -> bool {
        layer == self.default_layer || (layer as usize) < MAX_LAYERS && self.bits & (1 << layer) != 0
    }

    /// Whether no layer above the default layer is active
    pub fn is_base_only(&self) -> bool {
        self.highest_layer() == self.default_layer
    }

    /// The highest active layer
    pub fn highest_layer(&self) -> Layer {
        if self.bits == 0 {
            self.default_layer
        } else {
            let top = (31 - self.bits.leading_zeros()) as Layer;
            top.max(self.default_layer)
        }
    }

    /// Layers explicitly turned on, ascending
    pub fn active_layers(&self) -> SmallVec<[Layer; 8]> {
        (0..MAX_LAYERS as Layer)
            .filter(|layer| self.bits & (1 << layer) != 0)
            .collect()
    }

    /// Full resolution order: active layers and the default layer, highest first
    pub fn resolution_order(&self) -> SmallVec<[Layer; 8]> {
        let mut mask = self.bits;
        if (self.default_layer as usize) < MAX_LAYERS {
            mask |= 1 << self.default_layer;
        }
        (0..MAX_LAYERS as Layer)
            .rev()
            .filter(|layer| mask & (1 << layer) != 0)
            .collect()
    }

    /// Raw layer bit mask
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Start a one-shot layer: on now, off after the next key is tapped
    pub fn oneshot_start(&mut self, layer: Layer) {
        self.layer_on(layer);
        self.oneshot = Some(OneShotLayer {
            layer,
            start_held: true,
            in_use: false,
        });
    }

    /// The key that started the one-shot was released
    pub fn oneshot_pressed(&mut self) {
        if let Some(oneshot) = self.oneshot.as_mut() {
            oneshot.start_held = false;
        }
    }

    pub fn oneshot_layer(&self) -> Option<Layer> {
        self.oneshot.map(|o| o.layer)
    }

    /// Another key was pressed while the one-shot layer is up
    pub fn oneshot_use(&mut self) {
        if let Some(oneshot) = self.oneshot.as_mut() {
            oneshot.in_use = true;
        }
    }

    /// A key was released; drops the one-shot layer once it has been used.
    /// Returns true if the layer stack changed.
    pub fn oneshot_release(&mut self) -> bool {
        match self.oneshot {
            Some(oneshot) if oneshot.in_use && !oneshot.start_held => {
                self.oneshot = None;
                self.layer_off(oneshot.layer);
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for LayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layers: Vec<String> = self.active_layers().iter().map(|l| l.to_string()).collect();
        write!(f, "[{}] default={}", layers.join(","), self.default_layer)
    }
}

/// A stack of named layers over the logical matrix.
///
/// Resolution walks active layers from the highest down; transparent
/// entries fall through to the next active layer.
#[derive(Debug, Clone)]
pub struct Keymap {
    layers: Vec<(String, LayerMap)>,
}

impl Keymap {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Append a layer; its id is its index
    pub fn push_layer(&mut self, name: impl Into<String>, map: LayerMap) -> Layer {
        self.layers.push((name.into(), map));
        (self.layers.len() - 1) as Layer
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer_name(&self, layer: Layer) -> Option<&str> {
        self.layers.get(layer as usize).map(|(name, _)| name.as_str())
    }

    pub fn layer_by_name(&self, name: &str) -> Option<Layer> {
        self.layers
            .iter()
            .position(|(n, _)| n == name)
            .map(|index| index as Layer)
    }

    /// The action defined on one specific layer, without fall-through
    pub fn action_on_layer(&self, layer: Layer, pos: KeyPos) -> KeyAction {
        if !pos.is_valid() {
            return KeyAction::No;
        }
        self.layers
            .get(layer as usize)
            .map(|(_, map)| map[pos.row as usize][pos.col as usize])
            .unwrap_or(KeyAction::No)
    }

    /// Resolve the action for `pos` against the active layer stack.
    ///
    /// A key transparent on every active layer falls back to layer 0.
    pub fn resolve(&self, pos: KeyPos, state: &LayerState) -> KeyAction {
        for layer in state.resolution_order() {
            let action = self.action_on_layer(layer, pos);
            if action != KeyAction::Transparent {
                return action;
            }
        }
        match self.action_on_layer(0, pos) {
            KeyAction::Transparent => KeyAction::No,
            action => action,
        }
    }

    /// Every valid position on the layout, in layout order
    pub fn positions() -> impl Iterator<Item = KeyPos> {
        (0..LAYOUT_KEYS).filter_map(KeyPos::from_layout_index)
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::kc::*;
    use crate::key_action::{k, mo, TRNS};

    fn filled(action: KeyAction) -> [KeyAction; LAYOUT_KEYS] {
        [action; LAYOUT_KEYS]
    }

    #[test]
    fn test_layout_index_positions() {
        assert_eq!(KeyPos::from_layout_index(0), Some(KeyPos::new(0, 0)));
        assert_eq!(KeyPos::from_layout_index(13), Some(KeyPos::new(1, 1)));
        assert_eq!(KeyPos::from_layout_index(36), Some(KeyPos::new(3, 3)));
        assert_eq!(KeyPos::from_layout_index(41), Some(KeyPos::new(3, 8)));
        assert_eq!(KeyPos::from_layout_index(42), None);
        assert!(!KeyPos::new(3, 0).is_valid());
        assert!(KeyPos::new(3, 5).is_valid());
        assert_eq!(Keymap::positions().count(), LAYOUT_KEYS);
    }

    #[test]
    fn test_layer_state_basics() {
        let mut state = LayerState::new();
        assert!(state.is_on(0));
        assert!(state.is_base_only());

        state.layer_on(2);
        assert!(state.is_on(2));
        assert!(!state.is_base_only());
        assert_eq!(state.highest_layer(), 2);

        state.layer_move(5);
        assert_eq!(state.active_layers().as_slice(), &[5]);

        state.layer_off(5);
        assert_eq!(state.highest_layer(), 0);

        state.layer_on(0);
        assert!(state.is_base_only());
    }

    #[test]
    fn test_resolution_order_includes_default() {
        let mut state = LayerState::new();
        state.layer_on(3);
        state.layer_on(1);
        assert_eq!(state.resolution_order().as_slice(), &[3, 1, 0]);
        state.set_default_layer(2);
        assert_eq!(state.resolution_order().as_slice(), &[3, 2, 1]);
    }

    #[test]
    fn test_default_layer_sits_above_lower_active_layers() {
        let mut state = LayerState::new();
        state.layer_on(0);
        state.set_default_layer(2);
        assert_eq!(state.resolution_order().as_slice(), &[2, 0]);
        assert!(state.is_base_only());
    }

    #[test]
    fn test_resolve_falls_through_transparent() {
        let mut keymap = Keymap::new();
        keymap.push_layer("base", layout_split_3x6_3(filled(k(KC_A))));
        let mut overlay = filled(TRNS);
        overlay[0] = k(KC_Q);
        keymap.push_layer("overlay", layout_split_3x6_3(overlay));
        keymap.push_layer("nav", layout_split_3x6_3(filled(mo(1))));

        let mut state = LayerState::new();
        state.layer_on(0);
        state.layer_on(1);
        assert_eq!(keymap.resolve(KeyPos::new(0, 0), &state), k(KC_Q));
        assert_eq!(keymap.resolve(KeyPos::new(0, 1), &state), k(KC_A));
        assert_eq!(keymap.resolve(KeyPos::new(3, 0), &state), KeyAction::No);

        state.layer_on(2);
        assert_eq!(keymap.resolve(KeyPos::new(0, 0), &state), mo(1));
        assert_eq!(keymap.layer_by_name("nav"), Some(2));
        assert_eq!(keymap.layer_name(1), Some("overlay"));
    }

    #[test]
    fn test_resolve_falls_back_to_layer_zero() {
        let mut keymap = Keymap::new();
        keymap.push_layer("base", layout_split_3x6_3(filled(k(KC_A))));
        keymap.push_layer("locked", layout_split_3x6_3(filled(TRNS)));

        // Layer 1 as the only layer and the default: nothing below it is active
        let mut state = LayerState::new();
        state.set_default_layer(1);
        assert_eq!(keymap.resolve(KeyPos::new(1, 1), &state), k(KC_A));
    }

    #[test]
    fn test_oneshot_lifecycle() {
        let mut state = LayerState::new();
        state.oneshot_start(7);
        assert!(state.is_on(7));

        // Released without use: stays up
        state.oneshot_pressed();
        assert!(!state.oneshot_release());
        assert!(state.is_on(7));

        state.oneshot_use();
        assert!(state.oneshot_release());
        assert!(!state.is_on(7));
        assert_eq!(state.oneshot_layer(), None);
    }
}
