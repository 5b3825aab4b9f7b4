// Chordmap Modal Profile
// Colemak base with Qwerty and gaming overlays selected by the mode flags

use crate::auto_shift::{AutoShiftTable, SymbolPair};
use crate::combo::{ComboDef, ComboGate, ComboOutput, ComboTable};
use crate::custom::MacroTable;
use crate::key::kc::*;
use crate::key_action::{
    ck, g, k, lt, mo, mt, s, sym, td, CustomKeycode, KeyAction, SymbolKey, TRNS,
};
use crate::layer::{layout_split_3x6_3, Keymap, Layer};
use crate::mode::{ModeState, Variant};
use crate::modifier::Mods;
use crate::policy::TapHoldTable;
use crate::state::ModeLayers;
use crate::tap_dance::{TapDanceTable, TD_LALT};
use crate::Keycode;

use super::{Profile, ProfileKind};

pub const BASE: Layer = 0;
pub const QWERTY: Layer = 1;
pub const GAMING: Layer = 2;
pub const NAV: Layer = 3;
pub const MOUSE: Layer = 4;
pub const SETTINGS: Layer = 5;

const HOME: KeyAction = ck(CustomKeycode::Home);

#[rustfmt::skip]
fn base() -> [KeyAction; 42] {
    [
        k(KC_TAB), k(KC_Q), k(KC_W), k(KC_F), k(KC_P), k(KC_B),
        k(KC_J), k(KC_L), k(KC_U), k(KC_Y), k(KC_SEMICOLON), k(KC_MINUS),
        lt(MOUSE, KC_ESCAPE), k(KC_A), k(KC_R), k(KC_S), k(KC_T), k(KC_G),
        k(KC_M), k(KC_N), k(KC_E), k(KC_I), k(KC_O), k(KC_QUOTE),
        td(0), k(KC_Z), k(KC_X), k(KC_C), k(KC_D), k(KC_V),
        k(KC_K), k(KC_H), k(KC_COMMA), k(KC_DOT), k(KC_SLASH), mt(Mods::LALT, KC_DELETE),
        TRNS, mt(Mods::LSFT, KC_SPACE), k(KC_LEFT_GUI), mt(Mods::LCTL, KC_ENTER), lt(NAV, KC_BACKSPACE), mo(MOUSE),
    ]
}

/// Letters only; everything else falls through to the Colemak base
#[rustfmt::skip]
fn qwerty() -> [KeyAction; 42] {
    [
        TRNS, k(KC_Q), k(KC_W), k(KC_E), k(KC_R), k(KC_T),
        k(KC_Y), k(KC_U), k(KC_I), k(KC_O), k(KC_P), TRNS,
        TRNS, k(KC_A), k(KC_S), k(KC_D), k(KC_F), k(KC_G),
        k(KC_H), k(KC_J), k(KC_K), k(KC_L), k(KC_SEMICOLON), TRNS,
        TRNS, k(KC_Z), k(KC_X), k(KC_C), k(KC_V), k(KC_B),
        k(KC_N), k(KC_M), TRNS, TRNS, TRNS, TRNS,
        TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
    ]
}

/// Plain modifiers on the thumbs, no dual-role keys on the left edge
#[rustfmt::skip]
fn gaming() -> [KeyAction; 42] {
    [
        TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
        TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
        k(KC_ESCAPE), TRNS, TRNS, TRNS, TRNS, TRNS,
        TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
        k(KC_LEFT_ALT), TRNS, TRNS, TRNS, TRNS, TRNS,
        TRNS, TRNS, TRNS, TRNS, TRNS, mt(Mods::LALT, KC_END),
        k(KC_LEFT_CTRL), k(KC_SPACE), k(KC_LEFT_SHIFT), TRNS, TRNS, TRNS,
    ]
}

#[rustfmt::skip]
fn nav() -> [KeyAction; 42] {
    [
        TRNS, KeyAction::Macro(0), KeyAction::Macro(1), k(KC_UP), TRNS, TRNS,
        TRNS, k(KC_4), k(KC_5), k(KC_6), TRNS, TRNS,
        HOME, TRNS, k(KC_LEFT), k(KC_DOWN), k(KC_RIGHT), TRNS,
        k(KC_GRAVE), k(KC_1), k(KC_2), k(KC_3), sym(SymbolKey::Zero), k(KC_EQUAL),
        TRNS, sym(SymbolKey::Angle), sym(SymbolKey::Paren), sym(SymbolKey::Brace), sym(SymbolKey::Bracket), TRNS,
        TRNS, k(KC_7), k(KC_8), sym(SymbolKey::Nine), k(KC_BACKSLASH), TRNS,
        TRNS, k(g(KC_SPACE)), TRNS, TRNS, TRNS, TRNS,
    ]
}

#[rustfmt::skip]
fn mouse() -> [KeyAction; 42] {
    [
        TRNS, TRNS, k(KC_MS_BTN2), k(KC_MS_UP), k(KC_MS_BTN1), TRNS,
        TRNS, k(KC_F4), k(KC_F5), k(KC_F6), TRNS, TRNS,
        HOME, TRNS, k(KC_MS_LEFT), k(KC_MS_DOWN), k(KC_MS_RIGHT), TRNS,
        k(KC_F12), k(KC_F1), k(KC_F2), k(KC_F3), k(KC_F10), k(KC_F11),
        TRNS, TRNS, TRNS, k(KC_MS_WH_DOWN), k(KC_MS_WH_UP), TRNS,
        TRNS, k(KC_F7), k(KC_F8), k(KC_F9), TRNS, TRNS,
        TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
    ]
}

fn settings() -> [KeyAction; 42] {
    let mut keys = [TRNS; 42];
    keys[12] = HOME;
    keys[19] = ck(CustomKeycode::ToggleVariant);
    keys[20] = ck(CustomKeycode::ToggleGaming);
    keys[21] = ck(CustomKeycode::ToggleAlphaAutoShift);
    keys
}

fn keymap() -> Keymap {
    let mut keymap = Keymap::new();
    keymap.push_layer("colemak", layout_split_3x6_3(base()));
    keymap.push_layer("qwerty", layout_split_3x6_3(qwerty()));
    keymap.push_layer("gaming", layout_split_3x6_3(gaming()));
    keymap.push_layer("nav", layout_split_3x6_3(nav()));
    keymap.push_layer("mouse", layout_split_3x6_3(mouse()));
    keymap.push_layer("settings", layout_split_3x6_3(settings()));
    keymap
}

/// Chord outputs shared by both variants, with each variant's letters
const COMBO_OUTPUTS: [(&str, [Keycode; 2], [Keycode; 2], Keycode); 8] = [
    ("l_paren", [KC_S, KC_T], [KC_D, KC_F], s(KC_9)),
    ("r_paren", [KC_N, KC_E], [KC_J, KC_K], s(KC_0)),
    ("l_brace", [KC_C, KC_D], [KC_C, KC_V], s(KC_LEFT_BRACKET)),
    ("r_brace", [KC_H, KC_COMMA], [KC_M, KC_COMMA], s(KC_RIGHT_BRACKET)),
    ("l_brack", [KC_F, KC_P], [KC_E, KC_R], KC_LEFT_BRACKET),
    ("r_brack", [KC_L, KC_U], [KC_U, KC_I], KC_RIGHT_BRACKET),
    ("less_thn", [KC_S, KC_G], [KC_D, KC_G], s(KC_COMMA)),
    ("grtr_thn", [KC_M, KC_E], [KC_H, KC_K], s(KC_DOT)),
];

fn combos() -> ComboTable {
    let mut table = ComboTable::new();
    for (variant, suffix) in [(Variant::Colemak, ""), (Variant::Qwerty, "_qwerty")] {
        for (name, colemak, qwerty, output) in COMBO_OUTPUTS {
            let letters = match variant {
                Variant::Colemak => colemak,
                Variant::Qwerty => qwerty,
            };
            let mut combo = ComboDef::new(
                format!("{}{}", name, suffix),
                &[k(letters[0]), k(letters[1])],
                ComboOutput::Key(output),
            )
            .with_gate(ComboGate::Variant(variant));
            if name.ends_with("paren") {
                combo = combo.with_term(30);
            }
            table.push(combo);
        }
    }
    table.push(ComboDef::new(
        "settings",
        &[k(KC_L), k(KC_U), k(KC_Y), k(KC_SEMICOLON)],
        ComboOutput::OneShotLayer(SETTINGS),
    ));
    table.push(ComboDef::new(
        "settings_qwerty",
        &[k(KC_U), k(KC_I), k(KC_O), k(KC_P)],
        ComboOutput::OneShotLayer(SETTINGS),
    ));
    table
}

fn auto_shift() -> AutoShiftTable {
    AutoShiftTable::new()
        .with_gaming_layer(GAMING)
        .with_symbol(SymbolKey::Zero, SymbolPair::new(KC_0, KC_GRAVE))
        .with_symbol(SymbolKey::Nine, SymbolPair::new(KC_9, KC_BACKSLASH))
        .with_symbol(SymbolKey::Paren, SymbolPair::new(s(KC_9), s(KC_0)))
        .with_symbol(
            SymbolKey::Brace,
            SymbolPair::new(s(KC_LEFT_BRACKET), s(KC_RIGHT_BRACKET)),
        )
        .with_symbol(
            SymbolKey::Bracket,
            SymbolPair::new(KC_LEFT_BRACKET, KC_RIGHT_BRACKET),
        )
        .with_symbol(SymbolKey::Angle, SymbolPair::new(s(KC_COMMA), s(KC_DOT)))
}

pub fn profile() -> Profile {
    Profile {
        kind: ProfileKind::Modal,
        keymap: keymap(),
        tap_hold: TapHoldTable::new(),
        combos: combos(),
        auto_shift: auto_shift(),
        tap_dances: TapDanceTable::new(vec![TD_LALT]),
        macros: MacroTable::new(["->", "=>"]),
        mode_layers: ModeLayers {
            base: BASE,
            variant_overlay: Some(QWERTY),
            gaming_overlay: Some(GAMING),
        },
        initial_mode: ModeState::default(),
    }
}
