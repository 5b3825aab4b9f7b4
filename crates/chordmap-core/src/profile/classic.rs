// Chordmap Classic Profile
// Eight fixed layers, base-layer combos and a one-shot settings layer

use crate::auto_shift::AutoShiftTable;
use crate::combo::{ComboDef, ComboGate, ComboOutput, ComboTable};
use crate::custom::MacroTable;
use crate::key::kc::*;
use crate::key_action::{df, g, k, lt, mo, mt, s, td, to, KeyAction, TRNS};
use crate::layer::{layout_split_3x6_3, Keymap, Layer};
use crate::mode::ModeState;
use crate::modifier::Mods;
use crate::policy::TapHoldTable;
use crate::state::ModeLayers;
use crate::tap_dance::{TapDanceTable, TD_LALT};

use super::{Profile, ProfileKind};

pub const BASE: Layer = 0;
pub const GAMING: Layer = 1;
pub const NAV: Layer = 2;
pub const WINDOW: Layer = 3;
pub const SPARE: Layer = 4;
pub const MOUSE: Layer = 5;
pub const SYMBOLS: Layer = 6;
pub const SETTINGS: Layer = 7;

const TD_ALT: KeyAction = td(0);
const ESC_SYM: KeyAction = lt(SYMBOLS, KC_ESCAPE);
const COMM_WIN: KeyAction = lt(WINDOW, KC_COMMA);
const DOT_SPARE: KeyAction = lt(SPARE, KC_DOT);
const SPC_SFT: KeyAction = mt(Mods::LSFT, KC_SPACE);
const ENT_CTL: KeyAction = mt(Mods::LCTL, KC_ENTER);
const BSPC_NAV: KeyAction = lt(NAV, KC_BACKSPACE);

#[rustfmt::skip]
fn base() -> [KeyAction; 42] {
    [
        k(KC_TAB), k(KC_Q), k(KC_W), k(KC_F), k(KC_P), k(KC_B),
        k(KC_J), k(KC_L), k(KC_U), k(KC_Y), k(KC_SEMICOLON), k(KC_MINUS),
        ESC_SYM, k(KC_A), k(KC_R), k(KC_S), k(KC_T), k(KC_G),
        k(KC_M), k(KC_N), k(KC_E), k(KC_I), k(KC_O), k(KC_QUOTE),
        TD_ALT, k(KC_Z), k(KC_X), k(KC_C), k(KC_D), k(KC_V),
        k(KC_K), k(KC_H), COMM_WIN, DOT_SPARE, k(KC_SLASH), mt(Mods::LALT, KC_DELETE),
        TRNS, SPC_SFT, k(KC_LEFT_GUI), ENT_CTL, BSPC_NAV, mo(MOUSE),
    ]
}

#[rustfmt::skip]
fn gaming() -> [KeyAction; 42] {
    [
        k(KC_TAB), k(KC_Q), k(KC_W), k(KC_F), k(KC_P), k(KC_B),
        k(KC_J), k(KC_L), k(KC_U), k(KC_Y), k(KC_SEMICOLON), k(KC_MINUS),
        k(KC_ESCAPE), k(KC_A), k(KC_R), k(KC_S), k(KC_T), k(KC_G),
        k(KC_M), k(KC_N), k(KC_E), k(KC_I), k(KC_O), k(KC_QUOTE),
        k(KC_LEFT_ALT), k(KC_Z), k(KC_X), k(KC_C), k(KC_D), k(KC_V),
        k(KC_K), k(KC_H), COMM_WIN, DOT_SPARE, k(KC_SLASH), mt(Mods::LALT, KC_END),
        k(KC_LEFT_CTRL), k(KC_SPACE), k(KC_LEFT_SHIFT), ENT_CTL, BSPC_NAV, mo(MOUSE),
    ]
}

#[rustfmt::skip]
fn nav() -> [KeyAction; 42] {
    [
        TRNS, TRNS, TRNS, k(KC_UP), TRNS, TRNS,
        TRNS, k(KC_4), k(KC_5), k(KC_6), TRNS, TRNS,
        df(BASE), TRNS, k(KC_LEFT), k(KC_DOWN), k(KC_RIGHT), TRNS,
        k(KC_GRAVE), k(KC_1), k(KC_2), k(KC_3), k(KC_KP_0), k(KC_EQUAL),
        TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
        TRNS, k(KC_7), k(KC_8), k(KC_KP_9), k(KC_BACKSLASH), TRNS,
        df(NAV), k(g(KC_SPACE)), TRNS, TRNS, TRNS, TRNS,
    ]
}

#[rustfmt::skip]
fn mouse() -> [KeyAction; 42] {
    [
        TRNS, TRNS, k(KC_MS_BTN2), k(KC_MS_UP), k(KC_MS_BTN1), TRNS,
        TRNS, k(KC_F4), k(KC_F5), k(KC_F6), TRNS, TRNS,
        df(BASE), TRNS, k(KC_MS_LEFT), k(KC_MS_DOWN), k(KC_MS_RIGHT), TRNS,
        k(KC_F12), k(KC_F1), k(KC_F2), k(KC_F3), k(KC_F10), k(KC_F11),
        TRNS, TRNS, TRNS, k(KC_MS_WH_DOWN), k(KC_MS_WH_UP), TRNS,
        TRNS, k(KC_F7), k(KC_F8), k(KC_F9), TRNS, TRNS,
        df(MOUSE), TRNS, TRNS, TRNS, TRNS, TRNS,
    ]
}

/// A layer with nothing but its own DF key and the way back to base
fn placeholder(layer: Layer) -> [KeyAction; 42] {
    let mut keys = [TRNS; 42];
    keys[12] = df(BASE);
    keys[36] = df(layer);
    keys
}

fn settings() -> [KeyAction; 42] {
    let mut keys = [TRNS; 42];
    keys[12] = df(BASE);
    keys[19] = to(GAMING);
    keys
}

fn keymap() -> Keymap {
    let mut keymap = Keymap::new();
    keymap.push_layer("base", layout_split_3x6_3(base()));
    keymap.push_layer("gaming", layout_split_3x6_3(gaming()));
    keymap.push_layer("nav", layout_split_3x6_3(nav()));
    keymap.push_layer("window", layout_split_3x6_3(placeholder(WINDOW)));
    keymap.push_layer("spare", layout_split_3x6_3(placeholder(SPARE)));
    keymap.push_layer("mouse", layout_split_3x6_3(mouse()));
    keymap.push_layer("symbols", layout_split_3x6_3(placeholder(SYMBOLS)));
    keymap.push_layer("settings", layout_split_3x6_3(settings()));
    keymap
}

fn combos() -> ComboTable {
    let key = |name: &str, keys: &[KeyAction], keycode| {
        ComboDef::new(name, keys, ComboOutput::Key(keycode)).with_gate(ComboGate::BaseLayerOnly)
    };

    let mut table = ComboTable::new().with_lookup_layer(BASE);
    table.push(key("l_paren", &[k(KC_S), k(KC_T)], s(KC_9)).with_term(30));
    table.push(key("r_paren", &[k(KC_N), k(KC_E)], s(KC_0)).with_term(30));
    table.push(key("l_brace", &[k(KC_C), k(KC_D)], s(KC_LEFT_BRACKET)));
    table.push(key("r_brace", &[k(KC_H), COMM_WIN], s(KC_RIGHT_BRACKET)));
    table.push(key("l_brack", &[k(KC_F), k(KC_P)], KC_LEFT_BRACKET));
    table.push(key("r_brack", &[k(KC_L), k(KC_U)], KC_RIGHT_BRACKET));
    table.push(key("less_thn", &[k(KC_S), k(KC_G)], s(KC_COMMA)));
    table.push(key("grtr_thn", &[k(KC_M), k(KC_E)], s(KC_DOT)));
    table.push(ComboDef::new(
        "settings",
        &[k(KC_L), k(KC_U), k(KC_Y), k(KC_SEMICOLON)],
        ComboOutput::OneShotLayer(SETTINGS),
    ));
    table
}

pub fn profile() -> Profile {
    Profile {
        kind: ProfileKind::Classic,
        keymap: keymap(),
        tap_hold: TapHoldTable::new(),
        combos: combos(),
        auto_shift: AutoShiftTable::new().with_gaming_layer(GAMING),
        tap_dances: TapDanceTable::new(vec![TD_LALT]),
        macros: MacroTable::default(),
        mode_layers: ModeLayers {
            base: BASE,
            variant_overlay: None,
            gaming_overlay: Some(GAMING),
        },
        initial_mode: ModeState::default(),
    }
}
