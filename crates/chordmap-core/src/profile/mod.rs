// Chordmap Profiles
// Complete keymap revisions: layers, combos, tap-hold and auto-shift tables

mod classic;
mod modal;

use serde::Deserialize;
use strum_macros::{Display, EnumIter, EnumString};

use crate::auto_shift::AutoShiftTable;
use crate::combo::ComboTable;
use crate::custom::MacroTable;
use crate::layer::Keymap;
use crate::mode::ModeState;
use crate::policy::TapHoldTable;
use crate::state::ModeLayers;
use crate::tap_dance::TapDanceTable;

/// Which keymap revision to build
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// Eight fixed layers switched with DF/TO keys
    Classic,
    /// Mode flags drive a Colemak base with Qwerty and gaming overlays
    #[default]
    Modal,
}

/// Everything the engine needs to run one keymap
#[derive(Debug, Clone)]
pub struct Profile {
    pub kind: ProfileKind,
    pub keymap: Keymap,
    pub tap_hold: TapHoldTable,
    pub combos: ComboTable,
    pub auto_shift: AutoShiftTable,
    pub tap_dances: TapDanceTable,
    pub macros: MacroTable,
    pub mode_layers: ModeLayers,
    /// Mode applied by `post_init`
    pub initial_mode: ModeState,
}

impl Profile {
    pub fn from_kind(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Classic => classic::profile(),
            ProfileKind::Modal => modal::profile(),
        }
    }

    pub fn classic() -> Self {
        classic::profile()
    }

    pub fn modal() -> Self {
        modal::profile()
    }

    pub fn with_initial_mode(mut self, mode: ModeState) -> Self {
        self.initial_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_action::KeyAction;
    use crate::layer::{KeyPos, Layer};
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    /// Every layer key must point at a layer the keymap defines
    fn layer_targets_exist(profile: &Profile) -> bool {
        let layers = profile.keymap.len() as Layer;
        (0..layers).all(|layer| {
            Keymap::positions().all(|pos: KeyPos| match profile.keymap.action_on_layer(layer, pos) {
                KeyAction::Momentary(l)
                | KeyAction::DefaultLayer(l)
                | KeyAction::ToLayer(l)
                | KeyAction::LayerTap { layer: l, .. } => l < layers,
                _ => true,
            })
        })
    }

    #[test]
    fn test_profile_kind_from_str() {
        assert_eq!(ProfileKind::from_str("classic"), Ok(ProfileKind::Classic));
        assert_eq!(ProfileKind::from_str("MODAL"), Ok(ProfileKind::Modal));
        assert!(ProfileKind::from_str("ortho").is_err());
        assert_eq!(ProfileKind::Classic.to_string(), "classic");
    }

    #[test]
    fn test_every_profile_is_consistent() {
        for kind in ProfileKind::iter() {
            let profile = Profile::from_kind(kind);
            assert_eq!(profile.kind, kind);
            assert!(layer_targets_exist(&profile), "{} has a dangling layer key", kind);

            let overlays = [
                profile.mode_layers.variant_overlay,
                profile.mode_layers.gaming_overlay,
            ];
            for layer in overlays.into_iter().flatten() {
                assert!((layer as usize) < profile.keymap.len());
            }
            for combo in profile.combos.iter() {
                assert!((2..=4).contains(&combo.keys.len()), "{}", combo);
            }
        }
    }
}
