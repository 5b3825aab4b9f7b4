// Chordmap State
// Keyboard mode state, layer resolver and held-key records

mod keyboard;
mod keystore;

pub use keyboard::{KeyboardState, ModeLayers};
pub use keystore::{Handled, Keystate, Keystore};
