use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("keycodes.rs");
    let mut f = File::create(&dest_path).unwrap();

    // Generate the Keycode newtype wrapper
    writeln!(
        f,
        r#"
/// Represents a single firmware keycode.
///
/// This is a newtype wrapper around u16 for type safety.
/// The low byte is a HID keyboard usage (QMK basic keycode space);
/// the high byte carries modifier bits in HID report order, so
/// `S(KC_9)` is `KC_9` with the left-shift bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Keycode(pub u16);

impl Keycode {{
    /// Get the raw numeric code value
    pub const fn code(self) -> u16 {{
        self.0
    }}

    /// The basic keycode with all modifier bits stripped
    pub const fn basic(self) -> Keycode {{
        Keycode(self.0 & 0x00FF)
    }}

    /// The modifier bits carried in the high byte
    pub const fn mod_bits(self) -> u8 {{
        (self.0 >> 8) as u8
    }}

    /// Get the name of the basic part of this keycode
    pub fn name(self) -> &'static str {{
        keycode_name(self.basic().0)
    }}
}}

impl From<u16> for Keycode {{
    fn from(code: u16) -> Self {{
        Keycode(code)
    }}
}}

impl From<Keycode> for u16 {{
    fn from(keycode: Keycode) -> Self {{
        keycode.0
    }}
}}

impl fmt::Display for Keycode {{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {{
        display_keycode(*self, f)
    }}
}}

impl FromStr for Keycode {{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {{
        keycode_from_name(s).ok_or_else(|| format!("Unknown keycode: {{}}", s))
    }}
}}
"#
    )
    .unwrap();

    println!("cargo:rerun-if-changed=build.rs");
}
