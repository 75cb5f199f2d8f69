use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// A color in its canonical `#rrggbb` form (lowercase, two digits per channel)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalColor([u8; 3]);

impl CanonicalColor {
    pub const BLACK: Self = Self([0, 0, 0]);

    pub const fn from_rgb(rgb: [u8; 3]) -> Self {
        Self(rgb)
    }

    pub const fn rgb(&self) -> [u8; 3] {
        self.0
    }
}
impl From<image::Rgb<u8>> for CanonicalColor {
    fn from(value: image::Rgb<u8>) -> Self {
        Self(value.0)
    }
}
impl From<CanonicalColor> for image::Rgb<u8> {
    fn from(value: CanonicalColor) -> Self {
        image::Rgb(value.0)
    }
}
impl std::fmt::Display for CanonicalColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}
impl std::str::FromStr for CanonicalColor {
    type Err = Error;

    /// Strict decoding: `#` followed by exactly six hex digits
    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| Error::invalid_color_code(s))?;
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| Error::invalid_color_code(s))
        };
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}
impl TryFrom<String> for CanonicalColor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}
impl From<CanonicalColor> for String {
    fn from(value: CanonicalColor) -> Self {
        value.to_string()
    }
}

/// Matches the leading `rgb(r, g, b` / `rgba(r, g, b` part; the rest is ignored.
static FUNCTIONAL_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rgba?\(([0-9]+\.?[0-9]*),\s*([0-9]+\.?[0-9]*),\s*([0-9]+\.?[0-9]*)")
        .expect("valid regex")
});

/// Normalizes a color picked in the UI into its canonical form.
///
/// Accepts `#rrggbb` (any case) and the functional `rgb(...)`/`rgba(...)`
/// notation. Functional channels are truncated toward zero and clamped to
/// `0..=255`; a trailing alpha component is ignored.
pub fn parse_color_code(text: &str) -> Result<CanonicalColor> {
    if text.starts_with('#') && text.len() == 7 {
        return text.parse();
    }
    let captures = FUNCTIONAL_COLOR
        .captures(text)
        .ok_or_else(|| Error::invalid_color_code(text))?;
    let mut rgb = [0u8; 3];
    for (channel, capture) in rgb.iter_mut().zip(captures.iter().skip(1)) {
        let value = capture
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .ok_or_else(|| Error::invalid_color_code(text))?;
        *channel = value.trunc().clamp(0., 255.) as u8;
    }
    Ok(CanonicalColor(rgb))
}
