use crate::{CanonicalColor, Error, ImageBuf, Result};

/// Maximal Euclidean RGB distance for a pixel to be recolored, between 0. and 100.
/// Note: this is an absolute radius in RGB space, the cube diagonal is about 441.7
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tolerance(f64);

impl Tolerance {
    pub const MAX: f64 = 100.;

    pub fn new(x: f64) -> Result<Self> {
        if (0. ..=Self::MAX).contains(&x) {
            Ok(Self(x))
        } else {
            Err(Error::InvalidTolerance(x))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    #[inline(always)]
    fn admits(&self, distance: f64) -> bool {
        distance <= self.0
    }
}
impl Default for Tolerance {
    fn default() -> Self {
        Self(30.)
    }
}
impl TryFrom<f64> for Tolerance {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}
impl From<Tolerance> for f64 {
    fn from(value: Tolerance) -> Self {
        value.0
    }
}

#[inline(always)]
pub fn color_distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    a.into_iter()
        .zip(b)
        .map(|(a, b)| {
            let d = f64::from(a) - f64::from(b);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[inline(always)]
fn is_match(pixel: &image::Rgba<u8>, from: [u8; 3], tolerance: Tolerance) -> bool {
    let [r, g, b, a] = pixel.0;
    a > 0 && tolerance.admits(color_distance([r, g, b], from))
}

/// Repaints every visible pixel within `tolerance` of `from` with `to`.
///
/// Transparent pixels are never touched and alpha is always kept; the input is
/// left as is and a new image is returned.
pub fn replace_color(
    image: &ImageBuf,
    from: CanonicalColor,
    to: CanonicalColor,
    tolerance: Tolerance,
) -> ImageBuf {
    let from = from.rgb();
    let [r, g, b] = to.rgb();
    imageproc::map::map_pixels(image, |_, _, p| {
        if is_match(&p, from, tolerance) {
            image::Rgba([r, g, b, p.0[3]])
        } else {
            p
        }
    })
}

/// Same as [`replace_color`], decoding both colors from their `#rrggbb` form first
pub fn replace_color_codes(
    image: &ImageBuf,
    from: &str,
    to: &str,
    tolerance: Tolerance,
) -> Result<ImageBuf> {
    let from = from.parse()?;
    let to = to.parse()?;
    Ok(replace_color(image, from, to, tolerance))
}

/// Number of pixels [`replace_color`] would repaint
pub fn count_matches(image: &ImageBuf, from: CanonicalColor, tolerance: Tolerance) -> usize {
    let from = from.rgb();
    image
        .pixels()
        .filter(|p| is_match(p, from, tolerance))
        .count()
}
