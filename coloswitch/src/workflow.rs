//! Request/response helpers for a front end: every call takes all of its inputs
//! and renders failures as messages instead of propagating them.

use crate::{
    count_matches, extract_palette, parse_color_code, replace_color, CanonicalColor, ImageBuf,
    RankedPalette, Result, SamplingSettings, Tolerance,
};

pub const NO_COLORS_FOUND: &str = "No usable colors were found (is the image fully transparent?)";

/// What a front end needs to offer the dominant colors for selection
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct PaletteChoices {
    pub choices: Vec<CanonicalColor>,
    /// Preselected entry, the most frequent color
    pub selected: Option<CanonicalColor>,
    /// Either the list of colors or a warning if there are none
    pub message: String,
    #[serde(skip)]
    pub palette: RankedPalette,
}
impl PaletteChoices {
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

pub fn extract_choices(image: &ImageBuf, settings: &SamplingSettings) -> PaletteChoices {
    let palette = extract_palette(image, settings);
    if palette.is_empty() {
        log::warn!(
            "No visible colors in {}x{} image",
            image.width(),
            image.height()
        );
        return PaletteChoices {
            choices: Vec::new(),
            selected: None,
            message: NO_COLORS_FOUND.into(),
            palette,
        };
    }
    PaletteChoices {
        choices: palette.colors(),
        selected: palette.dominant(),
        message: palette.summary(),
        palette,
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RecolorRequest {
    /// Color to be replaced, usually one of [`PaletteChoices::choices`]
    pub selected_color: String,
    /// As delivered by a color picker: `#rrggbb`, `rgb(...)` or `rgba(...)`
    pub target_color: String,
    pub tolerance: f64,
}
impl Default for RecolorRequest {
    fn default() -> Self {
        Self {
            selected_color: String::new(),
            target_color: CanonicalColor::BLACK.to_string(),
            tolerance: Tolerance::default().value(),
        }
    }
}

#[derive(Debug)]
pub enum RecolorOutcome {
    Recolored {
        image: ImageBuf,
        /// Number of repainted pixels
        matched: usize,
    },
    Failed {
        message: String,
    },
}
impl RecolorOutcome {
    pub fn image(&self) -> Option<&ImageBuf> {
        match self {
            RecolorOutcome::Recolored { image, .. } => Some(image),
            RecolorOutcome::Failed { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RecolorOutcome::Recolored { .. } => None,
            RecolorOutcome::Failed { message } => Some(message),
        }
    }
}

pub fn process(image: &ImageBuf, request: &RecolorRequest) -> RecolorOutcome {
    match try_process(image, request) {
        Ok((image, matched)) => RecolorOutcome::Recolored { image, matched },
        Err(e) => {
            log::warn!("Recoloring failed: {e}");
            RecolorOutcome::Failed {
                message: format!("Error: {e}"),
            }
        }
    }
}

fn try_process(image: &ImageBuf, request: &RecolorRequest) -> Result<(ImageBuf, usize)> {
    let from = parse_color_code(&request.selected_color)?;
    let to = parse_color_code(&request.target_color)?;
    let tolerance = Tolerance::new(request.tolerance)?;
    let matched = count_matches(image, from, tolerance);
    log::info!("Replacing {from} by {to} (tolerance {}): {matched} pixels", tolerance.value());
    Ok((replace_color(image, from, to, tolerance), matched))
}

/// Decodes any format supported by `image` into RGBA
pub fn decode_image(bytes: &[u8]) -> Result<ImageBuf> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgba8())
}

pub fn encode_png(image: &ImageBuf) -> Result<Vec<u8>> {
    use image::ImageEncoder;
    let mut bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}
