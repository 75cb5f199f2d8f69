use std::collections::HashMap;

use itertools::Itertools;

use crate::{CanonicalColor, Error, ImageBuf, Result};

/// How the image is shrunk onto the analysis grid
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResampleFilter {
    #[default]
    Nearest,
    Bilinear,
    CatmullRom,
    Lanczos3,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SamplingSettings {
    /// Width of the grid the image is resampled to before counting colors
    pub grid_width: u32,
    pub grid_height: u32,
    /// Maximal number of colors reported
    pub palette_size: usize,
    pub filter: ResampleFilter,
}
impl SamplingSettings {
    /// A zero grid or palette size would report no colors for any image
    pub fn validate(&self) -> Result<()> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(Error::InvalidSettings(format!(
                "analysis grid must not be empty, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if self.palette_size == 0 {
            return Err(Error::InvalidSettings(
                "palette size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            grid_width: 100,
            grid_height: 100,
            palette_size: 10,
            filter: ResampleFilter::Nearest,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub color: CanonicalColor,
    /// Number of sampled pixels with exactly this color
    pub count: usize,
}

/// Dominant colors, most frequent first. Empty if every sampled pixel was transparent.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedPalette {
    entries: Vec<PaletteEntry>,
}
impl RankedPalette {
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn colors(&self) -> Vec<CanonicalColor> {
        self.entries.iter().map(|e| e.color).collect()
    }

    pub fn dominant(&self) -> Option<CanonicalColor> {
        self.entries.first().map(|e| e.color)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Comma separated list, e.g. `#ff0000, #00ff00`
    pub fn summary(&self) -> String {
        self.entries.iter().map(|e| e.color).join(", ")
    }
}

/// An empty palette means the image has no visible pixel; zero sizes in
/// `settings` are raised to 1 so they cannot hide colors.
pub fn extract_palette(image: &ImageBuf, settings: &SamplingSettings) -> RankedPalette {
    let SamplingSettings {
        grid_width,
        grid_height,
        palette_size,
        filter,
    } = *settings;
    if image.width() == 0 || image.height() == 0 {
        log::debug!("Nothing to sample: image is empty");
        return RankedPalette::default();
    }
    let (grid_width, grid_height, palette_size) =
        (grid_width.max(1), grid_height.max(1), palette_size.max(1));
    let sampled = resample(image, grid_width, grid_height, filter);
    let extractor = ColorExtractor::classify_image(&sampled);
    log::debug!(
        "Sampled {} opaque pixels with {} distinct colors",
        extractor.opaque_pixels,
        extractor.color_occurences.len()
    );
    extractor.extract(palette_size)
}

#[derive(Debug, Default)]
struct ColorExtractor {
    color_occurences: HashMap<[u8; 3], usize>,
    opaque_pixels: usize,
}
impl ColorExtractor {
    fn classify_image(image: &ImageBuf) -> Self {
        let opaque = image
            .pixels()
            .filter(|p| p.0[3] > 0)
            .map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect_vec();
        Self {
            opaque_pixels: opaque.len(),
            color_occurences: opaque.into_iter().counts(),
        }
    }

    /// Ties between equally frequent colors are broken by ascending RGB
    fn extract(self, palette_size: usize) -> RankedPalette {
        let entries = self
            .color_occurences
            .into_iter()
            .sorted_unstable_by(|(color_a, count_a), (color_b, count_b)| {
                count_b.cmp(count_a).then(color_a.cmp(color_b))
            })
            .take(palette_size)
            .map(|(rgb, count)| PaletteEntry {
                color: CanonicalColor::from_rgb(rgb),
                count,
            })
            .collect();
        RankedPalette { entries }
    }
}

/// Resamples all four channels onto a `width` x `height` grid.
pub fn resample(image: &ImageBuf, width: u32, height: u32, filter: ResampleFilter) -> ImageBuf {
    use image::imageops::FilterType;
    match filter {
        ResampleFilter::Nearest => image::imageops::resize(image, width, height, FilterType::Nearest),
        ResampleFilter::Bilinear => resample_bilinear(image, width, height),
        ResampleFilter::CatmullRom => {
            image::imageops::resize(image, width, height, FilterType::CatmullRom)
        }
        ResampleFilter::Lanczos3 => image::imageops::resize(image, width, height, FilterType::Lanczos3),
    }
}

fn resample_bilinear(image: &ImageBuf, width: u32, height: u32) -> ImageBuf {
    if image.width() == 0 || image.height() == 0 {
        return ImageBuf::new(width, height);
    }
    let source_position = |target: u32, steps: u32, size: u32| {
        let position = (target as f32 + 0.5) / steps as f32 * size as f32 - 0.5;
        position.max(0.)
    };
    ImageBuf::from_fn(width, height, |x, y| {
        let left = source_position(x, width, image.width());
        let x_fraction = left.fract();
        let left = left as u32;
        let top = source_position(y, height, image.height());
        let y_fraction = top.fract();
        let top = top as u32;
        let fetch_pixel = |x: u32, y: u32| {
            let x = x.min(image.width() - 1);
            let y = y.min(image.height() - 1);
            *image.get_pixel(x, y)
        };
        let lt = fetch_pixel(left, top);
        let lb = fetch_pixel(left, top + 1);
        let rt = fetch_pixel(left + 1, top);
        let rb = fetch_pixel(left + 1, top + 1);
        let l = imageproc::pixelops::interpolate(lt, lb, 1. - y_fraction);
        let r = imageproc::pixelops::interpolate(rt, rb, 1. - y_fraction);
        imageproc::pixelops::interpolate(l, r, 1. - x_fraction)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: image::Rgba<u8> = image::Rgba([255, 0, 0, 255]);
    const GREEN: image::Rgba<u8> = image::Rgba([0, 255, 0, 255]);
    const BLUE: image::Rgba<u8> = image::Rgba([0, 0, 255, 255]);
    const CLEAR: image::Rgba<u8> = image::Rgba([12, 34, 56, 0]);

    fn hex(color: CanonicalColor) -> String {
        color.to_string()
    }

    #[test]
    fn transparent_image_has_empty_palette() {
        let image = ImageBuf::from_pixel(37, 91, CLEAR);
        let palette = extract_palette(&image, &SamplingSettings::default());
        assert!(palette.is_empty());
        assert_eq!(palette.summary(), "");
    }

    #[test]
    fn empty_image_has_empty_palette() {
        let image = ImageBuf::new(0, 0);
        assert!(extract_palette(&image, &SamplingSettings::default()).is_empty());
    }

    #[test]
    fn ranked_by_frequency() {
        // 100x100 maps one to one onto the analysis grid
        let image = ImageBuf::from_fn(100, 100, |x, _| match x {
            0..=59 => RED,
            60..=89 => GREEN,
            90..=94 => BLUE,
            _ => CLEAR,
        });
        let palette = extract_palette(&image, &SamplingSettings::default());
        let colors = palette.colors().into_iter().map(hex).collect_vec();
        assert_eq!(colors, ["#ff0000", "#00ff00", "#0000ff"]);
        let counts = palette.entries().iter().map(|e| e.count).collect_vec();
        assert_eq!(counts, [6000, 3000, 500]);
        assert_eq!(palette.summary(), "#ff0000, #00ff00, #0000ff");
        assert_eq!(palette.dominant().map(hex).as_deref(), Some("#ff0000"));
    }

    #[test]
    fn transparent_pixels_never_sampled() {
        let image = ImageBuf::from_fn(100, 100, |x, _| if x < 10 { RED } else { CLEAR });
        let palette = extract_palette(&image, &SamplingSettings::default());
        assert_eq!(palette.len(), 1);
        assert_eq!(hex(palette.colors()[0]), "#ff0000");
    }

    #[test]
    fn at_most_palette_size_colors() {
        let image = ImageBuf::from_fn(100, 100, |x, y| {
            image::Rgba([(x % 16) as u8, (y % 16) as u8, 7, 255])
        });
        let palette = extract_palette(&image, &SamplingSettings::default());
        assert_eq!(palette.len(), 10);
        let counts = palette.entries().iter().map(|e| e.count).collect_vec();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));

        let settings = SamplingSettings {
            palette_size: 3,
            ..Default::default()
        };
        assert_eq!(extract_palette(&image, &settings).len(), 3);
    }

    #[test]
    fn zero_sizes_still_report_colors() {
        let image = ImageBuf::from_fn(100, 100, |x, _| if x < 60 { RED } else { GREEN });
        let settings = SamplingSettings {
            grid_width: 0,
            grid_height: 0,
            palette_size: 0,
            ..Default::default()
        };
        let palette = extract_palette(&image, &settings);
        assert_eq!(palette.len(), 1);
        assert!(!palette.is_empty());
    }

    #[test]
    fn settings_validation() {
        assert!(SamplingSettings::default().validate().is_ok());
        for settings in [
            SamplingSettings {
                palette_size: 0,
                ..Default::default()
            },
            SamplingSettings {
                grid_width: 0,
                ..Default::default()
            },
            SamplingSettings {
                grid_height: 0,
                ..Default::default()
            },
        ] {
            assert!(
                matches!(settings.validate(), Err(Error::InvalidSettings(_))),
                "{settings:?}"
            );
        }
    }

    #[test]
    fn ties_are_broken_by_rgb() {
        let image = ImageBuf::from_fn(100, 100, |x, _| if x < 50 { GREEN } else { BLUE });
        let palette = extract_palette(&image, &SamplingSettings::default());
        let colors = palette.colors().into_iter().map(hex).collect_vec();
        assert_eq!(colors, ["#0000ff", "#00ff00"]);
    }

    #[test]
    fn large_images_are_sampled_on_grid() {
        let image = ImageBuf::from_fn(1000, 400, |_, y| if y < 300 { BLUE } else { RED });
        let palette = extract_palette(&image, &SamplingSettings::default());
        let total: usize = palette.entries().iter().map(|e| e.count).sum();
        assert_eq!(total, 100 * 100);
        assert_eq!(hex(palette.colors()[0]), "#0000ff");
    }

    #[test]
    fn every_filter_yields_grid_size() {
        let image = ImageBuf::from_fn(31, 17, |x, y| image::Rgba([x as u8, y as u8, 0, 255]));
        for filter in [
            ResampleFilter::Nearest,
            ResampleFilter::Bilinear,
            ResampleFilter::CatmullRom,
            ResampleFilter::Lanczos3,
        ] {
            let sampled = resample(&image, 10, 12, filter);
            assert_eq!(sampled.dimensions(), (10, 12), "{filter:?}");
        }
    }

    #[test]
    fn bilinear_keeps_uniform_colors() {
        let color = image::Rgba([10, 200, 30, 128]);
        let image = ImageBuf::from_pixel(7, 13, color);
        let sampled = resample(&image, 20, 20, ResampleFilter::Bilinear);
        // interpolation truncates, so allow one step of rounding error
        let close = |p: &image::Rgba<u8>| p.0.iter().zip(color.0).all(|(a, b)| a.abs_diff(b) <= 1);
        assert!(sampled.pixels().all(close));
    }
}
