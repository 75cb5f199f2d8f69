#![warn(clippy::all, rust_2018_idioms)]

mod error;
pub use error::{Error, Result};

mod color_code;
pub use color_code::{parse_color_code, CanonicalColor};

mod palette;
pub use palette::{
    extract_palette, resample, PaletteEntry, RankedPalette, ResampleFilter, SamplingSettings,
};

mod replace;
pub use replace::{color_distance, count_matches, replace_color, replace_color_codes, Tolerance};

pub mod workflow;

pub type ImageBuf = image::ImageBuffer<image::Rgba<u8>, Vec<u8>>;

#[test]
fn test_palette_then_replace() {
    let image = ImageBuf::from_fn(200, 50, |x, y| match (x, y) {
        (0..=89, _) => image::Rgba([255, 0, 0, 255]),
        (90..=129, _) => image::Rgba([250, 6, 2, 200]),
        (130..=159, 0..=24) => image::Rgba([255, 0, 0, 0]),
        _ => image::Rgba([20, 20, 220, 255]),
    });
    let palette = extract_palette(&image, &SamplingSettings::default());
    let colors = palette.colors().iter().map(ToString::to_string).collect::<Vec<_>>();
    assert_eq!(colors, ["#ff0000", "#1414dc", "#fa0602"]);

    let from = parse_color_code(&colors[0]).unwrap();
    let to = parse_color_code("rgba(0, 128, 0, 0.3)").unwrap();
    let recolored = replace_color(&image, from, to, Tolerance::new(10.).unwrap());
    assert_eq!(recolored.dimensions(), image.dimensions());
    for (before, after) in image.pixels().zip(recolored.pixels()) {
        assert_eq!(before.0[3], after.0[3]);
        let expected = match before.0 {
            [255, 0, 0, 255] | [250, 6, 2, 200] => [0, 128, 0],
            [r, g, b, _] => [r, g, b],
        };
        assert_eq!(after.0[..3], expected);
    }
}
