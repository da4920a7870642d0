//! Composed raster types

use crate::image_pipeline::normalize::types::NormalizedChannel;

/// 8-bit raster ready for encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposedImage {
    /// Single luminance plane
    Grayscale(NormalizedChannel),
    /// One normalized channel per color plane, all of identical size
    Rgb {
        red: NormalizedChannel,
        green: NormalizedChannel,
        blue: NormalizedChannel,
    },
}

impl ComposedImage {
    pub fn width(&self) -> usize {
        match self {
            Self::Grayscale(gray) => gray.width,
            Self::Rgb { red, .. } => red.width,
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Self::Grayscale(gray) => gray.height,
            Self::Rgb { red, .. } => red.height,
        }
    }

    pub fn is_rgb(&self) -> bool {
        matches!(self, Self::Rgb { .. })
    }

    /// Pixels packed as `0x00RRGGBB`; grayscale pixels repeat the value in all three bytes.
    pub fn packed_rgb(&self) -> Vec<u32> {
        match self {
            Self::Grayscale(gray) => gray
                .values
                .iter()
                .map(|&v| {
                    let v = v as u32;
                    (v << 16) | (v << 8) | v
                })
                .collect(),
            Self::Rgb { red, green, blue } => red
                .values
                .iter()
                .zip(&green.values)
                .zip(&blue.values)
                .map(|((&r, &g), &b)| ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
                .collect(),
        }
    }

    /// Row-major sample bytes: `RGBRGB...` for color, one byte per pixel for grayscale.
    pub fn to_interleaved(&self) -> Vec<u8> {
        match self {
            Self::Grayscale(gray) => gray.values.clone(),
            Self::Rgb { red, green, blue } => red
                .values
                .iter()
                .zip(&green.values)
                .zip(&blue.values)
                .flat_map(|((&r, &g), &b)| [r, g, b])
                .collect(),
        }
    }
}
