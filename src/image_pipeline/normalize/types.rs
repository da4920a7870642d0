//! Sample and channel buffer types

/// Unsigned samples reconstructed from one raw plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    pub width: usize,
    pub height: usize,
    /// One value per pixel, row-major, `width * height` long
    pub values: Vec<u32>,
}

/// One channel stretched to 8 bits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedChannel {
    pub width: usize,
    pub height: usize,
    /// One value per pixel, row-major, `width * height` long
    pub values: Vec<u8>,
}

/// How samples are mapped onto 0..=255
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NormalizationStrategy {
    /// `(v - min) * 255 / (max - min)` over the observed range
    #[default]
    MinMax,
    /// `v * 255 / max`, treating zero as the black point
    MaxOnly,
}
