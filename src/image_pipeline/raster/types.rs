//! PNG conversion configuration types

use crate::image_pipeline::normalize::types::NormalizationStrategy;

/// PNG compression levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngCompression {
    /// Stored deflate blocks (fastest, largest file)
    None,
    /// Fast deflate
    Fast,
    /// Balanced deflate (default)
    Balanced,
    /// Best compression (slower)
    High,
}

/// Configuration for converting one source file to PNG
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Compression level of the written PNG
    pub compression: PngCompression,
    /// How wide samples are mapped onto 8 bits
    pub normalization: NormalizationStrategy,
    /// Whether to validate image dimensions before reading planes
    pub validate_dimensions: bool,
    /// Largest accepted width or height when validating
    pub max_dimension: Option<usize>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            compression: PngCompression::Balanced,
            normalization: NormalizationStrategy::MinMax,
            validate_dimensions: true,
            max_dimension: None,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    compression: Option<PngCompression>,
    normalization: Option<NormalizationStrategy>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
}

impl ConversionConfigBuilder {
    pub fn compression(mut self, compression: PngCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn normalization(mut self, strategy: NormalizationStrategy) -> Self {
        self.normalization = Some(strategy);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            compression: self.compression.unwrap_or(default.compression),
            normalization: self.normalization.unwrap_or(default.normalization),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
        }
    }
}
