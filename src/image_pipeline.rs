//! Image processing pipeline module
//!
//! This module turns multi-channel microscopy planes into 8-bit PNG images,
//! with separate modules for plane reading, sample normalization, channel
//! compositing, PNG writing, directory scanning and conversion orchestration.

pub mod source;
pub mod normalize;
pub mod compose;
pub mod raster;
pub mod scan;
pub mod conversions;
pub mod common;

pub use common::{
    ConversionError,
    Result,
};

pub use source::{
    ImageMetadata,
    PlaneIndex,
    PlaneReader,
    PlaneSource,
    RawPlane,
    TiffPlaneReader,
};

pub use normalize::{
    NormalizationStrategy,
    NormalizedChannel,
    SampleBuffer,
    decode,
    normalize,
    normalize_plane,
};

pub use compose::{
    ComposedImage,
    compose,
};

pub use raster::{
    PngCompression,
    ConversionConfig,
    ConversionConfigBuilder,
    RasterWriter,
    StandardPngWriter,
};

pub use scan::{
    DiscoveredFile,
    ScanIter,
    scan,
    scan_iter,
};

pub use conversions::{
    BatchConfig,
    BatchConfigBuilder,
    BatchConverter,
    BatchReport,
    CancelToken,
    FileOutcome,
    PipelineTimings,
    PlaneToPngPipeline,
};
