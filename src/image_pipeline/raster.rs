//! PNG writing module
//!
//! This module provides PNG encoding of composed rasters and the per-file
//! conversion configuration.

mod writer;
mod standard_png_writer;
pub mod types;

pub use writer::RasterWriter;
pub use standard_png_writer::StandardPngWriter;
pub use types::{ConversionConfig, ConversionConfigBuilder, PngCompression};
