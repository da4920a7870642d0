//! Plane source module
//!
//! This module defines the boundary to container readers: metadata about a
//! multi-channel image and per-plane raw byte buffers.

mod reader;
mod tiff_reader;
pub mod types;

pub use reader::{PlaneReader, PlaneSource};
pub use tiff_reader::TiffPlaneReader;
pub use types::{ImageMetadata, PlaneIndex, RawPlane};
