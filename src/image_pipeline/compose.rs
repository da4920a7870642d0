//! Channel compositing module
//!
//! Assembles normalized channels into a grayscale or RGB raster.

mod compositor;
pub mod types;

pub use compositor::compose;
pub use types::ComposedImage;
