//! Sample decoding and intensity normalization module
//!
//! Turns raw plane bytes into unsigned samples and stretches them onto the
//! 8-bit display range.

mod decode;
mod stretch;
pub mod types;

pub use decode::decode;
pub use stretch::{normalize, normalize_plane};
pub use types::{NormalizationStrategy, NormalizedChannel, SampleBuffer};
