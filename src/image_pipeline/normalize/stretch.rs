//! Contrast stretch of wide samples onto 8 bits.
//!
//! The range is always taken from the plane itself, so the same content in two
//! files with different extremes maps to different output values.

use rayon::prelude::*;
use tracing::debug;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::normalize::decode::decode;
use crate::image_pipeline::normalize::types::{
    NormalizationStrategy, NormalizedChannel, SampleBuffer,
};
use crate::image_pipeline::source::types::RawPlane;

/// Planes with at least this many pixels run both passes on the rayon pool.
const PARALLEL_PIXEL_THRESHOLD: usize = 1 << 20;

const OUTPUT_MAX: u64 = 255;

fn min_max(values: &[u32]) -> Option<(u32, u32)> {
    if values.is_empty() {
        return None;
    }
    if values.len() < PARALLEL_PIXEL_THRESHOLD {
        let (min, max) = values
            .iter()
            .fold((u32::MAX, u32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        return Some((min, max));
    }
    // Partial extremes per chunk, merged before any output value is computed.
    let (min, max) = values
        .par_iter()
        .fold(
            || (u32::MAX, u32::MIN),
            |(lo, hi), &v| (lo.min(v), hi.max(v)),
        )
        .reduce(
            || (u32::MAX, u32::MIN),
            |(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)),
        );
    Some((min, max))
}

fn map_values<F>(values: &[u32], map: F) -> Vec<u8>
where
    F: Fn(u32) -> u8 + Sync + Send,
{
    if values.len() < PARALLEL_PIXEL_THRESHOLD {
        values.iter().map(|&v| map(v)).collect()
    } else {
        values.par_iter().map(|&v| map(v)).collect()
    }
}

/// Stretch a sample buffer onto 0..=255.
///
/// A plane whose black point and white point coincide comes out all zeros.
pub fn normalize(buffer: SampleBuffer, strategy: NormalizationStrategy) -> NormalizedChannel {
    let SampleBuffer { width, height, values } = buffer;

    let Some((min_val, max_val)) = min_max(&values) else {
        return NormalizedChannel { width, height, values: Vec::new() };
    };
    debug!("Sample range: min={} max={} ({:?})", min_val, max_val, strategy);

    let black = match strategy {
        NormalizationStrategy::MinMax => min_val as u64,
        NormalizationStrategy::MaxOnly => 0,
    };
    let range = max_val as u64 - black;

    if range < 1 {
        debug!("Degenerate plane {}x{}: all samples equal {}", width, height, max_val);
        return NormalizedChannel {
            width,
            height,
            values: vec![0; values.len()],
        };
    }

    let values = map_values(&values, |v| {
        let scaled = (v as u64).saturating_sub(black) * OUTPUT_MAX / range;
        scaled.min(OUTPUT_MAX) as u8
    });

    NormalizedChannel { width, height, values }
}

/// Decode a raw plane and bring it to 8 bits.
///
/// Single-byte planes are already display-ready and pass through unchanged.
pub fn normalize_plane(plane: &RawPlane, strategy: NormalizationStrategy) -> Result<NormalizedChannel> {
    let samples = decode(plane)?;
    if plane.bytes_per_sample == 1 {
        return Ok(NormalizedChannel {
            width: samples.width,
            height: samples.height,
            values: samples.values.into_iter().map(|v| v as u8).collect(),
        });
    }
    Ok(normalize(samples, strategy))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(values: Vec<u32>) -> SampleBuffer {
        SampleBuffer {
            width: values.len(),
            height: 1,
            values,
        }
    }

    #[test]
    fn test_full_contrast_for_distinct_values() {
        let out = normalize(buffer(vec![1000, 1500, 3000, 2000]), NormalizationStrategy::MinMax);
        assert_eq!(out.values.iter().min(), Some(&0));
        assert_eq!(out.values.iter().max(), Some(&255));
        // (1500 - 1000) * 255 / 2000 = 63.75 truncated
        assert_eq!(out.values, vec![0, 63, 255, 127]);
    }

    #[test]
    fn test_uniform_plane_is_all_zero() {
        let out = normalize(buffer(vec![4242; 6]), NormalizationStrategy::MinMax);
        assert_eq!(out.values, vec![0; 6]);

        let out = normalize(buffer(vec![0; 3]), NormalizationStrategy::MaxOnly);
        assert_eq!(out.values, vec![0; 3]);
    }

    #[test]
    fn test_sixteen_bit_little_endian_plane() {
        let plane = RawPlane {
            bytes: [0u16, 100, 200, 65535]
                .iter()
                .flat_map(|v| v.to_le_bytes())
                .collect(),
            width: 2,
            height: 2,
            bytes_per_sample: 2,
            little_endian: true,
        };
        let out = normalize_plane(&plane, NormalizationStrategy::MinMax).unwrap();
        assert_eq!(out.values, vec![0, 0, 0, 255]);
        assert_eq!((out.width, out.height), (2, 2));
    }

    #[test]
    fn test_max_only_keeps_zero_as_black_point() {
        let values = vec![100, 150, 200];
        let min_max = normalize(buffer(values.clone()), NormalizationStrategy::MinMax);
        let max_only = normalize(buffer(values), NormalizationStrategy::MaxOnly);

        assert_eq!(min_max.values, vec![0, 127, 255]);
        assert_eq!(max_only.values, vec![127, 191, 255]);
    }

    #[test]
    fn test_thirty_two_bit_range_does_not_overflow() {
        let out = normalize(
            buffer(vec![0, u32::MAX / 2, u32::MAX]),
            NormalizationStrategy::MinMax,
        );
        assert_eq!(out.values, vec![0, 127, 255]);
    }

    #[test]
    fn test_eight_bit_plane_passes_through() {
        let plane = RawPlane {
            bytes: vec![3, 9, 27, 81],
            width: 4,
            height: 1,
            bytes_per_sample: 1,
            little_endian: true,
        };
        let out = normalize_plane(&plane, NormalizationStrategy::MinMax).unwrap();
        assert_eq!(out.values, vec![3, 9, 27, 81]);
    }

    #[test]
    fn test_parallel_path_matches_sequential() {
        let len = PARALLEL_PIXEL_THRESHOLD + 17;
        let values: Vec<u32> = (0..len as u64)
            .map(|i| 500 + ((i * 7919) % 40_000) as u32)
            .collect();

        let parallel = normalize(buffer(values.clone()), NormalizationStrategy::MinMax);

        let (min, max) = (500u64, 500u64 + 39_999);
        let expected: Vec<u8> = values
            .iter()
            .map(|&v| ((v as u64 - min) * 255 / (max - min)) as u8)
            .collect();
        assert_eq!(parallel.values, expected);
        assert_eq!(parallel.values.iter().max(), Some(&255));
    }
}
