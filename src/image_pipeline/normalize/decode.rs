use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::normalize::types::SampleBuffer;
use crate::image_pipeline::source::types::RawPlane;

/// Reconstruct the unsigned integer samples of a raw plane.
///
/// Little-endian groups are accumulated from their last byte to their first,
/// big-endian groups from first to last. No scaling or clamping is applied.
pub fn decode(plane: &RawPlane) -> Result<SampleBuffer> {
    let bps = plane.bytes_per_sample;
    if !(1..=4).contains(&bps) {
        return Err(ConversionError::UnsupportedFormat(format!(
            "{bps} bytes per sample"
        )));
    }

    let pixels = plane.pixel_count();
    let needed = pixels
        .checked_mul(bps)
        .ok_or(ConversionError::InvalidDimensions(plane.width as usize, plane.height as usize))?;
    if plane.bytes.len() < needed {
        return Err(ConversionError::FormatError(format!(
            "plane of {}x{} with {} byte(s)/sample needs {} bytes, got {}",
            plane.width,
            plane.height,
            bps,
            needed,
            plane.bytes.len()
        )));
    }

    let bytes = &plane.bytes[..needed];
    let values: Vec<u32> = if bps == 1 {
        bytes.iter().map(|&b| b as u32).collect()
    } else if plane.little_endian {
        bytes
            .chunks_exact(bps)
            .map(|group| group.iter().rev().fold(0u32, |acc, &b| (acc << 8) | b as u32))
            .collect()
    } else {
        bytes
            .chunks_exact(bps)
            .map(|group| group.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
            .collect()
    };

    Ok(SampleBuffer {
        width: plane.width as usize,
        height: plane.height as usize,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(bytes: Vec<u8>, width: u32, height: u32, bps: usize, little_endian: bool) -> RawPlane {
        RawPlane {
            bytes,
            width,
            height,
            bytes_per_sample: bps,
            little_endian,
        }
    }

    #[test]
    fn test_two_byte_byte_order() {
        let le = decode(&plane(vec![0x34, 0x12], 1, 1, 2, true)).unwrap();
        assert_eq!(le.values, vec![0x1234]);

        let be = decode(&plane(vec![0x34, 0x12], 1, 1, 2, false)).unwrap();
        assert_eq!(be.values, vec![0x3412]);
    }

    #[test]
    fn test_wide_samples() {
        let le = decode(&plane(vec![0x01, 0x02, 0x03], 1, 1, 3, true)).unwrap();
        assert_eq!(le.values, vec![0x030201]);

        let be = decode(&plane(vec![0xFF, 0xFF, 0xFF, 0xFE], 1, 1, 4, false)).unwrap();
        assert_eq!(be.values, vec![0xFFFF_FFFE]);
    }

    #[test]
    fn test_single_byte_is_copied() {
        let buffer = decode(&plane(vec![0, 7, 128, 255], 2, 2, 1, false)).unwrap();
        assert_eq!(buffer.values, vec![0, 7, 128, 255]);
        assert_eq!((buffer.width, buffer.height), (2, 2));
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        let buffer = decode(&plane(vec![1, 0, 2, 0, 0xAA], 2, 1, 2, true)).unwrap();
        assert_eq!(buffer.values, vec![1, 2]);
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let result = decode(&plane(vec![1, 0, 2], 2, 1, 2, true));
        assert!(matches!(result, Err(ConversionError::FormatError(_))));
    }

    #[test]
    fn test_unsupported_sample_width() {
        let result = decode(&plane(vec![0; 5], 1, 1, 5, true));
        assert!(matches!(result, Err(ConversionError::UnsupportedFormat(_))));

        let result = decode(&plane(vec![], 1, 1, 0, true));
        assert!(matches!(result, Err(ConversionError::UnsupportedFormat(_))));
    }
}
