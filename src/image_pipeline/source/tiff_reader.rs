//! Plane source backed by multi-channel TIFF stacks.
//!
//! Two layouts are understood:
//! - one grayscale page per channel (the usual export of microscopy stacks),
//! - a single page carrying several interleaved samples per pixel (RGB or multiband).
//!
//! Sample values are handed to the core as little-endian byte buffers of the
//! page's native width (1, 2 or 4 bytes).

use std::io::Cursor;

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::source::reader::{PlaneReader, PlaneSource};
use crate::image_pipeline::source::types::{ImageMetadata, PlaneIndex, RawPlane};

/// Reader that opens TIFF containers with the `tiff` crate.
pub struct TiffPlaneReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelLayout {
    /// Channel `c` is page `c`
    Paged,
    /// Channel `c` is sample `c` of every pixel on page 0
    Interleaved { samples: usize },
}

struct TiffPlaneSource {
    decoder: Decoder<Cursor<Vec<u8>>>,
    metadata: ImageMetadata,
    layout: ChannelLayout,
    interleaved_page: Option<Vec<u8>>,
}

fn format_error(e: tiff::TiffError) -> ConversionError {
    ConversionError::FormatError(e.to_string())
}

fn sample_layout(color: ColorType) -> Result<(usize, u8)> {
    match color {
        ColorType::Gray(bits) => Ok((1, bits)),
        ColorType::GrayA(bits) => Ok((2, bits)),
        ColorType::RGB(bits) => Ok((3, bits)),
        ColorType::RGBA(bits) => Ok((4, bits)),
        ColorType::Multiband { bit_depth, num_samples } => Ok((num_samples as usize, bit_depth)),
        other => Err(ConversionError::UnsupportedFormat(format!(
            "TIFF color type {other:?}"
        ))),
    }
}

fn bytes_per_sample(bits: u8) -> Result<usize> {
    match bits {
        1..=32 => Ok((bits as usize).div_ceil(8)),
        _ => Err(ConversionError::UnsupportedFormat(format!(
            "{bits}-bit samples"
        ))),
    }
}

/// Flatten decoded samples into little-endian bytes.
fn to_le_bytes(decoded: DecodingResult) -> Result<Vec<u8>> {
    match decoded {
        DecodingResult::U8(values) => Ok(values),
        DecodingResult::U16(values) => Ok(values.iter().flat_map(|v| v.to_le_bytes()).collect()),
        DecodingResult::U32(values) => Ok(values.iter().flat_map(|v| v.to_le_bytes()).collect()),
        _ => Err(ConversionError::UnsupportedFormat(
            "only unsigned integer samples up to 32 bits are supported".to_string(),
        )),
    }
}

impl PlaneReader for TiffPlaneReader {
    fn open(&self, data: Vec<u8>) -> Result<Box<dyn PlaneSource>> {
        debug!("Opening TIFF container, {} bytes", data.len());

        let mut decoder = Decoder::new(Cursor::new(data)).map_err(format_error)?;
        let (width, height) = decoder.dimensions().map_err(format_error)?;
        let color = decoder.colortype().map_err(format_error)?;
        let (samples, bits) = sample_layout(color)?;
        let bytes_per_sample = bytes_per_sample(bits)?;

        let layout = if samples > 1 {
            ChannelLayout::Interleaved { samples }
        } else {
            ChannelLayout::Paged
        };

        let channel_count = match layout {
            ChannelLayout::Interleaved { samples } => samples,
            ChannelLayout::Paged => {
                let mut pages = 1;
                while decoder.more_images() {
                    decoder.next_image().map_err(format_error)?;
                    let dims = decoder.dimensions().map_err(format_error)?;
                    let page_color = decoder.colortype().map_err(format_error)?;
                    if dims != (width, height) || page_color != color {
                        // Thumbnails and other trailing pages are not channels.
                        debug!("Stopping at page {pages}: {dims:?} {page_color:?}");
                        break;
                    }
                    pages += 1;
                }
                decoder.seek_to_image(0).map_err(format_error)?;
                pages
            }
        };

        let metadata = ImageMetadata {
            width,
            height,
            bytes_per_sample,
            little_endian: true,
            channel_count,
        };

        debug!(
            "TIFF metadata: {}x{}, {} byte(s)/sample, {} channel(s), {:?}",
            width, height, bytes_per_sample, channel_count, layout
        );

        Ok(Box::new(TiffPlaneSource {
            decoder,
            metadata,
            layout,
            interleaved_page: None,
        }))
    }
}

impl TiffPlaneSource {
    fn read_page(&mut self, page: usize) -> Result<Vec<u8>> {
        self.decoder.seek_to_image(page).map_err(format_error)?;
        let decoded = self.decoder.read_image().map_err(format_error)?;
        to_le_bytes(decoded)
    }
}

impl PlaneSource for TiffPlaneSource {
    fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    fn read_plane(&mut self, index: PlaneIndex) -> Result<RawPlane> {
        if index.z != 0 || index.t != 0 {
            return Err(ConversionError::UnsupportedFormat(format!(
                "plane z={} t={}: only the first focal plane and timepoint are stored",
                index.z, index.t
            )));
        }
        if index.channel >= self.metadata.channel_count {
            return Err(ConversionError::FormatError(format!(
                "channel {} requested, image has {}",
                index.channel, self.metadata.channel_count
            )));
        }

        let bps = self.metadata.bytes_per_sample;
        let bytes = match self.layout {
            ChannelLayout::Paged => self.read_page(index.channel)?,
            ChannelLayout::Interleaved { samples } => {
                if self.interleaved_page.is_none() {
                    self.interleaved_page = Some(self.read_page(0)?);
                }
                let page = self.interleaved_page.as_deref().unwrap_or_default();
                page.chunks_exact(bps * samples)
                    .flat_map(|pixel| &pixel[index.channel * bps..(index.channel + 1) * bps])
                    .copied()
                    .collect()
            }
        };

        Ok(RawPlane {
            bytes,
            width: self.metadata.width,
            height: self.metadata.height,
            bytes_per_sample: bps,
            little_endian: self.metadata.little_endian,
        })
    }
}
