use std::io::Write;
use tracing::debug;
use crate::image_pipeline::common::error::{Result, ConversionError};
use crate::image_pipeline::compose::types::ComposedImage;
use crate::image_pipeline::raster::types::{ConversionConfig, PngCompression};
use crate::image_pipeline::raster::writer::RasterWriter;

pub struct StandardPngWriter;

impl RasterWriter for StandardPngWriter {
    fn write_png(&self, image: &ComposedImage, output: &mut dyn Write, config: &ConversionConfig) -> Result<()> {
        let width = image.width();
        let height = image.height();
        debug!("Encoding PNG image: {}x{} ({})", width, height, if image.is_rgb() { "RGB" } else { "gray" });

        let (width, height) = match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => return Err(ConversionError::InvalidDimensions(width, height)),
        };

        let compression = match config.compression {
            PngCompression::None => png::Compression::NoCompression,
            PngCompression::Fast => png::Compression::Fast,
            PngCompression::Balanced => png::Compression::Balanced,
            PngCompression::High => png::Compression::High,
        };

        let color = if image.is_rgb() {
            png::ColorType::Rgb
        } else {
            png::ColorType::Grayscale
        };

        let mut buffer = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buffer, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_compression(compression);

            let mut writer = encoder
                .write_header()
                .map_err(|e| ConversionError::EncodeError(e.to_string()))?;
            writer
                .write_image_data(&image.to_interleaved())
                .map_err(|e| ConversionError::EncodeError(e.to_string()))?;
            writer
                .finish()
                .map_err(|e| ConversionError::EncodeError(e.to_string()))?;
        }

        output.write_all(&buffer)?;

        debug!("PNG encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}
