use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::compose::types::ComposedImage;
use crate::image_pipeline::raster::types::ConversionConfig;

pub trait RasterWriter {
    fn write_png(&self, image: &ComposedImage, output: &mut dyn Write, config: &ConversionConfig) -> Result<()>;
}
