use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::source::types::{ImageMetadata, PlaneIndex, RawPlane};

pub trait PlaneReader {
    fn open(&self, data: Vec<u8>) -> Result<Box<dyn PlaneSource>>;
}

pub trait PlaneSource {
    fn metadata(&self) -> &ImageMetadata;
    fn read_plane(&mut self, index: PlaneIndex) -> Result<RawPlane>;
}
