//! Plane source data types

/// What a plane source reports about an image before any plane is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMetadata {
    /// Width of every plane in pixels
    pub width: u32,
    /// Height of every plane in pixels
    pub height: u32,
    /// Bytes per sample (1 to 4)
    pub bytes_per_sample: usize,
    /// Byte order of multi-byte samples
    pub little_endian: bool,
    /// Number of channels available at z=0, t=0
    pub channel_count: usize,
}

/// Position of a plane inside a multi-dimensional acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneIndex {
    pub channel: usize,
    pub z: usize,
    pub t: usize,
}

impl PlaneIndex {
    /// Plane of `channel` at the first focal plane and timepoint.
    pub fn channel(channel: usize) -> Self {
        Self { channel, z: 0, t: 0 }
    }
}

/// Raw samples of one channel for one 2D plane
#[derive(Debug, Clone)]
pub struct RawPlane {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub bytes_per_sample: usize,
    pub little_endian: bool,
}

impl RawPlane {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
