use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Scan root does not exist or is not a directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    #[error("Failed to scan directory tree: {0}")]
    Scan(String),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Output path conflict: {0}")]
    OutputConflict(String),

    #[error("Failed to interpret image: {0}")]
    FormatError(String),

    #[error("Failed to encode PNG image: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Channel {channel} is {width}x{height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        channel: usize,
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    #[error("Image has no channels")]
    NoChannels,

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;
