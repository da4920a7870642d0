use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::compose::ComposedImage;
use crate::image_pipeline::conversions::batch::{BatchConfig, BatchConverter};
use crate::image_pipeline::conversions::plane_to_png::PlaneToPngPipeline;
use crate::image_pipeline::normalize::NormalizationStrategy;
use crate::image_pipeline::raster::{ConversionConfig, PngCompression, RasterWriter};
use crate::image_pipeline::scan::DiscoveredFile;
use crate::image_pipeline::source::{ImageMetadata, PlaneIndex, PlaneReader, PlaneSource, RawPlane};

/// Serves 16-bit little-endian planes whose samples are `base + channel * 100 + i`.
#[derive(Clone)]
struct MockReader {
    should_fail: bool,
    metadata: ImageMetadata,
    requested: Arc<Mutex<Vec<PlaneIndex>>>,
}

impl MockReader {
    fn new(width: u32, height: u32, channel_count: usize) -> Self {
        Self {
            should_fail: false,
            metadata: ImageMetadata {
                width,
                height,
                bytes_per_sample: 2,
                little_endian: true,
                channel_count,
            },
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

struct MockSource {
    metadata: ImageMetadata,
    requested: Arc<Mutex<Vec<PlaneIndex>>>,
}

impl PlaneReader for MockReader {
    fn open(&self, _data: Vec<u8>) -> Result<Box<dyn PlaneSource>> {
        if self.should_fail {
            return Err(ConversionError::FormatError("Mock format error".to_string()));
        }
        Ok(Box::new(MockSource {
            metadata: self.metadata.clone(),
            requested: self.requested.clone(),
        }))
    }
}

impl PlaneSource for MockSource {
    fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    fn read_plane(&mut self, index: PlaneIndex) -> Result<RawPlane> {
        self.requested.lock().unwrap().push(index);
        let pixels = (self.metadata.width * self.metadata.height) as u16;
        let bytes = (0..pixels)
            .map(|i| 1000 + index.channel as u16 * 100 + i)
            .flat_map(|v| v.to_le_bytes())
            .collect();
        Ok(RawPlane {
            bytes,
            width: self.metadata.width,
            height: self.metadata.height,
            bytes_per_sample: self.metadata.bytes_per_sample,
            little_endian: self.metadata.little_endian,
        })
    }
}

#[derive(Clone)]
struct MockWriter {
    should_fail: bool,
    written_data: Arc<Mutex<Vec<ComposedImage>>>,
}

impl MockWriter {
    fn new() -> Self {
        Self {
            should_fail: false,
            written_data: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl RasterWriter for MockWriter {
    fn write_png(&self, image: &ComposedImage, output: &mut dyn Write, _config: &ConversionConfig) -> Result<()> {
        if self.should_fail {
            return Err(ConversionError::EncodeError("Mock encode error".to_string()));
        }
        output.write_all(b"png")?;
        self.written_data.lock().unwrap().push(image.clone());
        Ok(())
    }
}

#[test]
fn test_config_builder() {
    let config = ConversionConfig::builder()
        .compression(PngCompression::High)
        .normalization(NormalizationStrategy::MaxOnly)
        .validate_dimensions(false)
        .max_dimension(Some(10000))
        .build();

    assert_eq!(config.compression, PngCompression::High);
    assert_eq!(config.normalization, NormalizationStrategy::MaxOnly);
    assert!(!config.validate_dimensions);
    assert_eq!(config.max_dimension, Some(10000));

    let defaults = ConversionConfig::builder().build();
    assert_eq!(defaults.compression, PngCompression::Balanced);
    assert_eq!(defaults.normalization, NormalizationStrategy::MinMax);
}

#[test]
fn test_three_channels_become_rgb() {
    let reader = MockReader::new(2, 2, 5);
    let requested = reader.requested.clone();
    let writer = MockWriter::new();
    let written = writer.written_data.clone();

    let pipeline = PlaneToPngPipeline::with_custom(reader, writer, ConversionConfig::default());
    let mut output = Cursor::new(Vec::new());
    pipeline.convert(Vec::new(), &mut output).unwrap();

    let requested: Vec<usize> = requested.lock().unwrap().iter().map(|p| p.channel).collect();
    assert_eq!(requested, vec![0, 1, 2]);

    let written = written.lock().unwrap();
    assert_eq!(written.len(), 1);
    assert!(written[0].is_rgb());
    // Each channel is stretched on its own: 1000..1003, 1100..1103, 1200..1203
    assert_eq!(
        written[0].to_interleaved(),
        vec![0, 0, 0, 85, 85, 85, 170, 170, 170, 255, 255, 255]
    );
    assert_eq!(output.into_inner(), b"png");
}

#[test]
fn test_fewer_channels_read_only_the_first_plane() {
    let reader = MockReader::new(3, 1, 2);
    let requested = reader.requested.clone();
    let writer = MockWriter::new();
    let written = writer.written_data.clone();

    let pipeline = PlaneToPngPipeline::with_custom(reader, writer, ConversionConfig::default());
    pipeline.convert(Vec::new(), &mut Vec::new()).unwrap();

    assert_eq!(requested.lock().unwrap().as_slice(), &[PlaneIndex::channel(0)]);
    let written = written.lock().unwrap();
    assert!(!written[0].is_rgb());
    assert_eq!(written[0].to_interleaved(), vec![0, 127, 255]);
}

#[test]
fn test_reader_failure() {
    let mut reader = MockReader::new(2, 2, 1);
    reader.should_fail = true;
    let writer = MockWriter::new();

    let pipeline = PlaneToPngPipeline::with_custom(reader, writer, ConversionConfig::default());
    let result = pipeline.convert(Vec::new(), &mut Vec::new());

    assert!(matches!(result, Err(ConversionError::FormatError(_))));
}

#[test]
fn test_writer_failure() {
    let reader = MockReader::new(2, 2, 1);
    let mut writer = MockWriter::new();
    writer.should_fail = true;

    let pipeline = PlaneToPngPipeline::with_custom(reader, writer, ConversionConfig::default());
    let result = pipeline.convert(Vec::new(), &mut Vec::new());

    assert!(matches!(result, Err(ConversionError::EncodeError(_))));
}

#[test]
fn test_zero_channels() {
    let reader = MockReader::new(2, 2, 0);
    let pipeline = PlaneToPngPipeline::with_custom(reader, MockWriter::new(), ConversionConfig::default());

    let result = pipeline.convert(Vec::new(), &mut Vec::new());
    assert!(matches!(result, Err(ConversionError::NoChannels)));
}

#[test]
fn test_dimension_validation_failure() {
    let reader = MockReader::new(60, 2, 1);
    let config = ConversionConfig::builder()
        .validate_dimensions(true)
        .max_dimension(Some(50))
        .build();
    let pipeline = PlaneToPngPipeline::with_custom(reader, MockWriter::new(), config);

    let result = pipeline.convert(Vec::new(), &mut Vec::new());
    assert!(matches!(result, Err(ConversionError::InvalidDimensions(60, 2))));
}

#[test]
fn test_zero_sized_image_rejected() {
    let reader = MockReader::new(0, 4, 1);
    let pipeline = PlaneToPngPipeline::with_custom(reader, MockWriter::new(), ConversionConfig::default());

    let result = pipeline.convert(Vec::new(), &mut Vec::new());
    assert!(matches!(result, Err(ConversionError::InvalidDimensions(0, 4))));
}

#[test]
fn test_dimension_validation_disabled() {
    let reader = MockReader::new(60, 2, 1);
    let config = ConversionConfig::builder()
        .validate_dimensions(false)
        .max_dimension(Some(50))
        .build();
    let pipeline = PlaneToPngPipeline::with_custom(reader, MockWriter::new(), config);

    assert!(pipeline.convert(Vec::new(), &mut Vec::new()).is_ok());
}

#[test]
fn test_set_config() {
    let mut pipeline = PlaneToPngPipeline::with_custom(
        MockReader::new(1, 1, 1),
        MockWriter::new(),
        ConversionConfig::default(),
    );
    pipeline.set_config(ConversionConfig::builder().compression(PngCompression::None).build());
    assert_eq!(pipeline.config().compression, PngCompression::None);
}

#[test]
fn test_batch_isolates_failures_and_honours_cancellation() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.ext");
    std::fs::write(&good, b"anything").unwrap();

    let files = vec![
        DiscoveredFile {
            path: dir.path().join("missing.ext"),
            parent_directory: dir.path().to_path_buf(),
            stem: "missing".to_string(),
            relative_parent: Default::default(),
        },
        DiscoveredFile {
            path: good.clone(),
            parent_directory: dir.path().to_path_buf(),
            stem: "good".to_string(),
            relative_parent: Default::default(),
        },
    ];

    let pipeline = PlaneToPngPipeline::with_custom(
        MockReader::new(2, 1, 1),
        MockWriter::new(),
        ConversionConfig::default(),
    );
    let batch = BatchConverter::new(pipeline, BatchConfig::builder().workers(Some(2)).build());

    let report = batch.convert_files(&files).unwrap();
    assert_eq!(report.converted, vec![(good.clone(), dir.path().join("good.png"))]);
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0].1, ConversionError::InputReadError(_)));
    assert_eq!(std::fs::read(dir.path().join("good.png")).unwrap(), b"png");
    assert!(!report.all_converted());

    batch.cancel_token().cancel();
    let report = batch.convert_files(&files).unwrap();
    assert_eq!(report.cancelled.len(), 2);
    assert_eq!(report.attempted(), 0);
    assert_eq!(report.total(), 2);
}

#[test]
fn test_batch_refuses_colliding_destinations() {
    let dir = tempfile::tempdir().unwrap();
    let discovered = |name: &str, stem: &str| {
        let path = dir.path().join(name);
        std::fs::write(&path, b"anything").unwrap();
        DiscoveredFile {
            path,
            parent_directory: dir.path().to_path_buf(),
            stem: stem.to_string(),
            relative_parent: Default::default(),
        }
    };
    let files = vec![
        discovered("x.tif", "x"),
        discovered("x.TIF", "x"),
        discovered("already.png", "already"),
        discovered("y.tif", "y"),
    ];

    let writer = MockWriter::new();
    let written = writer.written_data.clone();
    let pipeline = PlaneToPngPipeline::with_custom(
        MockReader::new(2, 1, 1),
        writer,
        ConversionConfig::default(),
    );
    let batch = BatchConverter::new(pipeline, BatchConfig::builder().workers(Some(4)).build());

    let report = batch.convert_files(&files).unwrap();

    assert_eq!(
        report.converted,
        vec![(dir.path().join("y.tif"), dir.path().join("y.png"))]
    );
    assert_eq!(report.failed.len(), 3);
    assert!(report
        .failed
        .iter()
        .all(|(_, error)| matches!(error, ConversionError::OutputConflict(_))));
    assert!(!dir.path().join("x.png").exists());
    assert_eq!(std::fs::read(dir.path().join("already.png")).unwrap(), b"anything");
    assert_eq!(written.lock().unwrap().len(), 1);
}
