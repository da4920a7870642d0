use tracing::{info, instrument};
use std::io::Write;
use std::path::Path;

use crate::image_pipeline::{
    common::error::{ConversionError, Result},
    compose::{ComposedImage, compose},
    conversions::timing::{PipelineTimings, Timer},
    normalize::normalize_plane,
    raster::{ConversionConfig, RasterWriter, StandardPngWriter},
    source::{PlaneIndex, PlaneReader, TiffPlaneReader},
};

/// Channel count from which the first three channels are composed as RGB.
const RGB_CHANNEL_COUNT: usize = 3;

pub struct PlaneToPngPipeline<R: PlaneReader, W: RasterWriter> {
    reader: R,
    writer: W,
    config: ConversionConfig,
}

impl PlaneToPngPipeline<TiffPlaneReader, StandardPngWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            reader: TiffPlaneReader,
            writer: StandardPngWriter,
            config,
        }
    }
}

impl<R: PlaneReader, W: RasterWriter> PlaneToPngPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                return Err(ConversionError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    /// Read the planes of one source file and compose them into an 8-bit raster.
    fn render(&self, input_data: Vec<u8>, timings: &mut PipelineTimings) -> Result<ComposedImage> {
        let timer = Timer::start("open_source");
        let mut source = {
            let _span = tracing::info_span!("open_source").entered();
            self.reader.open(input_data)?
        };
        timings.record(timer);

        let meta = source.metadata().clone();
        info!(
            width = meta.width,
            height = meta.height,
            bytes_per_sample = meta.bytes_per_sample,
            little_endian = meta.little_endian,
            channels = meta.channel_count,
            "Source opened"
        );

        {
            let _span = tracing::info_span!("validate_dimensions",
                width = meta.width,
                height = meta.height
            ).entered();
            self.validate_dimensions(meta.width as usize, meta.height as usize)?;
        }

        let wanted = match meta.channel_count {
            0 => return Err(ConversionError::NoChannels),
            n if n >= RGB_CHANNEL_COUNT => RGB_CHANNEL_COUNT,
            _ => 1,
        };

        let mut channels = Vec::with_capacity(wanted);
        for channel in 0..wanted {
            let _span = tracing::info_span!("read_plane", channel).entered();

            let timer = Timer::start("read_plane");
            let plane = source.read_plane(PlaneIndex::channel(channel))?;
            timings.record(timer);

            let timer = Timer::start("normalize");
            channels.push(normalize_plane(&plane, self.config.normalization)?);
            timings.record(timer);
        }

        let timer = Timer::start("compose");
        let image = {
            let _span = tracing::info_span!("compose").entered();
            compose(channels)?
        };
        timings.record(timer);

        Ok(image)
    }

    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: Vec<u8>, output: &mut dyn Write) -> Result<()> {
        let mut timings = PipelineTimings::new();
        self.convert_timed(input_data, output, &mut timings)?;
        timings.log_summary("convert");
        Ok(())
    }

    fn convert_timed(
        &self,
        input_data: Vec<u8>,
        output: &mut dyn Write,
        timings: &mut PipelineTimings,
    ) -> Result<()> {
        let image = self.render(input_data, timings)?;

        let timer = Timer::start("encode_png");
        {
            let _span = tracing::info_span!("encode_png").entered();
            self.writer.write_png(&image, output, &self.config)?;
        }
        timings.record(timer);

        info!(
            width = image.width(),
            height = image.height(),
            rgb = image.is_rgb(),
            "Conversion complete"
        );
        Ok(())
    }

    /// Convert `input_path` into a PNG at `output_path`.
    ///
    /// The output file is only created once the image has been encoded.
    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let mut timings = PipelineTimings::new();

        let timer = Timer::start("read_input_file");
        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                ConversionError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };
        timings.record(timer);

        let mut encoded = Vec::new();
        self.convert_timed(input_data, &mut encoded, &mut timings)?;

        let timer = Timer::start("write_output_file");
        {
            let _span = tracing::info_span!("write_output_file").entered();
            std::fs::write(output_path, &encoded).map_err(|e| {
                ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?;
        }
        timings.record(timer);

        timings.log_summary(&input_path.display().to_string());
        Ok(())
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConversionConfig) {
        self.config = config;
    }
}
