use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use zvi_to_png_rs::image_pipeline::{
    BatchConfig, BatchConverter, ConversionConfig, NormalizationStrategy, PlaneToPngPipeline,
    PngCompression,
};
use zvi_to_png_rs::logger;

use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "zvi_to_png_rs",
    about = "Convert multi-channel microscopy images to 8-bit grayscale or RGB PNG files."
)]
struct Cli {
    /// Directory to scan recursively, or a single file to convert
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// File name suffix to convert (case-insensitive)
    #[arg(long, short, default_value = ".tif")]
    extension: String,

    /// Write PNGs under this directory, mirroring the input tree
    #[arg(long, short)]
    output_dir: Option<PathBuf>,

    /// Number of worker threads (defaults to available parallelism)
    #[arg(long, short)]
    workers: Option<usize>,

    /// Intensity normalization applied to samples wider than 8 bits
    #[arg(long, value_enum, default_value = "min-max")]
    normalization: Normalization,

    /// PNG compression level
    #[arg(long, value_enum, default_value = "balanced")]
    compression: Compression,

    /// Reject images wider or taller than this many pixels
    #[arg(long)]
    max_dimension: Option<usize>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Normalization {
    /// Stretch the observed [min, max] range onto [0, 255]
    MinMax,
    /// Scale by the maximum only, keeping zero as black
    MaxOnly,
}

impl From<Normalization> for NormalizationStrategy {
    fn from(value: Normalization) -> Self {
        match value {
            Normalization::MinMax => NormalizationStrategy::MinMax,
            Normalization::MaxOnly => NormalizationStrategy::MaxOnly,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Compression {
    None,
    Fast,
    Balanced,
    High,
}

impl From<Compression> for PngCompression {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => PngCompression::None,
            Compression::Fast => PngCompression::Fast,
            Compression::Balanced => PngCompression::Balanced,
            Compression::High => PngCompression::High,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(&cli.log_level);

    if cli.workers == Some(0) {
        bail!("--workers must be at least 1");
    }

    let config = ConversionConfig::builder()
        .compression(cli.compression.into())
        .normalization(cli.normalization.into())
        .max_dimension(cli.max_dimension)
        .build();
    info!("Compression: {:?}", config.compression);
    info!("Normalization: {:?}", config.normalization);

    let pipeline = PlaneToPngPipeline::new(config);

    if cli.input.is_file() {
        let stem = cli
            .input
            .file_stem()
            .context("input file has no name")?
            .to_string_lossy()
            .into_owned();
        let output = match &cli.output_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("create {}", dir.display()))?;
                dir.join(format!("{stem}.png"))
            }
            None => cli.input.with_file_name(format!("{stem}.png")),
        };
        match pipeline.convert_file(&cli.input, &output) {
            Ok(()) => info!("Converted {} -> {}", cli.input.display(), output.display()),
            Err(e) => error!("Conversion failed: {}", e),
        }
        return Ok(());
    }

    let batch_config = BatchConfig::builder()
        .extension(cli.extension.clone())
        .output_dir(cli.output_dir.clone())
        .workers(cli.workers)
        .build();
    let batch = BatchConverter::new(pipeline, batch_config);

    let report = batch
        .run(&cli.input)
        .with_context(|| format!("batch conversion of {}", cli.input.display()))?;

    for (source, reason) in &report.failed {
        warn!("Not converted: {}: {}", source.display(), reason);
    }
    info!(
        "{} converted, {} failed, {} cancelled",
        report.converted.len(),
        report.failed.len(),
        report.cancelled.len()
    );

    Ok(())
}
