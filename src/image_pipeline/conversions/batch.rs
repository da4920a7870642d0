//! Batch conversion of every matching file under a directory tree.
//!
//! Files are converted independently on a bounded rayon pool. A failure is
//! recorded against its file and never stops the rest of the batch; only an
//! unusable scan root or traversal error aborts the run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{error, info, instrument, warn};

use crate::image_pipeline::{
    common::error::{ConversionError, Result},
    conversions::plane_to_png::PlaneToPngPipeline,
    raster::RasterWriter,
    scan::{DiscoveredFile, scan},
    source::PlaneReader,
};

/// Settings of a batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// File name suffix to convert, matched case-insensitively
    pub extension: String,
    /// Root of a mirrored output tree; `None` writes beside each input
    pub output_dir: Option<PathBuf>,
    /// Worker threads; `None` uses the available parallelism
    pub workers: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extension: ".tif".to_string(),
            output_dir: None,
            workers: None,
        }
    }
}

impl BatchConfig {
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::default()
    }
}

/// Builder for BatchConfig
#[derive(Default)]
pub struct BatchConfigBuilder {
    extension: Option<String>,
    output_dir: Option<Option<PathBuf>>,
    workers: Option<Option<usize>>,
}

impl BatchConfigBuilder {
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = Some(dir);
        self
    }

    pub fn workers(mut self, workers: Option<usize>) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn build(self) -> BatchConfig {
        let default = BatchConfig::default();
        BatchConfig {
            extension: self.extension.unwrap_or(default.extension),
            output_dir: self.output_dir.unwrap_or(default.output_dir),
            workers: self.workers.unwrap_or(default.workers),
        }
    }
}

/// Shared flag asking workers not to start further files.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What happened to one discovered file
#[derive(Debug)]
pub enum FileOutcome {
    Converted { source: PathBuf, destination: PathBuf },
    Failed { source: PathBuf, error: ConversionError },
    Cancelled { source: PathBuf },
}

/// Outcome of every file of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<(PathBuf, PathBuf)>,
    pub failed: Vec<(PathBuf, ConversionError)>,
    pub cancelled: Vec<PathBuf>,
}

impl BatchReport {
    fn push(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Converted { source, destination } => {
                self.converted.push((source, destination))
            }
            FileOutcome::Failed { source, error } => self.failed.push((source, error)),
            FileOutcome::Cancelled { source } => self.cancelled.push(source),
        }
    }

    pub fn attempted(&self) -> usize {
        self.converted.len() + self.failed.len()
    }

    pub fn total(&self) -> usize {
        self.attempted() + self.cancelled.len()
    }

    /// True when every file was converted.
    pub fn all_converted(&self) -> bool {
        self.failed.is_empty() && self.cancelled.is_empty()
    }
}

pub struct BatchConverter<R: PlaneReader, W: RasterWriter> {
    pipeline: PlaneToPngPipeline<R, W>,
    config: BatchConfig,
    cancel: CancelToken,
}

impl<R, W> BatchConverter<R, W>
where
    R: PlaneReader + Sync,
    W: RasterWriter + Sync,
{
    pub fn new(pipeline: PlaneToPngPipeline<R, W>, config: BatchConfig) -> Self {
        Self {
            pipeline,
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Handle that stops the batch from starting further files.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Scan `root` and convert every match.
    #[instrument(skip(self, root), fields(root = %root.as_ref().display()))]
    pub fn run<P: AsRef<Path>>(&self, root: P) -> Result<BatchReport> {
        let files = scan(root, &self.config.extension)?;
        info!(
            "Found {} file(s) matching {}",
            files.len(),
            self.config.extension
        );
        self.convert_files(&files)
    }

    /// Convert already discovered files on the worker pool.
    pub fn convert_files(&self, files: &[DiscoveredFile]) -> Result<BatchReport> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(workers) = self.config.workers {
            builder = builder.num_threads(workers);
        }
        let pool = builder
            .build()
            .map_err(|e| ConversionError::WorkerPool(e.to_string()))?;

        info!("Converting on {} worker(s)", pool.current_num_threads());

        let output_root = self.config.output_dir.as_deref();
        let destinations: Vec<PathBuf> = files.iter().map(|f| f.png_path(output_root)).collect();
        let mut claims: HashMap<&Path, usize> = HashMap::new();
        for destination in &destinations {
            *claims.entry(destination.as_path()).or_default() += 1;
        }

        let outcomes: Vec<FileOutcome> = pool.install(|| {
            files
                .par_iter()
                .zip(&destinations)
                .map(|(file, destination)| {
                    let shared = claims.get(destination.as_path()).copied().unwrap_or(0) > 1;
                    self.convert_one(file, destination, shared)
                })
                .collect()
        });

        let mut report = BatchReport::default();
        for outcome in outcomes {
            report.push(outcome);
        }

        info!(
            converted = report.converted.len(),
            failed = report.failed.len(),
            cancelled = report.cancelled.len(),
            "Batch complete"
        );
        Ok(report)
    }

    /// Convert one file unless its destination is also claimed by another
    /// input (`shared`) or is the input itself.
    fn convert_one(&self, file: &DiscoveredFile, destination: &Path, shared: bool) -> FileOutcome {
        let source = file.path.clone();
        if self.cancel.is_cancelled() {
            warn!("Skipping {}: batch cancelled", source.display());
            return FileOutcome::Cancelled { source };
        }

        let destination = destination.to_path_buf();
        let result = if shared {
            Err(ConversionError::OutputConflict(format!(
                "{} is the destination of more than one input",
                destination.display()
            )))
        } else if destination == source {
            Err(ConversionError::OutputConflict(format!(
                "{} would overwrite its own input",
                destination.display()
            )))
        } else {
            self.convert_to(&source, &destination)
        };

        match result {
            Ok(()) => {
                info!("Converted {} -> {}", source.display(), destination.display());
                FileOutcome::Converted { source, destination }
            }
            Err(error) => {
                error!("Failed to convert {}: {}", source.display(), error);
                FileOutcome::Failed { source, error }
            }
        }
    }

    fn convert_to(&self, source: &Path, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConversionError::OutputWriteError(format!("{}: {}", parent.display(), e))
            })?;
        }
        self.pipeline.convert_file(source, destination)
    }
}
