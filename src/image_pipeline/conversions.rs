//! Pipeline conversions module
//!
//! This module contains orchestration logic: single-file conversion and
//! batch conversion of a directory tree.

mod batch;
mod plane_to_png;
mod timing;

#[cfg(test)]
mod tests;

pub use batch::{BatchConfig, BatchConfigBuilder, BatchConverter, BatchReport, CancelToken, FileOutcome};
pub use plane_to_png::PlaneToPngPipeline;
pub use timing::{PipelineTimings, StepTiming, Timer};
