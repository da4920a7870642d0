//! Directory scanning module
//!
//! Finds every file under a root whose name ends with a given extension.

mod scanner;
pub mod types;

pub use scanner::{ScanIter, scan, scan_iter};
pub use types::DiscoveredFile;
