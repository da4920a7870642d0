use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::scan::types::DiscoveredFile;

/// Lazy depth-first listing of matching files.
///
/// Directories are entered as soon as they are encountered. The sequence is
/// finite and cannot be restarted; the first traversal error ends it.
pub struct ScanIter {
    root: PathBuf,
    suffix: String,
    entries: walkdir::IntoIter,
    failed: bool,
}

/// Start a scan of `root` for names ending in `extension` (case-insensitive).
pub fn scan_iter<P: AsRef<Path>>(root: P, extension: &str) -> Result<ScanIter> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(ConversionError::InvalidRoot(root.to_path_buf()));
    }
    let root = std::path::absolute(root)?;

    Ok(ScanIter {
        entries: WalkDir::new(&root).follow_links(false).into_iter(),
        root,
        suffix: extension.to_lowercase(),
        failed: false,
    })
}

/// Collect every matching file under `root`.
///
/// Any unreadable directory fails the whole scan; no partial list is returned.
#[instrument(skip(root), fields(root = %root.as_ref().display()))]
pub fn scan<P: AsRef<Path>>(root: P, extension: &str) -> Result<Vec<DiscoveredFile>> {
    let files = scan_iter(root, extension)?.collect::<Result<Vec<_>>>()?;
    debug!("Found {} file(s) matching {}", files.len(), extension);
    Ok(files)
}

impl ScanIter {
    fn discovered(&self, path: PathBuf) -> Option<DiscoveredFile> {
        let parent_directory = path.parent()?.to_path_buf();
        let stem = path.file_stem()?.to_string_lossy().into_owned();
        let relative_parent = parent_directory
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Some(DiscoveredFile {
            path,
            parent_directory,
            stem,
            relative_parent,
        })
    }
}

impl Iterator for ScanIter {
    type Item = Result<DiscoveredFile>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(ConversionError::Scan(e.to_string())));
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if !name.ends_with(&self.suffix) {
                continue;
            }
            if let Some(file) = self.discovered(entry.into_path()) {
                return Some(Ok(file));
            }
        }
    }
}
