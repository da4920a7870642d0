use std::path::{Path, PathBuf};

/// A file found under the scan root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Directory containing the file
    pub parent_directory: PathBuf,
    /// File name without its extension
    pub stem: String,
    /// Parent directory relative to the scan root (empty for files directly under it)
    pub relative_parent: PathBuf,
}

impl DiscoveredFile {
    /// PNG path for this file, beside it or mirrored under `output_root`.
    pub fn png_path(&self, output_root: Option<&Path>) -> PathBuf {
        let file_name = format!("{}.png", self.stem);
        match output_root {
            Some(root) => root.join(&self.relative_parent).join(file_name),
            None => self.parent_directory.join(file_name),
        }
    }
}
