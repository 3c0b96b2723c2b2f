//! Loaded-file bookkeeping for diagnostic rendering.

use std::path::{Path, PathBuf};

/// A loaded source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// The file's path.
    pub path: PathBuf,
    /// The file's content.
    pub content: String,
}

/// Collection of loaded files, used to render spans in diagnostics.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    /// Create an empty source map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the map, returning its id.
    pub fn add_file(&mut self, path: PathBuf, content: String) -> usize {
        self.files.push(SourceFile { path, content });
        self.files.len() - 1
    }

    /// All files, in load order.
    #[must_use]
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Look up a file by path.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.path == path)
    }
}
