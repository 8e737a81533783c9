//! Shared types passed between pipeline stages.

use std::path::PathBuf;

/// An in-memory source or output file.
///
/// Paths are relative to the project root on the way in (`pages/index.html`)
/// and to the output root on the way out (`index.html`, `bundle.css`).
/// Collection reads these once; every later stage is a pure transformation
/// over the data.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub data: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, data: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }
}
