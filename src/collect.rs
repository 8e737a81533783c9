//! Source file collection.
//!
//! The only stage that reads the filesystem. Walks the project's source
//! directories in sorted order (builds are deterministic regardless of
//! directory iteration order) and loads matching files into memory, so
//! that everything downstream is a pure transformation.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::types::SourceFile;

/// Collect files with one of `extensions` under `dirs` (relative to
/// `base`). Missing directories are skipped, not errors — a project
/// without a `components/` directory is fine. Stored paths are relative to
/// `base`: `pages/index.html`.
pub fn collect_files(
    base: &Path,
    dirs: &[&str],
    extensions: &[&str],
) -> io::Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for dir in dirs {
        let root = base.join(dir);
        if !root.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(io::Error::other)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let matches = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)));
            if !matches {
                continue;
            }
            let relative = entry.path().strip_prefix(base).unwrap_or(entry.path());
            files.push(SourceFile {
                path: relative.to_path_buf(),
                data: fs::read_to_string(entry.path())?,
            });
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, path: &str, data: &str) {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, data).unwrap();
    }

    #[test]
    fn collects_matching_extensions_only() {
        let dir = TempDir::new().unwrap();
        write(&dir, "pages/index.html", "<body></body>");
        write(&dir, "pages/notes.txt", "not a page");
        let files = collect_files(dir.path(), &["pages"], &["html"]).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path.to_str(), Some("pages/index.html"));
        assert_eq!(files[0].data, "<body></body>");
    }

    #[test]
    fn walks_nested_directories() {
        let dir = TempDir::new().unwrap();
        write(&dir, "pages/index.html", "a");
        write(&dir, "pages/notes/index.html", "b");
        let files = collect_files(dir.path(), &["pages"], &["html"]).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn collects_across_multiple_roots_in_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, "pages/inline.css", "a{}");
        write(&dir, "styles/main.css", "b{}");
        let files = collect_files(dir.path(), &["pages", "styles"], &["css"]).unwrap();
        let paths: Vec<&str> = files.iter().filter_map(|f| f.path.to_str()).collect();
        assert_eq!(paths, vec!["pages/inline.css", "styles/main.css"]);
    }

    #[test]
    fn missing_directory_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let files = collect_files(dir.path(), &["components"], &["html"]).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn files_come_back_sorted() {
        let dir = TempDir::new().unwrap();
        write(&dir, "pages/b.html", "");
        write(&dir, "pages/a.html", "");
        write(&dir, "pages/c.html", "");
        let files = collect_files(dir.path(), &["pages"], &["html"]).unwrap();
        let paths: Vec<&str> = files.iter().filter_map(|f| f.path.to_str()).collect();
        assert_eq!(paths, vec!["pages/a.html", "pages/b.html", "pages/c.html"]);
    }
}
