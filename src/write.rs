//! Artifact output with optional compression.
//!
//! Every emitted file honors the configured [`CompressKind`]: plain
//! writes, `.gz` via flate2, or `.br` via brotli. Servers that understand
//! pre-compressed assets serve the `.gz`/`.br` directly; nothing else in
//! the pipeline cares which kind was chosen.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::config::CompressKind;

/// Recreate the output directory from scratch so stale artifacts from the
/// previous build cannot leak into this one.
pub fn reset_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

/// Write one artifact, creating parent directories as needed. Compressed
/// kinds append their extension: `index.html` becomes `index.html.br`.
pub fn write_file(path: &Path, data: &[u8], compress: CompressKind) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    match compress {
        CompressKind::None => fs::write(path, data),
        CompressKind::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
            encoder.write_all(data)?;
            fs::write(compressed_path(path, "gz"), encoder.finish()?)
        }
        CompressKind::Brotli => {
            let mut buf = Vec::new();
            {
                let mut writer = brotli::CompressorWriter::new(&mut buf, 4096, 11, 22);
                writer.write_all(data)?;
            }
            fs::write(compressed_path(path, "br"), buf)
        }
    }
}

fn compressed_path(path: &Path, ext: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}
