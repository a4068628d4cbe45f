//! Summary persistence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Write generated text to `<dir>/<identifier>_summary.md`.
///
/// Creates the directory when absent and overwrites any previous summary for
/// the same identifier.
pub fn write_summary(dir: &Path, identifier: &str, content: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{identifier}_summary.md"));
    fs::write(&path, content)?;
    Ok(path)
}
