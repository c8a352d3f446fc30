//! Whole-file log loading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Error type for log loading failures.
#[derive(Debug)]
pub enum LoadError {
    /// Log file does not exist.
    NotFound(PathBuf),
    /// Any other I/O failure.
    Io { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::NotFound(path) => write!(f, "Log file not found: {}", path.display()),
            LoadError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::NotFound(_) => None,
            LoadError::Io { source, .. } => Some(source),
        }
    }
}

/// Reads the whole file and splits it into lines.
///
/// Invalid UTF-8 is replaced rather than rejected; stray bytes only spoil the
/// lines they appear on.
pub fn read_lines(path: &Path) -> Result<Vec<String>, LoadError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let lines: Vec<String> = String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect();

    debug!("Read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}
