//! Error types for point cloud I/O.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for point cloud I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while reading or writing point cloud files.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// A header or data line could not be parsed.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number in the input.
        line: usize,
        /// Description of what was wrong.
        message: String,
    },

    /// The `DATA` line names an encoding other than ascii.
    #[error("unsupported PCD data encoding: {encoding} (only ascii is supported)")]
    UnsupportedData {
        /// The encoding named in the header.
        encoding: String,
    },

    /// The input does not start with a PCD header.
    #[error("missing PCD header")]
    MissingHeader,

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error raised while reading or writing a named file.
    #[error("{path}: {error}")]
    InFile {
        /// File being read or written.
        path: PathBuf,
        /// What went wrong.
        error: Box<IoError>,
    },
}

impl IoError {
    /// Create a `Parse` error for the given line.
    #[must_use]
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Attach the file `path` to `error`.
    #[must_use]
    pub fn in_file(path: &Path, error: Self) -> Self {
        Self::InFile {
            path: path.to_path_buf(),
            error: Box::new(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_line() {
        let err = IoError::parse(12, "expected 4 fields, found 3");
        assert_eq!(
            err.to_string(),
            "parse error on line 12: expected 4 fields, found 3"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: IoError = io.into();
        assert!(matches!(err, IoError::Io(_)));
    }

    #[test]
    fn file_context_prefixes_path() {
        let err = IoError::in_file(Path::new("scans/site.pcd"), IoError::parse(4, "bad row"));
        assert_eq!(
            err.to_string(),
            "scans/site.pcd: parse error on line 4: bad row"
        );
        let IoError::InFile { path, error } = err else {
            panic!("expected file context");
        };
        assert_eq!(path, PathBuf::from("scans/site.pcd"));
        assert!(matches!(*error, IoError::Parse { line: 4, .. }));
    }
}
