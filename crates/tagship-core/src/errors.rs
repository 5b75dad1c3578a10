use std::io;
use std::path::{Path, PathBuf};

/// Canonical result type for tagship code
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Common error type for release and publish operations
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Package {0} not found")]
    PackageNotFound(String),

    #[error("invalid target version: {0}")]
    InvalidVersion(String),

    #[error(
        "Package version from tag \"{tag_version}\" mismatches with current version \"{current_version}\""
    )]
    VersionMismatch {
        tag_version: String,
        current_version: String,
    },

    #[error("Invalid release tag '{0}': expected <name>@<version>")]
    InvalidTag(String),

    #[error("Invalid manifest {}: {reason}", .path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("`{command}` failed with {status}{}", format_stderr(.stderr))]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("{0} not found in PATH")]
    CommandNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("release is {0}, not confirmed")]
    NotConfirmed(String),
}

impl ReleaseError {
    pub(crate) fn invalid_manifest(path: &Path, reason: impl Into<String>) -> Self {
        Self::InvalidManifest {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Helper to create an IO error with file path context
pub fn io_error_with_path<P: AsRef<Path>>(error: io::Error, path: P) -> io::Error {
    io::Error::new(
        error.kind(),
        format!("{}: {}", path.as_ref().display(), error),
    )
}
