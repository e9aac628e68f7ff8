//! Error types for the edgequake-doc2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Doc2MdError`] — **Fatal** for the request: the batch root does not
//!   exist, a single input file fails validation, or the output directory
//!   cannot be created. Returned as `Err(Doc2MdError)` from the top-level
//!   `convert*` functions.
//!
//! * [`FileError`] — **Non-fatal**: one file in a batch failed (backend
//!   crashed, unreadable source file) but every other file is fine. Stored in
//!   [`crate::output::FileFailure`] and counted against the batch instead of
//!   aborting it.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-doc2md library.
///
/// Per-file failures inside a batch use [`FileError`] and are stored in
/// [`crate::output::WorkerResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Doc2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Batch root was not found.
    #[error("Directory not found: '{path}'")]
    DirectoryNotFound { path: PathBuf },

    /// Batch root exists but is not a directory.
    #[error("Path is not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    /// Single input file was not found.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Single input exists but is not a regular file.
    #[error("Path is not a file: '{path}'")]
    NotAFile { path: PathBuf },

    /// Extension is not in the supported table.
    #[error("Unsupported file type: '{extension}'\nSupported extensions: {supported}")]
    UnsupportedExtension { extension: String, supported: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create the output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The single requested file failed to convert.
    #[error(transparent)]
    Conversion(#[from] FileError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single file.
///
/// Carries the offending path and a rendered message so it can be cloned
/// into per-worker results and serialised into the JSON summary.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileError {
    /// File disappeared between enumeration and conversion.
    #[error("{path}: file not found")]
    NotFound { path: PathBuf },

    /// Extension has no conversion route.
    #[error("{path}: unsupported file type")]
    UnsupportedType { path: PathBuf },

    /// The document backend failed or produced unusable output.
    #[error("{path}: conversion failed: {detail}")]
    Conversion { path: PathBuf, detail: String },

    /// Reading the input or writing the Markdown failed.
    #[error("{path}: I/O error: {detail}")]
    Io { path: PathBuf, detail: String },
}

impl FileError {
    /// Map an [`std::io::Error`] to the closest per-file variant.
    pub fn from_io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => FileError::NotFound { path },
            _ => FileError::Io {
                path,
                detail: err.to_string(),
            },
        }
    }

    /// The file this error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            FileError::NotFound { path }
            | FileError::UnsupportedType { path }
            | FileError::Conversion { path, .. }
            | FileError::Io { path, .. } => path,
        }
    }
}
