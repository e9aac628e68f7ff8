//! Document backends: turn an office / PDF / text file into Markdown text.
//!
//! The crate does not parse any document format itself. A
//! [`DocumentBackend`] takes a path and returns the Markdown rendering; the
//! default [`CommandBackend`] shells out to the `markitdown` program and reads
//! its stdout. Plain `.txt` files skip the external program entirely via
//! [`PlainTextBackend`].
//!
//! Backends are called from blocking worker threads, so the trait is
//! synchronous.

use crate::catalog::DocumentKind;
use crate::config::{BatchConfig, ConverterCommand, CONVERTER_ENV};
use crate::error::FileError;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tracing::debug;

/// Longest stderr excerpt kept in a conversion error.
const MAX_STDERR_CHARS: usize = 400;

/// Converts one document to Markdown.
pub trait DocumentBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Render `path` as Markdown.
    fn convert(&self, path: &Path) -> Result<String, FileError>;
}

/// Runs `program args… <path>` and returns its stdout.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    command: ConverterCommand,
}

impl CommandBackend {
    pub fn new(command: ConverterCommand) -> Self {
        Self { command }
    }
}

impl Default for CommandBackend {
    fn default() -> Self {
        Self::new(ConverterCommand::default())
    }
}

impl DocumentBackend for CommandBackend {
    fn name(&self) -> &str {
        &self.command.program
    }

    fn convert(&self, path: &Path) -> Result<String, FileError> {
        debug!("Running {} on {}", self.command.program, path.display());

        let output = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(path)
            .output()
            .map_err(|e| FileError::Conversion {
                path: path.to_path_buf(),
                detail: if e.kind() == std::io::ErrorKind::NotFound {
                    format!(
                        "converter '{}' not found; install it or set {CONVERTER_ENV}",
                        self.command.program
                    )
                } else {
                    format!("failed to run '{}': {e}", self.command.program)
                },
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FileError::Conversion {
                path: path.to_path_buf(),
                detail: format!("{} ({})", output.status, truncate(stderr.trim())),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| FileError::Conversion {
            path: path.to_path_buf(),
            detail: format!("'{}' produced non-UTF-8 output", self.command.program),
        })
    }
}

/// Returns a UTF-8 text file's contents unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextBackend;

impl DocumentBackend for PlainTextBackend {
    fn name(&self) -> &str {
        "plain-text"
    }

    fn convert(&self, path: &Path) -> Result<String, FileError> {
        std::fs::read_to_string(path).map_err(|e| FileError::from_io(path, &e))
    }
}

/// Resolve the document backend, from most-specific to least-specific:
///
/// 1. **Pre-built backend** (`config.backend`), used as-is.
/// 2. **Configured command** (`config.converter`).
/// 3. **`DOC2MD_CONVERTER`** environment variable, split on whitespace.
/// 4. **`markitdown`** on `PATH`.
pub fn resolve_backend(config: &BatchConfig) -> Arc<dyn DocumentBackend> {
    if let Some(ref backend) = config.backend {
        return Arc::clone(backend);
    }

    if let Some(ref command) = config.converter {
        return Arc::new(CommandBackend::new(command.clone()));
    }

    if let Some(command) = std::env::var(CONVERTER_ENV)
        .ok()
        .and_then(|v| ConverterCommand::parse(&v))
    {
        return Arc::new(CommandBackend::new(command));
    }

    Arc::new(CommandBackend::default())
}

/// Pick the backend for one document kind. Text never needs the external
/// program unless the caller supplied an explicit backend.
pub fn backend_for(
    kind: DocumentKind,
    config: &BatchConfig,
    resolved: &Arc<dyn DocumentBackend>,
) -> Arc<dyn DocumentBackend> {
    if kind == DocumentKind::Text && config.backend.is_none() {
        Arc::new(PlainTextBackend)
    } else {
        Arc::clone(resolved)
    }
}

fn truncate(s: &str) -> String {
    if s.chars().count() > MAX_STDERR_CHARS {
        let cut: String = s.chars().take(MAX_STDERR_CHARS - 1).collect();
        format!("{cut}\u{2026}")
    } else {
        s.to_string()
    }
}
