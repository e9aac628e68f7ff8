//! Configuration types for batch document-to-Markdown conversion.
//!
//! All batch behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. The config is cheap to clone (trait objects are
//! behind `Arc`) and every worker receives its own clone.

use crate::error::Doc2MdError;
use crate::pipeline::document::DocumentBackend;
use crate::progress::BatchProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "converted-markdown";

/// Default external converter program.
pub const DEFAULT_CONVERTER: &str = "markitdown";

/// Environment variable consulted when no converter is configured.
pub const CONVERTER_ENV: &str = "DOC2MD_CONVERTER";

/// Configuration for a batch conversion.
///
/// # Example
/// ```rust
/// use edgequake_doc2md::{BatchConfig, OutputLayout};
///
/// let config = BatchConfig::builder()
///     .output_dir("out")
///     .workers(4)
///     .layout(OutputLayout::MirrorTree)
///     .build()
///     .unwrap();
/// assert_eq!(config.workers, 4);
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Directory receiving every `.md` file. Default: `converted-markdown`.
    pub output_dir: PathBuf,

    /// Number of workers the task list is split across. Default: 1.
    ///
    /// `0` and `1` both mean sequential processing in a single worker.
    pub workers: usize,

    /// How output paths are derived from input paths. Default: flatten.
    pub layout: OutputLayout,

    /// Treat source-code extensions as eligible. Default: true.
    pub include_source_code: bool,

    /// Follow symlinks during directory traversal. Default: false.
    pub follow_links: bool,

    /// Apply whitespace cleanup to document output. Default: false, so the
    /// backend's Markdown is written exactly as returned.
    pub normalize: bool,

    /// External converter program and leading arguments.
    /// If None, falls back to `DOC2MD_CONVERTER`, then `markitdown`.
    pub converter: Option<ConverterCommand>,

    /// Pre-constructed document backend. Takes precedence over `converter`.
    pub backend: Option<Arc<dyn DocumentBackend>>,

    /// Optional per-file progress events.
    pub progress_callback: Option<Arc<dyn BatchProgressCallback>>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            workers: 1,
            layout: OutputLayout::default(),
            include_source_code: true,
            follow_links: false,
            normalize: false,
            converter: None,
            backend: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("output_dir", &self.output_dir)
            .field("workers", &self.workers)
            .field("layout", &self.layout)
            .field("include_source_code", &self.include_source_code)
            .field("follow_links", &self.follow_links)
            .field("normalize", &self.normalize)
            .field("converter", &self.converter)
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.config.workers = n;
        self
    }

    pub fn layout(mut self, layout: OutputLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn include_source_code(mut self, v: bool) -> Self {
        self.config.include_source_code = v;
        self
    }

    pub fn follow_links(mut self, v: bool) -> Self {
        self.config.follow_links = v;
        self
    }

    pub fn normalize(mut self, v: bool) -> Self {
        self.config.normalize = v;
        self
    }

    pub fn converter(mut self, command: ConverterCommand) -> Self {
        self.config.converter = Some(command);
        self
    }

    pub fn backend(mut self, backend: Arc<dyn DocumentBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn BatchProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, Doc2MdError> {
        let c = &self.config;
        if c.output_dir.as_os_str().is_empty() {
            return Err(Doc2MdError::InvalidConfig(
                "Output directory must not be empty".into(),
            ));
        }
        if let Some(ref cmd) = c.converter {
            if cmd.program.trim().is_empty() {
                return Err(Doc2MdError::InvalidConfig(
                    "Converter program must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Supporting types ─────────────────────────────────────────────────────

/// How output paths are derived from input paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputLayout {
    /// `OUT/<stem>.md` regardless of where the input lives. (default)
    ///
    /// Inputs sharing a stem in different directories map to the same output
    /// path; the last one written wins.
    #[default]
    Flatten,
    /// `OUT/<dir relative to the batch root>/<stem>.md`.
    MirrorTree,
}

/// An external converter invocation: `program args… <input>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ConverterCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Parse a whitespace-separated command line such as `"markitdown --keep-data-uris"`.
    /// Returns None for a blank string.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self {
            program: program.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }
}

impl Default for ConverterCommand {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let c = BatchConfig::default();
        assert_eq!(c.output_dir, PathBuf::from("converted-markdown"));
        assert_eq!(c.workers, 1);
        assert_eq!(c.layout, OutputLayout::Flatten);
        assert!(c.include_source_code);
        assert!(!c.normalize);
        assert!(c.backend.is_none());
    }

    #[test]
    fn builder_rejects_empty_output_dir() {
        let err = BatchConfig::builder().output_dir("").build().unwrap_err();
        assert!(err.to_string().contains("Output directory"));
    }

    #[test]
    fn builder_rejects_blank_converter() {
        let err = BatchConfig::builder()
            .converter(ConverterCommand::new("  "))
            .build()
            .unwrap_err();
        assert!(matches!(err, Doc2MdError::InvalidConfig(_)));
    }

    #[test]
    fn builder_keeps_zero_workers_as_sequential() {
        let c = BatchConfig::builder().workers(0).build().unwrap();
        assert_eq!(c.workers, 0);
    }

    #[test]
    fn converter_parse_splits_args() {
        let cmd = ConverterCommand::parse("  markitdown --keep-data-uris ").unwrap();
        assert_eq!(cmd.program, "markitdown");
        assert_eq!(cmd.args, vec!["--keep-data-uris"]);
        assert!(ConverterCommand::parse("   ").is_none());
    }

    #[test]
    fn debug_hides_trait_objects() {
        let c = BatchConfig::builder()
            .backend(Arc::new(crate::pipeline::document::PlainTextBackend))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("plain-text"), "got: {dbg}");
    }
}
