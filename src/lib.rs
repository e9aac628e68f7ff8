//! # edgequake-doc2md
//!
//! Batch-convert office documents, PDFs, plain text and source code to
//! Markdown.
//!
//! Document formats are rendered by an external converter (the `markitdown`
//! program by default); this crate never parses `.docx`, `.xlsx`, `.pptx` or
//! `.pdf` internals itself. Source files are wrapped verbatim in a fenced code
//! block tagged with the language for their extension.
//!
//! ## Pipeline Overview
//!
//! ```text
//! root dir
//!  │
//!  ├─ 1. Discover   walk the tree, keep files whose extension is in the catalog
//!  ├─ 2. Partition  split the task list into N contiguous chunks (sizes differ by ≤ 1)
//!  ├─ 3. Dispatch   one spawn_blocking worker per non-empty chunk
//!  │     ├─ document → backend (markitdown / plain text) → optional cleanup
//!  │     └─ source   → `# name` + fenced block
//!  ├─ 4. Write      OUT/<stem>.md, atomically
//!  └─ 5. Aggregate  join all workers, sum (succeeded, attempted) per slot
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_doc2md::{convert_directory, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder()
//!         .output_dir("converted-markdown")
//!         .workers(4)
//!         .build()?;
//!     let summary = convert_directory("docs/", &config).await?;
//!     eprintln!("{}/{} converted", summary.succeeded, summary.attempted);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2md`, `excel2md`, `pdf2md`, `pptx2md` and `word2md` binaries |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-doc2md = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use catalog::{classify, supported_extensions, Category, DocumentKind};
pub use config::{BatchConfig, BatchConfigBuilder, ConverterCommand, OutputLayout};
pub use convert::{convert_directory, convert_directory_sync, convert_file, render_markdown};
pub use dispatch::{dispatch, partition, WorkerContext};
pub use error::{Doc2MdError, FileError};
pub use output::{BatchSummary, FileFailure, FileTask, WorkerResult};
pub use pipeline::discover::discover;
pub use pipeline::document::{CommandBackend, DocumentBackend, PlainTextBackend};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
