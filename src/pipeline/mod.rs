//! Per-file pipeline stages for document-to-Markdown conversion.
//!
//! Each submodule implements exactly one step. The dispatcher strings them
//! together for every [`crate::output::FileTask`]:
//!
//! ```text
//! discover ──▶ document | source ──▶ postprocess ──▶ write
//!  (walk)      (backend)  (fence)     (documents)     (atomic)
//! ```
//!
//! 1. [`discover`]    — walk the batch root and classify eligible files
//! 2. [`document`]    — render office / PDF / text files through a backend
//! 3. [`source`]      — wrap source code in a fenced block, verbatim
//! 4. [`postprocess`] — whitespace cleanup of backend output
//! 5. [`write`]       — derive the output path and write it atomically

pub mod discover;
pub mod document;
pub mod postprocess;
pub mod source;
pub mod write;
