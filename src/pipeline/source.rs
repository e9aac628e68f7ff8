//! Source-code wrapping: read a file and embed it in a fenced code block.
//!
//! No parsing happens. The output is a level-1 heading with the file name,
//! a blank line, and the file's contents verbatim between fences tagged
//! with the catalog's language for the extension:
//!
//! ````text
//! # hello.py
//!
//! ```python
//! print(1)
//! ```
//! ````

use crate::error::FileError;
use std::path::Path;

/// Read `path` and wrap it. Non-UTF-8 files fail with [`FileError::Io`].
pub fn wrap_file(path: &Path, language: &str) -> Result<String, FileError> {
    let content = std::fs::read_to_string(path).map_err(|e| FileError::from_io(path, &e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(wrap_source(&name, language, &content))
}

/// Render the Markdown for one source file. `content` is not modified.
pub fn wrap_source(name: &str, language: &str, content: &str) -> String {
    let fence = fence_for(content);
    let mut out = String::with_capacity(content.len() + name.len() + 2 * fence.len() + 16);
    out.push_str("# ");
    out.push_str(name);
    out.push_str("\n\n");
    out.push_str(&fence);
    out.push_str(language);
    out.push('\n');
    out.push_str(content);
    out.push('\n');
    out.push_str(&fence);
    out.push('\n');
    out
}

/// Three backticks, or one more than the longest backtick run in `content`
/// so an embedded fence cannot close the block early.
fn fence_for(content: &str) -> String {
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}
