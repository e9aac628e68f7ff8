//! Static extension tables: which files are eligible and how each is routed.
//!
//! Two tables live here, both keyed by lowercased extension without the dot:
//!
//! * **documents** — office, PDF and plain-text formats. These go through a
//!   [`crate::pipeline::document::DocumentBackend`].
//! * **source code** — files wrapped verbatim in a fenced code block. The value
//!   is the fence language tag; an empty tag is valid and produces an
//!   unlabeled fence.
//!
//! Both maps are built once on first use and never mutated.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Document families handled by the document backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Excel,
    Word,
    PowerPoint,
    Pdf,
    Text,
}

impl DocumentKind {
    /// Human label used in log lines ("Processing Excel file: …").
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Excel => "Excel",
            DocumentKind::Word => "Word",
            DocumentKind::PowerPoint => "PowerPoint",
            DocumentKind::Pdf => "PDF",
            DocumentKind::Text => "Text",
        }
    }

    /// Extensions (without dot) belonging to this kind.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            DocumentKind::Excel => &["xlsx", "xls"],
            DocumentKind::Word => &["docx", "doc"],
            DocumentKind::PowerPoint => &["pptx", "ppt"],
            DocumentKind::Pdf => &["pdf"],
            DocumentKind::Text => &["txt"],
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolved conversion route for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Rendered by the document backend.
    Document(DocumentKind),
    /// Wrapped in a fenced block tagged with `language` (may be empty).
    SourceCode { language: &'static str },
}

impl Category {
    pub fn is_source_code(&self) -> bool {
        matches!(self, Category::SourceCode { .. })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Document(kind) => write!(f, "{kind}"),
            Category::SourceCode { language: "" } => f.write_str("Source code"),
            Category::SourceCode { language } => write!(f, "Source code ({language})"),
        }
    }
}

// Order matters for `supported_extensions()`.
const DOCUMENT_TABLE: &[(&str, DocumentKind)] = &[
    ("xlsx", DocumentKind::Excel),
    ("xls", DocumentKind::Excel),
    ("docx", DocumentKind::Word),
    ("doc", DocumentKind::Word),
    ("pptx", DocumentKind::PowerPoint),
    ("ppt", DocumentKind::PowerPoint),
    ("pdf", DocumentKind::Pdf),
    ("txt", DocumentKind::Text),
];

const SOURCE_TABLE: &[(&str, &str)] = &[
    ("abap", "abap"),
    ("abp", ""),
    ("asm", "asm"),
    ("bas", "vb"),
    ("bash", "bash"),
    ("bat", "batch"),
    ("c", "c"),
    ("cc", "cpp"),
    ("cfg", "ini"),
    ("clj", "clojure"),
    ("cls", "vb"),
    ("cmake", "cmake"),
    ("cob", "cobol"),
    ("cpp", "cpp"),
    ("cs", "csharp"),
    ("css", "css"),
    ("cxx", "cpp"),
    ("dart", "dart"),
    ("erl", "erlang"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("f90", "fortran"),
    ("fs", "fsharp"),
    ("go", "go"),
    ("gradle", "groovy"),
    ("graphql", "graphql"),
    ("groovy", "groovy"),
    ("h", "c"),
    ("hpp", "cpp"),
    ("hs", "haskell"),
    ("html", "html"),
    ("ini", "ini"),
    ("java", "java"),
    ("jl", "julia"),
    ("js", "javascript"),
    ("json", "json"),
    ("jsx", "jsx"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("less", "less"),
    ("lua", "lua"),
    ("m", "objectivec"),
    ("mk", "makefile"),
    ("nim", "nim"),
    ("php", "php"),
    ("pl", "perl"),
    ("proto", "protobuf"),
    ("ps1", "powershell"),
    ("py", "python"),
    ("r", "r"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("scala", "scala"),
    ("scss", "scss"),
    ("sh", "bash"),
    ("sql", "sql"),
    ("svelte", "svelte"),
    ("swift", "swift"),
    ("tf", "hcl"),
    ("toml", "toml"),
    ("ts", "typescript"),
    ("tsx", "tsx"),
    ("vb", "vbnet"),
    ("vue", "vue"),
    ("xml", "xml"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("zig", "zig"),
    ("zsh", "bash"),
];

static DOCUMENTS: Lazy<HashMap<&'static str, DocumentKind>> =
    Lazy::new(|| DOCUMENT_TABLE.iter().copied().collect());

static SOURCE_LANGUAGES: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| SOURCE_TABLE.iter().copied().collect());

/// Lowercased extension of `path`, without the dot.
fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Resolve the conversion route for `path` from its extension.
///
/// Documents take precedence over source code; neither table shares a key
/// today, but the lookup order keeps that true if one is added.
pub fn classify(path: &Path) -> Option<Category> {
    let ext = extension_of(path)?;
    if let Some(kind) = DOCUMENTS.get(ext.as_str()) {
        return Some(Category::Document(*kind));
    }
    SOURCE_LANGUAGES
        .get(ext.as_str())
        .map(|&language| Category::SourceCode { language })
}

/// Every supported extension, dot-prefixed: documents first in table order,
/// then source code alphabetically. Source code is omitted when
/// `include_source_code` is false.
pub fn supported_extensions(include_source_code: bool) -> Vec<String> {
    let mut out: Vec<String> = DOCUMENT_TABLE
        .iter()
        .map(|(ext, _)| format!(".{ext}"))
        .collect();
    if include_source_code {
        out.extend(SOURCE_TABLE.iter().map(|(ext, _)| format!(".{ext}")));
    }
    out
}

/// `".xlsx (Excel), .xls (Excel), …"` for the startup banner.
pub fn describe_document_types() -> String {
    DOCUMENT_TABLE
        .iter()
        .map(|(ext, kind)| format!(".{ext} ({})", kind.label()))
        .collect::<Vec<_>>()
        .join(", ")
}
