//! `excel2md`: convert a single Excel workbook (.xlsx, .xls) to Markdown.
//!
//! `excel2md <input-file> [output-file]`; without an output file the Markdown
//! is printed to stdout.

use edgequake_doc2md::cli::run_single_format;
use edgequake_doc2md::DocumentKind;
use std::process::ExitCode;

fn main() -> ExitCode {
    run_single_format(DocumentKind::Excel, "excel2md")
}
