//! Post-processing: deterministic cleanup of backend-produced Markdown.
//!
//! Document backends are external programs and are not consistent about
//! whitespace: `.docx` text often arrives with CRLF line endings, `.xlsx`
//! sheets with trailing spaces after every cell row, UTF-8 text files with a
//! BOM, and PDF extraction with long runs of blank lines between pages.
//!
//! Cleanup is opt-in (`BatchConfig::normalize`). The rules only touch
//! whitespace and invisible characters, but trimming trailing whitespace also
//! drops Markdown hard line breaks and alters whitespace inside fenced blocks,
//! so converter output is written verbatim unless asked otherwise. Source-code
//! output is never cleaned.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so every later rule can split on `\n`,
//! and the final-newline pass runs last.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all post-processing rules to raw backend output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip invisible Unicode (BOM, zero-width spaces, soft hyphens)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 4+ consecutive newlines down to 3
/// 5. Ensure the file ends with exactly one newline
pub fn clean_markdown(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 5: Ensure file ends with single newline ─────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(
            trim_trailing_whitespace("| a | b |   \nworld\t"),
            "| a | b |\nworld"
        );
    }

    #[test]
    fn test_collapse_blank_lines() {
        let input = "page one\n\n\n\n\n\npage two";
        assert_eq!(collapse_blank_lines(input), "page one\n\n\npage two");
    }

    #[test]
    fn test_ensure_final_newline() {
        assert_eq!(ensure_final_newline("hello"), "hello\n");
        assert_eq!(ensure_final_newline("hello\n\n\n"), "hello\n");
        assert_eq!(ensure_final_newline(""), "\n");
    }

    #[test]
    fn test_remove_bom_and_zero_width() {
        let input = "\u{FEFF}hello\u{200B}world\u{00AD}!";
        assert_eq!(remove_invisible_chars(input), "helloworld!");
    }

    #[test]
    fn test_clean_markdown_full_pipeline() {
        let input = "\u{FEFF}## Sheet1\r\n\r\n| A | B |  \r\n| --- | --- |\r\n\r\n\r\n\r\n\r\n\r\nend   ";
        let result = clean_markdown(input);
        assert_eq!(result, "## Sheet1\n\n| A | B |\n| --- | --- |\n\n\nend\n");
    }

    #[test]
    fn test_clean_markdown_keeps_content() {
        let input = "# Title\n\nSome *text* with `code`.\n";
        assert_eq!(clean_markdown(input), input);
    }
}
