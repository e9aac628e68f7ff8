//! Output paths and atomic Markdown writes.
//!
//! The output name is always the input's stem plus `.md`. Under
//! [`OutputLayout::Flatten`] every file lands directly in the output
//! directory, so `a/report.txt` and `b/report.pdf` both become
//! `OUT/report.md` and whichever worker writes last wins.
//! [`find_collisions`] lets the caller warn about this before dispatch.

use crate::config::OutputLayout;
use crate::error::FileError;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Derive the Markdown path for `input`.
///
/// `root` is the batch root; it is only consulted for
/// [`OutputLayout::MirrorTree`], and inputs outside it fall back to flatten.
pub fn output_path_for(
    input: &Path,
    root: Option<&Path>,
    output_dir: &Path,
    layout: OutputLayout,
) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "untitled".into());
    let mut file_name = stem;
    file_name.push(".md");

    let subdir = match (layout, root) {
        (OutputLayout::MirrorTree, Some(root)) => input
            .parent()
            .and_then(|parent| parent.strip_prefix(root).ok())
            .map(Path::to_path_buf),
        _ => None,
    };

    match subdir {
        Some(rel) => output_dir.join(rel).join(file_name),
        None => output_dir.join(file_name),
    }
}

/// Write `markdown` to `path` atomically.
///
/// The content goes to a uniquely named temp file in the destination
/// directory which is then persisted over `path`, so two workers racing on
/// the same output never interleave bytes.
pub fn write_markdown(path: &Path, markdown: &str) -> Result<(), FileError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| io_err(path, &e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".doc2md-")
        .suffix(".md.tmp")
        .tempfile_in(parent)
        .map_err(|e| io_err(path, &e))?;
    tmp.write_all(markdown.as_bytes())
        .map_err(|e| io_err(path, &e))?;
    tmp.persist(path).map_err(|e| io_err(path, &e.error))?;
    Ok(())
}

/// Group inputs by output path and return only the groups with more than one
/// input. Sorted by output path.
pub fn find_collisions<'a, I>(
    inputs: I,
    root: Option<&Path>,
    output_dir: &Path,
    layout: OutputLayout,
) -> Vec<(PathBuf, Vec<PathBuf>)>
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut by_output: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for input in inputs {
        by_output
            .entry(output_path_for(input, root, output_dir, layout))
            .or_default()
            .push(input.to_path_buf());
    }
    by_output
        .into_iter()
        .filter(|(_, inputs)| inputs.len() > 1)
        .collect()
}

// Write failures are reported against the output path; NotFound here means a
// missing directory, not a missing input.
fn io_err(path: &Path, err: &std::io::Error) -> FileError {
    FileError::Io {
        path: path.to_path_buf(),
        detail: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn flatten_uses_stem_only() {
        let out = output_path_for(
            Path::new("/data/in/x/report.docx"),
            Some(Path::new("/data/in")),
            Path::new("OUT"),
            OutputLayout::Flatten,
        );
        assert_eq!(out, PathBuf::from("OUT/report.md"));
    }

    #[test]
    fn mirror_tree_keeps_relative_dir() {
        let out = output_path_for(
            Path::new("/data/in/x/y/report.docx"),
            Some(Path::new("/data/in")),
            Path::new("OUT"),
            OutputLayout::MirrorTree,
        );
        assert_eq!(out, PathBuf::from("OUT/x/y/report.md"));
    }

    #[test]
    fn mirror_tree_outside_root_falls_back_to_flatten() {
        let out = output_path_for(
            Path::new("/elsewhere/report.pdf"),
            Some(Path::new("/data/in")),
            Path::new("OUT"),
            OutputLayout::MirrorTree,
        );
        assert_eq!(out, PathBuf::from("OUT/report.md"));
    }

    #[test]
    fn only_last_extension_is_replaced() {
        let out = output_path_for(
            Path::new("archive.tar.txt"),
            None,
            Path::new("OUT"),
            OutputLayout::Flatten,
        );
        assert_eq!(out, PathBuf::from("OUT/archive.tar.md"));
    }

    // Known collision: same stem in different directories maps to one output.
    // Which input wins depends on worker timing, so no winner is asserted.
    #[test]
    fn same_stem_collides_when_flattened() {
        let a = PathBuf::from("in/x/report.docx");
        let b = PathBuf::from("in/y/report.pdf");
        let c = PathBuf::from("in/y/other.pdf");
        let collisions = find_collisions(
            [a.as_path(), b.as_path(), c.as_path()],
            Some(Path::new("in")),
            Path::new("OUT"),
            OutputLayout::Flatten,
        );
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].0, PathBuf::from("OUT/report.md"));
        assert_eq!(collisions[0].1, vec![a, b]);
    }

    #[test]
    fn mirror_tree_separates_same_stem() {
        let collisions = find_collisions(
            [Path::new("in/x/report.docx"), Path::new("in/y/report.pdf")],
            Some(Path::new("in")),
            Path::new("OUT"),
            OutputLayout::MirrorTree,
        );
        assert!(collisions.is_empty());
    }

    #[test]
    fn write_creates_parents_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested/deeper/doc.md");
        write_markdown(&target, "first\n").unwrap();
        write_markdown(&target, "second\n").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "second\n");

        let leftovers: Vec<_> = std::fs::read_dir(target.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind");
    }
}
