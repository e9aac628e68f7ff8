//! Enumeration: collect every eligible file under a batch root.

use crate::catalog::{self, Category};
use crate::output::FileTask;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Recursively collect regular files under `root` whose extension is in the
/// catalog.
///
/// Entries are visited sorted by file name at every level, so the same tree
/// always produces the same task order (and the same chunk assignment).
/// Symlinks to files are always included; `follow_links` only controls
/// descending into symlinked directories. Entries that cannot be read are
/// logged and skipped.
pub fn discover(root: &Path, include_source_code: bool, follow_links: bool) -> Vec<FileTask> {
    let mut tasks = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(follow_links)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        // A link to a regular file is eligible even when links to
        // directories are not followed.
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }
        let Some(category) = catalog::classify(entry.path()) else {
            continue;
        };
        if !include_source_code && category.is_source_code() {
            continue;
        }
        tasks.push(FileTask::new(entry.into_path(), category));
    }

    debug!("Discovered {} eligible files under {}", tasks.len(), root.display());
    tasks
}

/// Per-category counts for the discovery log line, in first-seen order.
pub fn category_counts(tasks: &[FileTask]) -> Vec<(Category, usize)> {
    let mut counts: Vec<(Category, usize)> = Vec::new();
    for task in tasks {
        match counts.iter_mut().find(|(c, _)| *c == task.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((task.category, 1)),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DocumentKind;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, "x").unwrap();
    }

    fn names(tasks: &[FileTask], root: &Path) -> Vec<String> {
        tasks
            .iter()
            .map(|t| {
                t.path
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn finds_supported_files_recursively_in_sorted_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "b/slides.PPTX");
        touch(root, "a/report.docx");
        touch(root, "a/zz.pdf");
        touch(root, "main.py");
        touch(root, "archive.zip");
        touch(root, "README");

        let tasks = discover(root, true, false);
        assert_eq!(
            names(&tasks, root),
            vec!["a/report.docx", "a/zz.pdf", "b/slides.PPTX", "main.py"]
        );
        assert_eq!(
            tasks[2].category,
            Category::Document(DocumentKind::PowerPoint)
        );
    }

    #[test]
    fn source_code_can_be_excluded() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "lib.rs");
        let tasks = discover(dir.path(), false, false);
        assert_eq!(names(&tasks, dir.path()), vec!["notes.txt"]);
    }

    #[test]
    fn directories_with_supported_names_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("weird.pdf")).unwrap();
        assert!(discover(dir.path(), true, false).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_included_without_following_dirs() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        touch(&root, "plain.txt");
        touch(dir.path(), "elsewhere/notes.txt");
        touch(dir.path(), "elsewhere/inner.pdf");
        std::os::unix::fs::symlink(dir.path().join("elsewhere/notes.txt"), root.join("link.txt"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("elsewhere"), root.join("linked_dir")).unwrap();

        let tasks = discover(&root, true, false);
        assert_eq!(names(&tasks, &root), vec!["link.txt", "plain.txt"]);

        let followed = discover(&root, true, true);
        assert_eq!(
            names(&followed, &root),
            vec!["link.txt", "linked_dir/inner.pdf", "linked_dir/notes.txt", "plain.txt"]
        );
    }

    #[test]
    fn empty_tree_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(discover(dir.path(), true, false).is_empty());
    }

    #[test]
    fn counts_by_category() {
        let tasks = vec![
            FileTask::new("a.pdf", Category::Document(DocumentKind::Pdf)),
            FileTask::new("b.py", Category::SourceCode { language: "python" }),
            FileTask::new("c.pdf", Category::Document(DocumentKind::Pdf)),
        ];
        assert_eq!(
            category_counts(&tasks),
            vec![
                (Category::Document(DocumentKind::Pdf), 2),
                (Category::SourceCode { language: "python" }, 1),
            ]
        );
    }
}
