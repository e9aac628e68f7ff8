//! Conversion entry points: whole directories, single files, in-memory.
//!
//! * [`convert_directory`] — enumerate, partition, dispatch, aggregate.
//! * [`convert_file`] — one file, validated, written to the output directory.
//! * [`render_markdown`] — one file rendered to a `String`, nothing written
//!   (used by the single-format tools when printing to stdout).

use crate::catalog::{self, Category, DocumentKind};
use crate::config::BatchConfig;
use crate::dispatch::{dispatch, worker_count, WorkerContext};
use crate::error::{Doc2MdError, FileError};
use crate::output::{BatchSummary, FileTask};
use crate::pipeline::{discover, document, postprocess, source, write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert every supported file under `root` into `config.output_dir`.
///
/// # Returns
/// `Ok(BatchSummary)` once every worker has finished, even if some files
/// failed (check [`BatchSummary::is_success`]). A tree with no supported
/// files returns the empty `(0, 0)` summary.
///
/// # Errors
/// Returns `Err(Doc2MdError)` only for fatal errors, before any work starts:
/// - `root` does not exist or is not a directory
/// - the output directory cannot be created
pub async fn convert_directory(
    root: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<BatchSummary, Doc2MdError> {
    let total_start = Instant::now();
    let root = root.as_ref();
    info!("Starting batch conversion: {}", root.display());

    // ── Step 1: Validate root ────────────────────────────────────────────
    if !root.exists() {
        return Err(Doc2MdError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(Doc2MdError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    let root = std::path::absolute(root)
        .map_err(|e| Doc2MdError::Internal(format!("cannot resolve {}: {e}", root.display())))?;

    // ── Step 2: Output directory ─────────────────────────────────────────
    ensure_output_dir(&config.output_dir).await?;

    // ── Step 3: Enumerate ────────────────────────────────────────────────
    let walk_root = root.clone();
    let (include_source_code, follow_links) = (config.include_source_code, config.follow_links);
    let tasks = tokio::task::spawn_blocking(move || {
        discover::discover(&walk_root, include_source_code, follow_links)
    })
    .await
    .map_err(|e| Doc2MdError::Internal(format!("Discovery task panicked: {e}")))?;

    if tasks.is_empty() {
        warn!("No supported files found in: {}", root.display());
        info!(
            "Supported extensions: {}",
            catalog::supported_extensions(config.include_source_code).join(", ")
        );
        let summary = BatchSummary::empty();
        if let Some(ref cb) = config.progress_callback {
            cb.on_batch_start(0, 0);
            cb.on_batch_complete(&summary);
        }
        return Ok(summary);
    }

    info!("Found {} supported files in: {}", tasks.len(), root.display());
    for (category, count) in discover::category_counts(&tasks) {
        debug!("  {}: {}", category, count);
    }

    // ── Step 4: Warn about output collisions ─────────────────────────────
    let collisions = write::find_collisions(
        tasks.iter().map(|t| t.path.as_path()),
        Some(&root),
        &config.output_dir,
        config.layout,
    );
    for (output, inputs) in &collisions {
        warn!(
            "{} inputs map to {}; the last one written wins: {}",
            inputs.len(),
            output.display(),
            inputs
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    // ── Step 5: Dispatch ─────────────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        if !collisions.is_empty() {
            cb.on_collisions(&collisions);
        }
        cb.on_batch_start(tasks.len(), worker_count(tasks.len(), config.workers));
    }

    let ctx = WorkerContext::new(config.clone(), Some(root.clone()));
    let mut summary = dispatch(tasks, ctx).await;
    summary.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Batch complete: {}/{} files converted, {}ms total",
        summary.succeeded, summary.attempted, summary.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(&summary);
    }

    Ok(summary)
}

/// Synchronous wrapper around [`convert_directory`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_directory_sync(
    root: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<BatchSummary, Doc2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Doc2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_directory(root, config))
}

/// Convert a single file into `config.output_dir`, bypassing chunking.
///
/// # Errors
/// In order of checking: [`Doc2MdError::FileNotFound`],
/// [`Doc2MdError::NotAFile`], [`Doc2MdError::UnsupportedExtension`]; then
/// [`Doc2MdError::OutputDirFailed`] or [`Doc2MdError::Conversion`]. Nothing
/// is written when validation fails.
pub async fn convert_file(
    path: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<PathBuf, Doc2MdError> {
    let task = validate_file(path.as_ref(), config.include_source_code)?;
    info!("Processing {} file: {}", task.category, task.path.display());

    ensure_output_dir(&config.output_dir).await?;

    let ctx = WorkerContext::new(config.clone(), None);
    let callback = config.progress_callback.clone();
    if let Some(ref cb) = callback {
        cb.on_file_start(0, &task);
    }

    let result = tokio::task::spawn_blocking(move || {
        let result = convert_task(&task, &ctx);
        (task, result)
    })
    .await
    .map_err(|e| Doc2MdError::Internal(format!("Conversion task panicked: {e}")))?;

    match result {
        (task, Ok(output)) => {
            info!("Converted: {} \u{2192} {}", task.path.display(), output.display());
            if let Some(ref cb) = callback {
                cb.on_file_complete(0, &task, &output);
            }
            Ok(output)
        }
        (task, Err(e)) => {
            warn!("Error converting {}", e);
            if let Some(ref cb) = callback {
                cb.on_file_error(0, &task, &e);
            }
            Err(e.into())
        }
    }
}

/// Render one file to Markdown in memory without writing anything.
///
/// `fallback` routes files whose extension is not in the catalog to the
/// document backend as that kind; with `None` they are rejected.
pub fn render_markdown(
    path: impl AsRef<Path>,
    fallback: Option<DocumentKind>,
    config: &BatchConfig,
) -> Result<String, Doc2MdError> {
    let path = path.as_ref();
    let task = match (validate_file(path, config.include_source_code), fallback) {
        (Ok(task), _) => task,
        (Err(Doc2MdError::UnsupportedExtension { .. }), Some(kind)) => {
            debug!("Routing {} to the {} backend", path.display(), kind);
            FileTask::new(path, Category::Document(kind))
        }
        (Err(e), _) => return Err(e),
    };

    let ctx = WorkerContext::new(config.clone(), None);
    Ok(render_task(&task, &ctx)?)
}

/// Check existence, type and extension of a single input, in that order.
///
/// The returned task carries the absolute path.
pub fn validate_file(path: &Path, include_source_code: bool) -> Result<FileTask, Doc2MdError> {
    if !path.exists() {
        return Err(Doc2MdError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(Doc2MdError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    match catalog::classify(path) {
        Some(category) if include_source_code || !category.is_source_code() => {
            let path = std::path::absolute(path).map_err(|e| {
                Doc2MdError::Internal(format!("cannot resolve {}: {e}", path.display()))
            })?;
            Ok(FileTask::new(path, category))
        }
        _ => Err(Doc2MdError::UnsupportedExtension {
            extension: path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default(),
            supported: catalog::supported_extensions(include_source_code).join(", "),
        }),
    }
}

// ── Per-file conversion (called from workers) ────────────────────────────

/// Render `task` and write it to its output path.
pub(crate) fn convert_task(task: &FileTask, ctx: &WorkerContext) -> Result<PathBuf, FileError> {
    let markdown = render_task(task, ctx)?;
    let output = write::output_path_for(
        &task.path,
        ctx.root.as_deref(),
        &ctx.config.output_dir,
        ctx.config.layout,
    );
    write::write_markdown(&output, &markdown)?;
    Ok(output)
}

/// Produce the Markdown for `task` via the route its category selects.
fn render_task(task: &FileTask, ctx: &WorkerContext) -> Result<String, FileError> {
    match task.category {
        Category::Document(kind) => {
            let backend = document::backend_for(kind, &ctx.config, &ctx.backend);
            let raw = backend.convert(&task.path)?;
            if ctx.config.normalize {
                Ok(postprocess::clean_markdown(&raw))
            } else {
                Ok(raw)
            }
        }
        Category::SourceCode { .. } if !ctx.config.include_source_code => {
            Err(FileError::UnsupportedType {
                path: task.path.clone(),
            })
        }
        Category::SourceCode { language } => source::wrap_file(&task.path, language),
    }
}

async fn ensure_output_dir(dir: &Path) -> Result<(), Doc2MdError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Doc2MdError::OutputDirFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
    debug!("Output directory: {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn validate_reports_three_distinct_reasons() {
        let dir = TempDir::new().unwrap();

        let missing = dir.path().join("nope.pdf");
        assert!(matches!(
            validate_file(&missing, true),
            Err(Doc2MdError::FileNotFound { .. })
        ));

        assert!(matches!(
            validate_file(dir.path(), true),
            Err(Doc2MdError::NotAFile { .. })
        ));

        let odt = dir.path().join("letter.odt");
        std::fs::write(&odt, "x").unwrap();
        match validate_file(&odt, true) {
            Err(Doc2MdError::UnsupportedExtension { extension, supported }) => {
                assert_eq!(extension, ".odt");
                assert!(supported.contains(".docx"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_source_when_disabled() {
        let dir = TempDir::new().unwrap();
        let py = dir.path().join("x.py");
        std::fs::write(&py, "print(1)").unwrap();
        assert!(validate_file(&py, true).is_ok());
        assert!(matches!(
            validate_file(&py, false),
            Err(Doc2MdError::UnsupportedExtension { .. })
        ));
    }

    #[test]
    fn render_markdown_normalises_when_asked() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("notes.txt");
        std::fs::write(&p, "line one  \r\nline two").unwrap();
        let config = BatchConfig::builder().normalize(true).build().unwrap();
        let md = render_markdown(&p, None, &config).unwrap();
        assert_eq!(md, "line one\nline two\n");
    }

    #[test]
    fn render_markdown_keeps_text_by_default() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("notes.txt");
        std::fs::write(&p, "a  \nb").unwrap();
        assert_eq!(
            render_markdown(&p, None, &BatchConfig::default()).unwrap(),
            "a  \nb"
        );
    }

    #[test]
    fn render_markdown_unknown_extension_needs_fallback() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("memo.rtf");
        std::fs::write(&p, "x").unwrap();
        let err = render_markdown(&p, None, &BatchConfig::default()).unwrap_err();
        assert!(matches!(err, Doc2MdError::UnsupportedExtension { .. }));
    }

    #[tokio::test]
    async fn convert_file_missing_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let config = BatchConfig::builder().output_dir(&out).build().unwrap();
        let err = convert_file(dir.path().join("ghost.py"), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, Doc2MdError::FileNotFound { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn validate_returns_absolute_path() {
        // Tests run from the package root.
        let task = validate_file(Path::new("src/lib.rs"), true).unwrap();
        assert!(task.path.is_absolute(), "got: {}", task.path.display());
        assert!(task.path.ends_with("src/lib.rs"));
    }

    #[tokio::test]
    async fn convert_file_source_code() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("hello.py");
        std::fs::write(&src, "print(1)").unwrap();
        let out = dir.path().join("out");
        let config = BatchConfig::builder().output_dir(&out).build().unwrap();

        let written = convert_file(&src, &config).await.unwrap();
        assert_eq!(written, out.join("hello.md"));
        assert_eq!(
            std::fs::read_to_string(written).unwrap(),
            "# hello.py\n\n```python\nprint(1)\n```\n"
        );
    }

    #[tokio::test]
    async fn convert_directory_rejects_missing_and_file_roots() {
        let dir = TempDir::new().unwrap();
        let config = BatchConfig::builder()
            .output_dir(dir.path().join("out"))
            .build()
            .unwrap();

        let err = convert_directory(dir.path().join("missing"), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, Doc2MdError::DirectoryNotFound { .. }));

        let file = dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();
        let err = convert_directory(&file, &config).await.unwrap_err();
        assert!(matches!(err, Doc2MdError::NotADirectory { .. }));
    }
}
