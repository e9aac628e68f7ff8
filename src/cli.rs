//! Shared pieces of the command-line tools (enabled by the `cli` feature).
//!
//! `doc2md` is the batch tool; `excel2md`, `pdf2md`, `pptx2md` and `word2md`
//! are four thin shims over [`run_single_format`].

use crate::catalog::{self, Category, DocumentKind};
use crate::config::{BatchConfig, ConverterCommand};
use crate::convert::render_markdown;
use crate::error::FileError;
use crate::output::{BatchSummary, FileTask, WorkerResult};
use crate::pipeline::write::write_markdown;
use crate::progress::BatchProgressCallback;
use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

pub fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
pub fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
pub fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
pub fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
pub fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Logging ──────────────────────────────────────────────────────────────────

/// Install the stderr tracing subscriber.
///
/// Library INFO logs are suppressed while a progress bar is active; the bar
/// provides all the feedback that matters. `RUST_LOG` always wins.
pub fn init_logging(verbose: bool, quiet: bool, show_progress: bool) {
    let filter = if verbose {
        "debug"
    } else if quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();
}

// ── Batch progress bar ───────────────────────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Terminal progress callback: one bar for the whole batch plus a log line per
/// file. Files from different workers complete in any order.
pub struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_batch_start` reports the file count.
    pub fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Looking for supported files…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize, workers: usize) {
        if total_files == 0 {
            return;
        }
        self.activate_bar(total_files);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Converting {total_files} files with {workers} worker(s)…"
            ))
        ));
    }

    fn on_collisions(&self, collisions: &[(PathBuf, Vec<PathBuf>)]) {
        for (output, inputs) in collisions {
            self.bar.println(format!(
                "{} {} inputs map to {}; the last one written wins:",
                cyan("⚠"),
                inputs.len(),
                bold(&output.display().to_string())
            ));
            for input in inputs {
                self.bar.println(format!("    {}", dim(&input.display().to_string())));
            }
        }
    }

    fn on_file_start(&self, _worker: usize, task: &FileTask) {
        self.bar.set_message(task.path.display().to_string());
    }

    fn on_file_complete(&self, worker: usize, task: &FileTask, output: &Path) {
        self.bar.println(format!(
            "  {} {}  {}  {} {}",
            green("✓"),
            dim(&format!("[w{worker}]")),
            task.path.display(),
            dim("→"),
            output.display(),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, worker: usize, task: &FileTask, error: &FileError) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = error.to_string();
        let msg = if msg.chars().count() > 100 {
            let cut: String = msg.chars().take(99).collect();
            format!("{cut}\u{2026}")
        } else {
            msg
        };

        self.bar.println(format!(
            "  {} {}  {}  {}",
            red("✗"),
            dim(&format!("[w{worker}]")),
            task.path.display(),
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_worker_complete(&self, result: &WorkerResult) {
        if result.failed() > 0 {
            self.bar.println(dim(&format!(
                "  worker {} done: {}/{} ok",
                result.worker, result.succeeded, result.attempted
            )));
        }
    }

    fn on_batch_complete(&self, _summary: &BatchSummary) {
        self.bar.finish_and_clear();
    }
}

/// Human-readable end-of-batch report, written to stderr.
pub fn print_summary(summary: &BatchSummary) {
    eprintln!();
    eprintln!("{}", "=".repeat(50));
    eprintln!("{}", bold("Conversion Summary:"));
    eprintln!("   Total files processed: {}", summary.attempted);
    eprintln!("   Successful conversions: {}", summary.succeeded);
    eprintln!("   Failed conversions: {}", summary.failed());
    if let Some(rate) = summary.success_rate() {
        eprintln!("   Success rate: {rate:.1}%");
    }
    eprintln!(
        "   Duration: {}",
        dim(&format!("{}ms", summary.total_duration_ms))
    );

    let failures: Vec<_> = summary.failures().collect();
    if !failures.is_empty() {
        eprintln!();
        eprintln!("{}", red("Failed files:"));
        for f in failures {
            eprintln!("   {} {}", red("✗"), f.error);
        }
    }
}

// ── Single-format tools ──────────────────────────────────────────────────────

/// Arguments shared by `excel2md`, `pdf2md`, `pptx2md` and `word2md`.
#[derive(Parser, Debug)]
#[command(version, arg_required_else_help = true, color = clap::ColorChoice::Auto)]
pub struct SingleFormatArgs {
    /// Input document.
    pub input: PathBuf,

    /// Write Markdown to this file instead of stdout.
    pub output: Option<PathBuf>,

    /// External converter program (and leading arguments).
    #[arg(long, env = "DOC2MD_CONVERTER")]
    pub converter: Option<String>,

    /// Clean up converter output (line endings, trailing whitespace, blank-line runs).
    #[arg(long, env = "DOC2MD_NORMALIZE")]
    pub normalize: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2MD_VERBOSE")]
    pub verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOC2MD_QUIET")]
    pub quiet: bool,
}

/// Entry point of a single-format tool. Exit code 1 on any failure.
pub fn run_single_format(kind: DocumentKind, bin_name: &'static str) -> ExitCode {
    let exts = kind
        .extensions()
        .iter()
        .map(|e| format!(".{e}"))
        .collect::<Vec<_>>()
        .join(", ");
    let matches = SingleFormatArgs::command()
        .name(bin_name)
        .about(format!("Convert a {} document ({exts}) to Markdown", kind.label()))
        .after_help(format!(
            "EXAMPLES:\n  {bin_name} document{ext} output.md\n  {bin_name} document{ext} > output.md",
            ext = format!(".{}", kind.extensions()[0])
        ))
        .get_matches();
    let args = match SingleFormatArgs::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    init_logging(args.verbose, args.quiet, false);

    match convert_single_format(kind, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", red("Error:"), e);
            ExitCode::FAILURE
        }
    }
}

fn convert_single_format(kind: DocumentKind, args: &SingleFormatArgs) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("File {} not found", args.input.display());
    }

    match catalog::classify(&args.input) {
        Some(Category::Document(actual)) if actual != kind => warn!(
            "{} looks like a {} file, not {}; converting anyway",
            args.input.display(),
            actual,
            kind
        ),
        _ => {}
    }

    let mut builder = BatchConfig::builder()
        .normalize(args.normalize)
        .include_source_code(false);
    if let Some(cmd) = args.converter.as_deref().and_then(ConverterCommand::parse) {
        builder = builder.converter(cmd);
    }
    let config = builder.build().context("Invalid configuration")?;

    let markdown = render_markdown(&args.input, Some(kind), &config)
        .with_context(|| format!("Error converting {}", args.input.display()))?;

    match args.output {
        Some(ref output) => {
            write_markdown(output, &markdown)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            if !args.quiet {
                eprintln!(
                    "{} Converted {} to {}",
                    green("✔"),
                    args.input.display(),
                    bold(&output.display().to_string())
                );
            }
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(markdown.as_bytes())
                .context("Failed to write to stdout")?;
            if !markdown.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_format_args_parse_positionals() {
        let args =
            SingleFormatArgs::try_parse_from(["pdf2md", "in.pdf", "out.md", "--normalize"]).unwrap();
        assert_eq!(args.input, PathBuf::from("in.pdf"));
        assert_eq!(args.output, Some(PathBuf::from("out.md")));
        assert!(args.normalize);
    }

    #[test]
    fn single_format_output_is_optional() {
        let args = SingleFormatArgs::try_parse_from(["word2md", "in.docx"]).unwrap();
        assert!(args.output.is_none());
    }

    #[test]
    fn missing_input_is_an_error() {
        let args = SingleFormatArgs::try_parse_from(["pdf2md", "/definitely/not/here.pdf"]).unwrap();
        let err = convert_single_format(DocumentKind::Pdf, &args).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn text_converts_to_output_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("notes.txt");
        let output = dir.path().join("notes.md");
        std::fs::write(&input, "hello\r\n").unwrap();
        let args = SingleFormatArgs::try_parse_from([
            "word2md",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--quiet",
            "--normalize",
        ])
        .unwrap();
        convert_single_format(DocumentKind::Word, &args).unwrap();
        assert_eq!(std::fs::read_to_string(output).unwrap(), "hello\n");
    }

    #[cfg(unix)]
    #[test]
    fn source_extension_goes_to_the_document_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("script.py");
        let output = dir.path().join("script.md");
        std::fs::write(&input, "print(1)\n").unwrap();
        let args = SingleFormatArgs::try_parse_from([
            "pdf2md",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--quiet",
            "--converter",
            "cat",
        ])
        .unwrap();
        convert_single_format(DocumentKind::Pdf, &args).unwrap();
        assert_eq!(std::fs::read_to_string(output).unwrap(), "print(1)\n");
    }
}
