//! CLI binary for edgequake-doc2md.
//!
//! A thin shim over the library crate that maps CLI flags to `BatchConfig`,
//! runs either a directory batch or a single file, and prints the results.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use edgequake_doc2md::catalog::describe_document_types;
use edgequake_doc2md::cli::{
    bold, cyan, dim, green, init_logging, print_summary, red, CliProgressCallback,
};
use edgequake_doc2md::{
    convert_directory, convert_file, BatchConfig, BatchProgressCallback, ConverterCommand,
    OutputLayout,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert all files in a directory
  doc2md --directorypath src/media

  # Convert a single file
  doc2md --filepath src/media/document.pdf

  # Specify custom output directory
  doc2md --directorypath src/media --output custom-output

  # Split the work across 4 workers
  doc2md --directorypath src/media --subthread 4

  # Keep the input folder structure under the output directory
  doc2md --directorypath src/media --preserve-tree

  # Machine-readable summary
  doc2md --directorypath src/media --json > summary.json

SUPPORTED FILES:
  Documents    .xlsx .xls .docx .doc .pptx .ppt .pdf .txt
               rendered by the external converter (markitdown by default);
               .txt is read directly
  Source code  .py .rs .js .ts .go .java .c .cpp .sh .sql …
               wrapped verbatim in a fenced code block

OUTPUT NAMING:
  <output>/<input stem>.md. Inputs sharing a stem in different folders map to
  the same file and the last one written wins; use --preserve-tree to avoid it.

ENVIRONMENT VARIABLES:
  DOC2MD_CONVERTER   Converter command, e.g. "markitdown" (default)
  RUST_LOG           Override log filtering (e.g. RUST_LOG=debug)
"#;

/// Convert documents (Excel, Word, PowerPoint, PDF, Text) and source code to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "doc2md",
    version,
    about = "Convert documents (Excel, Word, PowerPoint, PDF, Text) and source code to Markdown",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP,
    group(ArgGroup::new("input").required(true).args(["directorypath", "filepath"]))
)]
struct Cli {
    /// Directory path containing documents to convert.
    #[arg(long, value_name = "PATH")]
    directorypath: Option<PathBuf>,

    /// Single file path to convert.
    #[arg(long, value_name = "PATH")]
    filepath: Option<PathBuf>,

    /// Output directory for converted markdown files.
    #[arg(short, long, env = "DOC2MD_OUTPUT", default_value = "converted-markdown")]
    output: PathBuf,

    /// Number of workers the files are split across.
    #[arg(long, env = "DOC2MD_SUBTHREAD", default_value_t = 1)]
    subthread: usize,

    /// External converter program for documents.
    #[arg(long, env = "DOC2MD_CONVERTER")]
    converter: Option<String>,

    /// Extra argument passed to the converter before the input path (repeatable).
    #[arg(long = "converter-arg", value_name = "ARG", allow_hyphen_values = true)]
    converter_args: Vec<String>,

    /// Mirror the input folder structure under the output directory.
    #[arg(long, env = "DOC2MD_PRESERVE_TREE")]
    preserve_tree: bool,

    /// Follow symbolic links while scanning.
    #[arg(long, env = "DOC2MD_FOLLOW_LINKS")]
    follow_links: bool,

    /// Only convert documents; skip source-code files.
    #[arg(long, env = "DOC2MD_NO_SOURCE_CODE")]
    no_source_code: bool,

    /// Clean up converter output (line endings, trailing whitespace, blank-line runs).
    #[arg(long, env = "DOC2MD_NORMALIZE")]
    normalize: bool,

    /// Print the batch summary as JSON on stdout.
    #[arg(long, env = "DOC2MD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "DOC2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOC2MD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress =
        !cli.quiet && !cli.no_progress && !cli.json && cli.directorypath.is_some();
    init_logging(cli.verbose, cli.quiet, show_progress);

    let chatty = !cli.quiet && !cli.json;
    if chatty {
        let abs = std::path::absolute(&cli.output).unwrap_or_else(|_| cli.output.clone());
        eprintln!("{} Output directory: {}", cyan("◆"), bold(&abs.display().to_string()));
        eprintln!(
            "{} Supported file types: {}",
            cyan("◆"),
            dim(&describe_document_types())
        );
        eprintln!();
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb = show_progress.then(CliProgressCallback::new_dynamic);
    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    if let Some(ref dir) = cli.directorypath {
        let summary = convert_directory(dir, &config)
            .await
            .context("Batch conversion failed")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
            );
        } else if !cli.quiet {
            if summary.attempted == 0 {
                eprintln!(
                    "{} No supported files found in: {}",
                    cyan("⚠"),
                    dir.display()
                );
            }
            print_summary(&summary);
        }

        return Ok(if summary.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let Some(ref file) = cli.filepath else {
        anyhow::bail!("either --directorypath or --filepath is required");
    };

    let result = convert_file(file, &config).await;
    if !cli.quiet {
        eprintln!();
        eprintln!("{}", "=".repeat(50));
    }
    match result {
        Ok(output) => {
            if !cli.quiet {
                eprintln!(
                    "{} File conversion completed successfully!  {}",
                    green("✔"),
                    dim(&output.display().to_string())
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} {}", red("✘"), e);
            if !cli.quiet {
                eprintln!("{} File conversion failed!", red("✘"));
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Map CLI args to `BatchConfig`.
fn build_config(cli: &Cli, progress: Option<Arc<CliProgressCallback>>) -> Result<BatchConfig> {
    let mut builder = BatchConfig::builder()
        .output_dir(&cli.output)
        .workers(cli.subthread)
        .layout(if cli.preserve_tree {
            OutputLayout::MirrorTree
        } else {
            OutputLayout::Flatten
        })
        .include_source_code(!cli.no_source_code)
        .follow_links(cli.follow_links)
        .normalize(cli.normalize);

    if let Some(mut command) = cli.converter.as_deref().and_then(ConverterCommand::parse) {
        command.args.extend(cli.converter_args.iter().cloned());
        builder = builder.converter(command);
    } else if !cli.converter_args.is_empty() {
        let mut command = ConverterCommand::default();
        command.args.extend(cli.converter_args.iter().cloned());
        builder = builder.converter(command);
    }

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb as Arc<dyn BatchProgressCallback>);
    }

    builder.build().context("Invalid configuration")
}
