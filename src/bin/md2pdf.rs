//! CLI binary for edgequake-md2pdf.
//!
//! A thin shim over the library crate: picks a folder and files (from flags
//! or an interactive wizard), maps flags to `ConversionConfig`, and prints
//! per-file results.

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{Confirm, Input, MultiSelect};
use edgequake_md2pdf::pandoc_probe::{self, ToolchainReport};
use edgequake_md2pdf::{
    BatchProgressCallback, BatchReport, ConversionConfig, Md2PdfError, ProgressCallback,
    SelectionSession,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TOOLCHAIN_HINT: &str =
    "Please ensure Pandoc and a LaTeX distribution (like MiKTeX or TeX Live) are installed and in your system's PATH.";

// ── Result lines shared by the live and the after-the-fact renderers ─────────

fn success_lines(name: &str, output: &Path) -> [String; 2] {
    let file_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    [
        format!("  {} Successfully converted `{}`", green("✓"), name),
        format!(
            "    {} Download `{}`  {}",
            cyan("↓"),
            file_name,
            dim(&output.display().to_string())
        ),
    ]
}

fn failure_lines(error: &str) -> [String; 2] {
    [
        format!("  {} {}", red("✗"), red(error)),
        format!("    {}", dim(TOOLCHAIN_HINT)),
    ]
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a progress bar advanced after every file plus
/// a success / failure line per file printed above it.
///
/// The bar is only drawn once the batch starts, so a run rejected up front
/// (e.g. nothing selected) leaves no spinner behind.
struct CliProgressCallback {
    bar: OnceLock<ProgressBar>,
    /// Per-file name and wall-clock start time, keyed by position.
    in_flight: Mutex<HashMap<usize, (String, Instant)>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: OnceLock::new(),
            in_flight: Mutex::new(HashMap::new()),
        })
    }

    fn start_bar(total: usize) -> ProgressBar {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  {percent:>3}%  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(total as u64);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }

    /// Print above the bar, or straight to stderr before it exists.
    fn println(&self, line: String) {
        match self.bar.get() {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    fn advance(&self) {
        if let Some(bar) = self.bar.get() {
            bar.inc(1);
        }
    }

    /// Name and formatted elapsed time of a finished file.
    fn finish(&self, position: usize) -> (String, String) {
        let (name, ms) = self
            .in_flight
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&position))
            .map(|(name, t)| (name, t.elapsed().as_millis()))
            .unwrap_or_default();
        (name, dim(&format!("{:.1}s", ms as f64 / 1000.0)))
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        let bar = self.bar.get_or_init(|| Self::start_bar(total_files));
        bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_files} file(s)…"))
        ));
    }

    fn on_file_start(&self, position: usize, _total: usize, name: &str) {
        if let Ok(mut m) = self.in_flight.lock() {
            m.insert(position, (name.to_string(), Instant::now()));
        }
        if let Some(bar) = self.bar.get() {
            bar.set_message(format!("Converting `{name}`…"));
        }
    }

    fn on_file_complete(&self, position: usize, _total: usize, output: &Path) {
        let (name, elapsed) = self.finish(position);
        let [done, offer] = success_lines(&name, output);
        self.println(format!("{done}  {elapsed}"));
        self.println(offer);
        self.advance();
    }

    fn on_file_error(&self, position: usize, _total: usize, _name: &str, error: &str) {
        let (_, elapsed) = self.finish(position);
        let [msg, hint] = failure_lines(error);
        self.println(format!("{msg}  {elapsed}"));
        self.println(hint);
        self.advance();
    }

    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        if let Some(bar) = self.bar.get() {
            bar.finish_and_clear();
        }
        print_summary(total_files, success_count);
    }
}

fn print_summary(total: usize, succeeded: usize) {
    let failed = total.saturating_sub(succeeded);
    if failed == 0 {
        eprintln!(
            "{} {} file(s) converted successfully",
            green("✔"),
            bold(&succeeded.to_string())
        );
    } else {
        eprintln!(
            "{} {}/{} files converted  ({} failed)",
            if failed == total { red("✘") } else { yellow("⚠") },
            bold(&succeeded.to_string()),
            total,
            red(&failed.to_string()),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Pick a folder and files interactively
  md2pdf

  # Convert every Markdown file in ./docs into ./docs/output_pdfs
  md2pdf docs --all

  # Convert two files only
  md2pdf docs --file intro.md --file usage.md

  # List what would be offered for selection
  md2pdf docs --list

  # Use LuaLaTeX and pass extra pandoc options
  md2pdf docs --all --engine lualatex --extra-arg=-V --extra-arg=geometry:margin=1in

  # Check that pandoc and the PDF engine are installed
  md2pdf --check

PREREQUISITES:
  Pandoc       https://pandoc.org/installing.html
  LaTeX        Windows: MiKTeX   https://miktex.org/download
               macOS:   MacTeX   https://www.tug.org/mactex/
               Linux:   sudo apt-get install texlive-full   (or similar)

ENVIRONMENT VARIABLES:
  PANDOC_PATH           Use this pandoc executable instead of the one on PATH
  MD2PDF_ENGINE         Default for --engine
  RUST_LOG              Log filter, e.g. RUST_LOG=edgequake_md2pdf=debug
"#;

/// Batch-convert Markdown files in a folder to PDF with Pandoc.
#[derive(Parser, Debug)]
#[command(
    name = "md2pdf",
    version,
    about = "Batch-convert Markdown files in a folder to PDF with Pandoc + LaTeX",
    long_about = "Select a folder of Markdown (.md) files, choose some or all of them, and \
convert each one to PDF with Pandoc and a LaTeX engine (xelatex by default, for Unicode and \
emoji). PDFs are written to an `output_pdfs` folder next to the sources. One file failing never \
stops the rest of the batch.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder containing the Markdown files. Omit to be prompted.
    folder: Option<PathBuf>,

    /// Select every Markdown file in the folder (overrides --file).
    #[arg(short, long)]
    all: bool,

    /// Select a file by name; repeat for several.
    #[arg(short, long = "file", value_name = "NAME")]
    files: Vec<String>,

    /// Prompt for folder and files even when a folder is given.
    #[arg(short, long)]
    interactive: bool,

    /// Print the Markdown files found in the folder and exit.
    #[arg(long)]
    list: bool,

    /// Report whether pandoc and the PDF engine are installed, then exit.
    #[arg(long)]
    check: bool,

    /// PDF engine passed to pandoc as --pdf-engine.
    #[arg(long, env = "MD2PDF_ENGINE", default_value = pandoc_probe::DEFAULT_PDF_ENGINE)]
    engine: String,

    /// Path to the pandoc executable.
    #[arg(long, env = "PANDOC_PATH")]
    pandoc: Option<PathBuf>,

    /// Extra argument appended to every pandoc call; repeat for several.
    #[arg(long = "extra-arg", value_name = "ARG", allow_hyphen_values = true)]
    extra_args: Vec<String>,

    /// Name of the output folder created inside the input folder.
    #[arg(long, env = "MD2PDF_OUTPUT_DIR_NAME", default_value = edgequake_md2pdf::DEFAULT_OUTPUT_DIR_NAME)]
    output_dir_name: String,

    /// Files converted at the same time (1 = one after another).
    #[arg(short, long, env = "MD2PDF_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Give up on a single file after this many seconds.
    #[arg(long, env = "MD2PDF_TIMEOUT")]
    timeout: Option<u64>,

    /// Print the batch report as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Exit with an error if any file failed to convert.
    #[arg(long)]
    strict: bool,

    /// Disable the progress bar.
    #[arg(long, env = "MD2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Per-file outcomes are rendered as result lines; library logs would
    // only repeat them, so they stay at ERROR unless --verbose.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose { "debug" } else { "error" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Check-only mode ──────────────────────────────────────────────────
    if cli.check {
        let report = pandoc_probe::probe_with(cli.pandoc.as_deref(), &cli.engine);
        print_toolchain(&report, cli.pandoc.as_deref());
        if !report.is_ready() {
            anyhow::bail!("Toolchain incomplete\n{}", pandoc_probe::install_hint());
        }
        return Ok(());
    }

    // ── Selection ────────────────────────────────────────────────────────
    let session = match (&cli.folder, cli.interactive) {
        (Some(folder), false) => {
            let mut session = SelectionSession::open(folder)
                .with_context(|| format!("Cannot use folder {}", folder.display()))?;
            if cli.list {
                for file in session.files() {
                    println!("{}", file.name());
                }
                return Ok(());
            }
            session.choose(cli.all, &cli.files)?;
            session
        }
        (folder, _) => match run_wizard(folder.as_deref())? {
            Some(session) => session,
            None => return Ok(()),
        },
    };

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let report = session.run(&config).await.context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet && !show_progress {
        print_report(&report);
    }

    if cli.strict {
        report.into_result().context("Some files failed")?;
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .pdf_engine(cli.engine.clone())
        .extra_args(cli.extra_args.iter().cloned())
        .output_dir_name(cli.output_dir_name.clone())
        .concurrency(cli.concurrency);

    if let Some(ref path) = cli.pandoc {
        builder = builder.pandoc_path(path.clone());
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Folder → select-all → files → confirm. Returns `None` if the user backs out.
fn run_wizard(initial: Option<&Path>) -> Result<Option<SelectionSession>> {
    eprintln!("{}", bold("Markdown to PDF Converter"));
    eprintln!(
        "{}",
        dim("Select a folder containing your Markdown (.md) files to convert them to PDF.")
    );

    let mut folder = initial.map(Path::to_path_buf);
    let mut session = loop {
        let path = match folder.take() {
            Some(p) => p,
            None => {
                let entered: String = Input::new()
                    .with_prompt("Enter the path to the folder containing your Markdown files")
                    .interact_text()?;
                PathBuf::from(entered.trim())
            }
        };

        match SelectionSession::open(&path) {
            Ok(session) => {
                eprintln!(
                    "{} Valid folder selected: `{}`",
                    green("✓"),
                    path.display()
                );
                break session;
            }
            Err(e @ Md2PdfError::NoMarkdownFiles { .. }) => eprintln!("{} {e}", yellow("⚠")),
            Err(e) => eprintln!("{} {e}", red("✗")),
        }
    };

    loop {
        let all = Confirm::new()
            .with_prompt("Select All Files")
            .default(false)
            .interact()?;
        session.set_select_all(all);

        if !all {
            let names: Vec<&str> = session.files().iter().map(|f| f.name()).collect();
            let picked = MultiSelect::new()
                .with_prompt("Choose Markdown files (space to toggle, enter to confirm)")
                .items(&names)
                .interact()?;
            session.pick_indices(&picked);
        }

        let count = session.selected().len();
        if count == 0 {
            eprintln!("{} {}", red("✗"), Md2PdfError::EmptySelection);
            continue;
        }

        let go = Confirm::new()
            .with_prompt(format!("Convert {count} file(s) to PDF?"))
            .default(true)
            .interact()?;
        return Ok(go.then_some(session));
    }
}

/// Render a finished report when no live progress bar was shown.
fn print_report(report: &BatchReport) {
    for file in &report.files {
        let lines = match (file.result.output(), file.result.error()) {
            (Some(output), _) => success_lines(&file.name, output),
            (None, Some(error)) => failure_lines(&error.to_string()),
            (None, None) => continue,
        };
        for line in lines {
            eprintln!("{line}");
        }
    }
    eprintln!(
        "{} {:.0}%  →  {}",
        dim("progress"),
        report.progress() * 100.0,
        bold(&report.output_dir.display().to_string())
    );
    print_summary(report.stats.total_files, report.stats.succeeded);
}

fn print_toolchain(report: &ToolchainReport, pandoc_flag: Option<&Path>) {
    let tick = |ok: bool| if ok { green("✓") } else { red("✗") };

    if let Some(p) = pandoc_flag {
        println!("Requested:    {}", p.display());
    }
    match &report.pandoc {
        Some(path) => println!(
            "{} Pandoc:     {}  {}",
            tick(true),
            path.display(),
            dim(report.pandoc_version.as_deref().unwrap_or("version unknown"))
        ),
        None => println!("{} Pandoc:     not found", tick(false)),
    }
    match &report.engine_path {
        Some(path) => println!(
            "{} {:<11} {}",
            tick(true),
            format!("{}:", report.engine),
            path.display()
        ),
        None => println!(
            "{} {:<11} not found",
            tick(false),
            format!("{}:", report.engine)
        ),
    }
}
