//! Batch conversion entry points.
//!
//! The batch runner walks a selection in order, hands each file to the
//! configured [`DocumentConverter`], and collects one [`FileResult`] per
//! file. A failed file is recorded and the next one is attempted; only
//! precondition failures (bad folder, nothing selected, output folder not
//! creatable) abort a run, and they do so before any conversion starts.
//!
//! Use [`crate::stream::convert_stream`] instead when results should be
//! consumed as they complete.

use crate::config::{ConversionConfig, Selection};
use crate::error::Md2PdfError;
use crate::output::{BatchReport, BatchStats, ConversionResult, FileResult};
use crate::pipeline::discover::{list_markdown_files, InputFile};
use crate::pipeline::pandoc::{convert_file, output_path_for, DocumentConverter, PandocConverter};
use crate::progress::ProgressCallback;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert the selected Markdown files of `folder` into `<folder>/output_pdfs`.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(BatchReport)` once every selected file has been attempted, even if
/// some failed (check `report.stats.failed`).
///
/// # Errors
/// Returns `Err(Md2PdfError)` only for fatal errors:
/// - folder missing or not a directory
/// - no Markdown files in the folder
/// - a picked name not in the folder, or nothing picked at all
/// - output folder could not be created
pub async fn convert_folder(
    folder: impl AsRef<Path>,
    selection: &Selection,
    config: &ConversionConfig,
) -> Result<BatchReport, Md2PdfError> {
    let folder = folder.as_ref();
    info!("Starting batch in {}", folder.display());

    let listing = list_markdown_files(folder)?;
    let files = selection.resolve(&listing, folder)?;
    convert_files(&files, &config.output_dir_for(folder), config).await
}

/// Convert an explicit, ordered selection into `output_dir`.
///
/// Files are attempted in the order given. With the default
/// `concurrency = 1` each file finishes before the next starts; with a
/// higher value up to that many run at once, and the report is still in
/// selection order.
///
/// # Errors
/// - [`Md2PdfError::EmptySelection`] if `files` is empty (nothing is created)
/// - [`Md2PdfError::OutputDirFailed`] if `output_dir` cannot be created
pub async fn convert_files(
    files: &[InputFile],
    output_dir: &Path,
    config: &ConversionConfig,
) -> Result<BatchReport, Md2PdfError> {
    if files.is_empty() {
        return Err(Md2PdfError::EmptySelection);
    }
    let total_start = Instant::now();

    warn_on_output_collisions(files, output_dir);
    prepare_output_dir(output_dir).await?;

    let converter = resolve_converter(config);
    let total = files.len();

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut results = if config.concurrency <= 1 {
        process_sequential(&converter, files, output_dir, config).await
    } else {
        process_concurrent(&converter, files, output_dir, config).await
    };
    results.sort_by_key(|r| r.position);

    let succeeded = results.iter().filter(|r| r.result.is_success()).count();
    let stats = BatchStats {
        total_files: total,
        succeeded,
        failed: total - succeeded,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Batch complete: {}/{} files, {}ms total",
        succeeded, total, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, succeeded);
    }

    Ok(BatchReport {
        output_dir: output_dir.to_path_buf(),
        files: results,
        stats,
    })
}

/// Synchronous wrapper around [`convert_folder`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_folder_sync(
    folder: impl AsRef<Path>,
    selection: &Selection,
    config: &ConversionConfig,
) -> Result<BatchReport, Md2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Md2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_folder(folder, selection, config))
}

/// Convert Markdown held in memory to a PDF at `output_path`.
///
/// The source is written to a managed [`tempfile`] that is removed on
/// return. A converter failure is returned as
/// [`ConversionResult::Failure`], like any file in a batch.
///
/// # Example
/// ```rust,no_run
/// use edgequake_md2pdf::{convert_markdown, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConversionConfig::default();
/// let result = convert_markdown("# Hello 👋", "hello.pdf", &config).await?;
/// println!("{:?}", result);
/// # Ok(())
/// # }
/// ```
pub async fn convert_markdown(
    source: &str,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionResult, Md2PdfError> {
    let output_path = output_path.as_ref();
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        prepare_output_dir(parent).await?;
    }

    let mut tmp = tempfile::Builder::new()
        .suffix(".md")
        .tempfile()
        .map_err(|e| Md2PdfError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(source.as_bytes())
        .map_err(|e| Md2PdfError::Internal(format!("tempfile write: {e}")))?;
    tmp.flush()
        .map_err(|e| Md2PdfError::Internal(format!("tempfile write: {e}")))?;

    let input = InputFile::new(tmp.path());
    let converter = resolve_converter(config);
    // `tmp` is dropped (and the file deleted) when this returns
    Ok(match converter.convert(&input, output_path).await {
        Ok(()) => ConversionResult::Success {
            output: output_path.to_path_buf(),
        },
        Err(error) => ConversionResult::Failure { error },
    })
}

/// Create `dir` (and parents) if absent. Safe to call repeatedly.
pub async fn prepare_output_dir(dir: &Path) -> Result<(), Md2PdfError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| Md2PdfError::OutputDirFailed {
            path: dir.to_path_buf(),
            source,
        })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// The injected converter, or pandoc built from the config.
pub(crate) fn resolve_converter(config: &ConversionConfig) -> Arc<dyn DocumentConverter> {
    match config.converter {
        Some(ref converter) => Arc::clone(converter),
        None => Arc::new(PandocConverter::from_config(config)),
    }
}

/// Run one file through the converter, firing the per-file callbacks.
pub(crate) async fn process_one(
    converter: &dyn DocumentConverter,
    file: &InputFile,
    position: usize,
    total: usize,
    output_dir: &Path,
    progress: Option<&ProgressCallback>,
) -> FileResult {
    if let Some(cb) = progress {
        cb.on_file_start(position, total, file.name());
    }

    let start = Instant::now();
    let result = convert_file(converter, file, output_dir).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    if let Some(cb) = progress {
        match &result {
            ConversionResult::Success { output } => cb.on_file_complete(position, total, output),
            ConversionResult::Failure { error } => {
                cb.on_file_error(position, total, file.name(), &error.to_string())
            }
        }
    }

    FileResult {
        position,
        input: file.path().to_path_buf(),
        name: file.name().to_string(),
        result,
        duration_ms,
    }
}

/// One file at a time, in selection order.
async fn process_sequential(
    converter: &Arc<dyn DocumentConverter>,
    files: &[InputFile],
    output_dir: &Path,
    config: &ConversionConfig,
) -> Vec<FileResult> {
    let total = files.len();
    let mut results = Vec::with_capacity(total);

    for (idx, file) in files.iter().enumerate() {
        let result = process_one(
            converter.as_ref(),
            file,
            idx + 1,
            total,
            output_dir,
            config.progress_callback.as_ref(),
        )
        .await;
        results.push(result);
    }

    results
}

/// Up to `config.concurrency` files in flight; results arrive in completion order.
async fn process_concurrent(
    converter: &Arc<dyn DocumentConverter>,
    files: &[InputFile],
    output_dir: &Path,
    config: &ConversionConfig,
) -> Vec<FileResult> {
    let total = files.len();
    debug!("Converting {} files with concurrency {}", total, config.concurrency);

    stream::iter(files.iter().enumerate().map(|(idx, file)| {
        let converter = Arc::clone(converter);
        let progress = config.progress_callback.clone();
        async move {
            process_one(
                converter.as_ref(),
                file,
                idx + 1,
                total,
                output_dir,
                progress.as_ref(),
            )
            .await
        }
    }))
    .buffer_unordered(config.concurrency)
    .collect()
    .await
}

/// Distinct inputs whose PDFs would land on the same path. The later file
/// overwrites the earlier one; this is reported, not resolved.
pub fn output_collisions(files: &[InputFile], output_dir: &Path) -> Vec<(PathBuf, Vec<String>)> {
    let mut by_output: HashMap<PathBuf, Vec<&InputFile>> = HashMap::new();
    for file in files {
        by_output
            .entry(output_path_for(file, output_dir))
            .or_default()
            .push(file);
    }

    let mut collisions: Vec<(PathBuf, Vec<String>)> = by_output
        .into_iter()
        .filter_map(|(out, inputs)| {
            let mut paths: Vec<&Path> = inputs.iter().map(|f| f.path()).collect();
            paths.sort();
            paths.dedup();
            (paths.len() > 1).then(|| {
                (
                    out,
                    paths.iter().map(|p| p.display().to_string()).collect(),
                )
            })
        })
        .collect();
    collisions.sort();
    collisions
}

fn warn_on_output_collisions(files: &[InputFile], output_dir: &Path) {
    for (out, inputs) in output_collisions(files, output_dir) {
        warn!(
            "{} inputs share output '{}'; later files overwrite earlier ones: {}",
            inputs.len(),
            out.display(),
            inputs.join(", ")
        );
    }
}
