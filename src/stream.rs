//! Streaming conversion API: emit per-file results as they complete.
//!
//! Unlike the eager [`crate::convert::convert_files`], which returns only
//! after every file has been attempted, [`convert_stream`] yields each
//! [`FileResult`] as soon as its conversion finishes. With the default
//! `concurrency = 1` items arrive in selection order; with more, they
//! arrive in completion order (sort by `position` if order matters).
//!
//! Preconditions are checked up front, so a stream is only returned once
//! the selection is non-empty and the output folder exists.

use crate::config::{ConversionConfig, Selection};
use crate::convert::{prepare_output_dir, process_one, resolve_converter};
use crate::error::Md2PdfError;
use crate::output::FileResult;
use crate::pipeline::discover::{list_markdown_files, InputFile};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-file results.
pub type FileStream = Pin<Box<dyn Stream<Item = FileResult> + Send>>;

/// Convert `files` into `output_dir`, streaming results as they are ready.
///
/// # Returns
/// - `Ok(FileStream)` — one item per input file
/// - `Err(Md2PdfError)` — empty selection or output folder not creatable
pub async fn convert_stream(
    files: Vec<InputFile>,
    output_dir: impl Into<PathBuf>,
    config: &ConversionConfig,
) -> Result<FileStream, Md2PdfError> {
    if files.is_empty() {
        return Err(Md2PdfError::EmptySelection);
    }
    let output_dir: Arc<Path> = Arc::from(output_dir.into());
    prepare_output_dir(&output_dir).await?;
    info!(
        "Starting streaming batch of {} files into {}",
        files.len(),
        output_dir.display()
    );

    let converter = resolve_converter(config);
    let progress = config.progress_callback.clone();
    let total = files.len();

    let jobs = files.into_iter().enumerate().map(move |(idx, file)| {
        let converter = Arc::clone(&converter);
        let output_dir = Arc::clone(&output_dir);
        let progress = progress.clone();
        async move {
            process_one(
                converter.as_ref(),
                &file,
                idx + 1,
                total,
                &output_dir,
                progress.as_ref(),
            )
            .await
        }
    });

    if config.concurrency <= 1 {
        Ok(Box::pin(stream::iter(jobs).then(|job| job)))
    } else {
        Ok(Box::pin(stream::iter(jobs).buffer_unordered(config.concurrency)))
    }
}

/// Streaming equivalent of [`crate::convert::convert_folder`].
pub async fn convert_folder_stream(
    folder: impl AsRef<Path>,
    selection: &Selection,
    config: &ConversionConfig,
) -> Result<FileStream, Md2PdfError> {
    let folder = folder.as_ref();
    let listing = list_markdown_files(folder)?;
    let files = selection.resolve(&listing, folder)?;
    convert_stream(files, config.output_dir_for(folder), config).await
}
