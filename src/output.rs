//! Result types produced by a batch run.
//!
//! A run yields one [`FileResult`] per selected file, in selection order,
//! wrapped in a [`BatchReport`] together with aggregate [`BatchStats`].
//! Every type here is `Serialize` so the CLI can emit the report as JSON.

use crate::error::{FileError, Md2PdfError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// MIME type attached to every [`DownloadOffer`].
pub const PDF_MIME: &str = "application/pdf";

/// Outcome of converting one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionResult {
    /// The PDF was written to `output`.
    Success { output: PathBuf },
    /// The converter failed; nothing is guaranteed to exist on disk.
    Failure { error: FileError },
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success { .. })
    }

    pub fn output(&self) -> Option<&Path> {
        match self {
            ConversionResult::Success { output } => Some(output),
            ConversionResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&FileError> {
        match self {
            ConversionResult::Success { .. } => None,
            ConversionResult::Failure { error } => Some(error),
        }
    }
}

/// Per-file record in a [`BatchReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// 1-indexed position in the selection.
    pub position: usize,
    /// Source Markdown file.
    pub input: PathBuf,
    /// Display name of the source (file name only).
    pub name: String,
    pub result: ConversionResult,
    /// Wall-clock time spent in the converter.
    pub duration_ms: u64,
}

impl FileResult {
    /// A download offer when this file converted successfully.
    pub fn download_offer(&self) -> Option<DownloadOffer> {
        self.result.output().map(DownloadOffer::for_path)
    }
}

/// Something the presentation layer can hand to the user to retrieve a PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOffer {
    pub path: PathBuf,
    pub file_name: String,
    pub mime: String,
    /// Size on disk at the time the offer was made, if readable.
    pub size_bytes: Option<u64>,
}

impl DownloadOffer {
    pub fn for_path(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            mime: PDF_MIME.to_string(),
            size_bytes: std::fs::metadata(path).ok().map(|m| m.len()),
        }
    }
}

/// Aggregate counters for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_files: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
}

impl BatchStats {
    /// Fraction of the selection that has been attempted, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        progress_fraction(self.succeeded + self.failed, self.total_files)
    }
}

/// `completed / total`, clamped to `1.0`. An empty total counts as done.
pub fn progress_fraction(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 1.0;
    }
    (completed as f64 / total as f64).min(1.0)
}

/// Everything a finished batch produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Folder every PDF of this run was written into.
    pub output_dir: PathBuf,
    /// One entry per selected file, in selection order.
    pub files: Vec<FileResult>,
    pub stats: BatchStats,
}

impl BatchReport {
    /// Download offers for every successful file, in selection order.
    pub fn downloads(&self) -> Vec<DownloadOffer> {
        self.files.iter().filter_map(FileResult::download_offer).collect()
    }

    /// Failed files paired with their error, in selection order.
    pub fn failures(&self) -> impl Iterator<Item = (&FileResult, &FileError)> {
        self.files
            .iter()
            .filter_map(|f| f.result.error().map(|e| (f, e)))
    }

    pub fn progress(&self) -> f64 {
        self.stats.progress()
    }

    /// Turn any per-file failure into [`Md2PdfError::PartialFailure`].
    pub fn into_result(self) -> Result<Self, Md2PdfError> {
        if self.stats.failed > 0 {
            return Err(Md2PdfError::PartialFailure {
                success: self.stats.succeeded,
                failed: self.stats.failed,
                total: self.stats.total_files,
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(position: usize, name: &str, ok: bool) -> FileResult {
        let input = PathBuf::from("/docs").join(name);
        let result = if ok {
            ConversionResult::Success {
                output: PathBuf::from("/docs/output_pdfs").join(name.replace(".md", ".pdf")),
            }
        } else {
            ConversionResult::Failure {
                error: FileError::ToolchainMissing {
                    file: name.to_string(),
                    program: "pandoc".into(),
                },
            }
        };
        FileResult {
            position,
            input,
            name: name.to_string(),
            result,
            duration_ms: 1,
        }
    }

    #[test]
    fn progress_fraction_edges() {
        assert_eq!(progress_fraction(0, 0), 1.0);
        assert_eq!(progress_fraction(1, 4), 0.25);
        assert_eq!(progress_fraction(4, 4), 1.0);
        assert_eq!(progress_fraction(5, 4), 1.0);
    }

    #[test]
    fn report_splits_downloads_and_failures() {
        let report = BatchReport {
            output_dir: PathBuf::from("/docs/output_pdfs"),
            files: vec![result(1, "a.md", true), result(2, "c.md", false)],
            stats: BatchStats {
                total_files: 2,
                succeeded: 1,
                failed: 1,
                total_duration_ms: 2,
            },
        };

        let downloads = report.downloads();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].path, PathBuf::from("/docs/output_pdfs/a.pdf"));
        assert_eq!(downloads[0].file_name, "a.pdf");
        assert_eq!(downloads[0].mime, PDF_MIME);

        let failed: Vec<&str> = report.failures().map(|(f, _)| f.name.as_str()).collect();
        assert_eq!(failed, vec!["c.md"]);
        assert_eq!(report.progress(), 1.0);

        let err = report.into_result().unwrap_err();
        assert!(matches!(
            err,
            Md2PdfError::PartialFailure {
                success: 1,
                failed: 1,
                total: 2
            }
        ));
    }

    #[test]
    fn result_serialises_with_status_tag() {
        let json = serde_json::to_string(&result(1, "a.md", true).result).unwrap();
        assert!(json.contains("\"status\":\"success\""), "got: {json}");
    }
}
