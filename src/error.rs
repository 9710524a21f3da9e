//! Error types for the edgequake-md2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Md2PdfError`] — **Fatal**: the batch cannot start at all (bad folder,
//!   no Markdown files, nothing selected, output folder not writable).
//!   Returned as `Err(Md2PdfError)` from the top-level `convert*` functions.
//!
//! * [`FileError`] — **Non-fatal**: a single file failed to convert (pandoc
//!   missing, LaTeX error, bad Markdown construct) but every other file in
//!   the selection is still attempted. Stored inside
//!   [`crate::output::ConversionResult::Failure`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-md2pdf library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::output::FileResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Md2PdfError {
    // ── Selection errors ──────────────────────────────────────────────────
    /// The folder path does not exist or is not a directory.
    #[error("The provided path is not a valid folder: '{path}'\nPlease check it and try again.")]
    InvalidFolder { path: PathBuf },

    /// The folder is valid but holds no `.md` files.
    #[error("No Markdown (.md) files found in '{folder}'")]
    NoMarkdownFiles { folder: PathBuf },

    /// Conversion was requested with nothing selected.
    #[error("Please select at least one file to convert.")]
    EmptySelection,

    /// A picked file name is not part of the folder listing.
    #[error("'{name}' is not a Markdown file in '{folder}'")]
    UnknownFile { name: String, folder: PathBuf },

    /// Listing the folder failed part-way (permissions, I/O).
    #[error("Failed to read folder '{path}': {source}")]
    ReadFolderFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create the shared output folder.
    #[error("Failed to create output folder '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Some files succeeded but at least one failed.
    ///
    /// Returned by [`crate::output::BatchReport::into_result`] when the
    /// caller wants to treat any file failure as an error.
    #[error("{failed}/{total} files failed to convert")]
    PartialFailure {
        success: usize,
        failed: usize,
        total: usize,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single file.
///
/// The batch continues with the next file regardless.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The pandoc executable could not be started because it was not found.
    #[error("Error converting {file}: '{program}' could not be started: not found")]
    ToolchainMissing { file: String, program: String },

    /// Pandoc exited unsuccessfully; `detail` is its diagnostic output.
    #[error("Error converting {file}: {detail}")]
    ConversionFailed {
        file: String,
        code: Option<i32>,
        detail: String,
    },

    /// Spawning or waiting on the process failed for another reason.
    #[error("Error converting {file}: {detail}")]
    Spawn { file: String, detail: String },

    /// The optional per-file timeout elapsed; the process was killed.
    #[error("Error converting {file}: timed out after {secs}s")]
    Timeout { file: String, secs: u64 },

    /// Pandoc reported success but the PDF is not on disk.
    #[error("Error converting {file}: pandoc succeeded but '{path}' was not written")]
    MissingOutput { file: String, path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_display() {
        let e = Md2PdfError::PartialFailure {
            success: 2,
            failed: 1,
            total: 3,
        };
        assert!(e.to_string().contains("1/3"), "got: {e}");
    }

    #[test]
    fn invalid_folder_names_path() {
        let e = Md2PdfError::InvalidFolder {
            path: PathBuf::from("/no/such/dir"),
        };
        assert!(e.to_string().contains("/no/such/dir"));
    }

    #[test]
    fn conversion_failed_names_file_and_detail() {
        let e = FileError::ConversionFailed {
            file: "c.md".into(),
            code: Some(43),
            detail: "Error producing PDF.".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("c.md"));
        assert!(msg.contains("Error producing PDF."));
    }

    #[test]
    fn every_file_error_names_its_file() {
        let errors = [
            FileError::ToolchainMissing {
                file: "c.md".into(),
                program: "/nonexistent/pandoc".into(),
            },
            FileError::ConversionFailed {
                file: "c.md".into(),
                code: Some(43),
                detail: "Error producing PDF.".into(),
            },
            FileError::Spawn {
                file: "c.md".into(),
                detail: "permission denied".into(),
            },
            FileError::Timeout {
                file: "c.md".into(),
                secs: 5,
            },
            FileError::MissingOutput {
                file: "c.md".into(),
                path: PathBuf::from("/docs/output_pdfs/c.pdf"),
            },
        ];
        for e in errors {
            let msg = e.to_string();
            assert!(msg.starts_with("Error converting c.md: "), "got: {msg}");
        }
    }

    #[test]
    fn toolchain_missing_names_file_and_program() {
        let e = FileError::ToolchainMissing {
            file: "c.md".into(),
            program: "/nonexistent/pandoc".into(),
        };
        assert_eq!(
            e.to_string(),
            "Error converting c.md: '/nonexistent/pandoc' could not be started: not found"
        );
    }
}
