//! # edgequake-md2pdf
//!
//! Batch-convert a folder of Markdown files to PDF with
//! [Pandoc](https://pandoc.org) and a LaTeX engine.
//!
//! This crate does no Markdown parsing or PDF layout of its own. It finds
//! the `.md` files in a folder, lets the caller choose some or all of them,
//! runs pandoc once per file, and reports what happened to each one. A
//! failed file never stops the rest of the batch.
//!
//! ## Pipeline Overview
//!
//! ```text
//! folder
//!  │
//!  ├─ 1. Discover  list *.md directly in the folder, sorted by name
//!  ├─ 2. Select    all files, or picks by name (all wins)
//!  ├─ 3. Prepare   create <folder>/output_pdfs if absent
//!  ├─ 4. Convert   pandoc <file> -o output_pdfs/<stem>.pdf --pdf-engine=xelatex
//!  └─ 5. Report    per-file success / failure + download offers
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_md2pdf::{convert_folder, ConversionConfig, Selection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let report = convert_folder("docs", &Selection::All, &config).await?;
//!     for offer in report.downloads() {
//!         println!("{}", offer.path.display());
//!     }
//!     for (file, error) in report.failures() {
//!         eprintln!("{}: {}", file.name, error);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Prerequisites
//!
//! Pandoc and a LaTeX distribution providing the chosen engine (`xelatex`
//! by default) must be installed. [`pandoc_probe::probe`] reports what is
//! available; set `PANDOC_PATH` to use a pandoc that is not on `PATH`.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2pdf` binary (clap + dialoguer + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod session;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, Selection, DEFAULT_OUTPUT_DIR_NAME};
pub use convert::{
    convert_files, convert_folder, convert_folder_sync, convert_markdown, output_collisions,
    prepare_output_dir,
};
pub use error::{FileError, Md2PdfError};
pub use output::{BatchReport, BatchStats, ConversionResult, DownloadOffer, FileResult, PDF_MIME};
pub use pipeline::discover::{list_markdown_files, InputFile};
pub use pipeline::pandoc::{convert_file, output_path_for, DocumentConverter, PandocConverter};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::SelectionSession;
pub use stream::{convert_folder_stream, convert_stream, FileStream};

pub use async_trait::async_trait;
pub use pandoc_probe;
