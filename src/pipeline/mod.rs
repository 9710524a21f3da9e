//! Pipeline stages for Markdown-to-PDF batch conversion.
//!
//! ```text
//! folder ──▶ discover ──▶ (selection) ──▶ pandoc ──▶ output_pdfs/<stem>.pdf
//! ```
//!
//! 1. [`discover`] — validate the folder and list its `.md` files, sorted
//! 2. [`pandoc`]   — run the external converter for one file; failures are
//!    returned as values, never propagated

pub mod discover;
pub mod pandoc;
