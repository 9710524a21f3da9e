//! Configuration types for Markdown-to-PDF batch conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Which files take part in a run is a
//! separate concern, expressed by [`Selection`].

use crate::error::Md2PdfError;
use crate::pipeline::discover::InputFile;
use crate::pipeline::pandoc::DocumentConverter;
use crate::progress::ProgressCallback;
use pandoc_probe::DEFAULT_PDF_ENGINE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the folder, created inside the input folder, that receives the PDFs.
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "output_pdfs";

/// Configuration for a batch conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_md2pdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .pdf_engine("lualatex")
///     .timeout_secs(300)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Explicit pandoc executable. If None, resolved via `PANDOC_PATH` or `PATH`.
    pub pandoc_path: Option<PathBuf>,

    /// Value passed as `--pdf-engine`. Default: `xelatex`, for Unicode and emoji.
    pub pdf_engine: String,

    /// Extra arguments appended to every pandoc invocation.
    pub extra_args: Vec<String>,

    /// Output folder name, relative to the input folder. Default: `output_pdfs`.
    pub output_dir_name: String,

    /// Files converted at the same time. Default: 1 (strictly sequential).
    ///
    /// Results are always reported in selection order, whatever the value.
    pub concurrency: usize,

    /// Per-file timeout in seconds. Default: None (wait for pandoc forever).
    pub timeout_secs: Option<u64>,

    /// Pre-constructed converter. Takes precedence over the pandoc settings above.
    pub converter: Option<Arc<dyn DocumentConverter>>,

    /// Receives per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            pandoc_path: None,
            pdf_engine: DEFAULT_PDF_ENGINE.to_string(),
            extra_args: Vec::new(),
            output_dir_name: DEFAULT_OUTPUT_DIR_NAME.to_string(),
            concurrency: 1,
            timeout_secs: None,
            converter: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("pandoc_path", &self.pandoc_path)
            .field("pdf_engine", &self.pdf_engine)
            .field("extra_args", &self.extra_args)
            .field("output_dir_name", &self.output_dir_name)
            .field("concurrency", &self.concurrency)
            .field("timeout_secs", &self.timeout_secs)
            .field(
                "converter",
                &self.converter.as_ref().map(|_| "<dyn DocumentConverter>"),
            )
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// `<folder>/<output_dir_name>`.
    pub fn output_dir_for(&self, folder: &Path) -> PathBuf {
        folder.join(&self.output_dir_name)
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn pandoc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pandoc_path = Some(path.into());
        self
    }

    pub fn pdf_engine(mut self, engine: impl Into<String>) -> Self {
        self.config.pdf_engine = engine.into();
        self
    }

    pub fn extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    pub fn extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn output_dir_name(mut self, name: impl Into<String>) -> Self {
        self.config.output_dir_name = name.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn converter(mut self, converter: Arc<dyn DocumentConverter>) -> Self {
        self.config.converter = Some(converter);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2PdfError> {
        let c = &self.config;
        if c.pdf_engine.trim().is_empty() {
            return Err(Md2PdfError::InvalidConfig(
                "PDF engine must not be empty".into(),
            ));
        }
        let name = c.output_dir_name.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(Md2PdfError::InvalidConfig(format!(
                "Output folder name must be a single path component, got '{name}'"
            )));
        }
        if c.timeout_secs == Some(0) {
            return Err(Md2PdfError::InvalidConfig(
                "Timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Selection ────────────────────────────────────────────────────────────

/// Which of the discovered files take part in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// Every file in the listing.
    All,
    /// Files picked by name (e.g. `notes.md`).
    Files(Vec<String>),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Files(Vec::new())
    }
}

impl Selection {
    /// Combine the "select all" switch with individual picks. `all` wins.
    pub fn from_choice(all: bool, picks: Vec<String>) -> Self {
        if all {
            Selection::All
        } else {
            Selection::Files(picks)
        }
    }

    /// Resolve against a folder listing, keeping listing order and dropping
    /// duplicate picks.
    ///
    /// An empty pick list resolves to an empty selection; rejecting it is the
    /// batch runner's job.
    ///
    /// # Errors
    /// [`Md2PdfError::UnknownFile`] for a pick that is not in `listing`.
    pub fn resolve(
        &self,
        listing: &[InputFile],
        folder: &Path,
    ) -> Result<Vec<InputFile>, Md2PdfError> {
        match self {
            Selection::All => Ok(listing.to_vec()),
            Selection::Files(picks) => {
                let wanted: BTreeSet<&str> = picks.iter().map(String::as_str).collect();
                if let Some(unknown) = wanted
                    .iter()
                    .find(|name| !listing.iter().any(|f| f.name() == **name))
                {
                    return Err(Md2PdfError::UnknownFile {
                        name: unknown.to_string(),
                        folder: folder.to_path_buf(),
                    });
                }
                Ok(listing
                    .iter()
                    .filter(|f| wanted.contains(f.name()))
                    .cloned()
                    .collect())
            }
        }
    }
}
