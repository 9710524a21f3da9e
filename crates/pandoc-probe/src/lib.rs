//! # pandoc-probe
//!
//! Locate the external toolchain that `edgequake-md2pdf` drives: the
//! [Pandoc](https://pandoc.org) executable and a LaTeX PDF engine
//! (`xelatex` by default).
//!
//! ## How it works
//!
//! 1. If `PANDOC_PATH` is set and points to an existing file, that path wins.
//! 2. Otherwise `pandoc` is looked up on `PATH`.
//! 3. The PDF engine is always looked up on `PATH` by name.
//!
//! Nothing is downloaded or installed. When something is missing the caller
//! gets a [`ProbeError`] whose message carries the per-platform install hint
//! from [`install_hint`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pandoc_probe::{probe, locate_pandoc};
//!
//! let report = probe("xelatex");
//! if !report.is_ready() {
//!     eprintln!("{}", pandoc_probe::install_hint());
//! }
//!
//! let pandoc = locate_pandoc().expect("pandoc unavailable");
//! println!("using {}", pandoc.display());
//! ```
//!
//! ## Environment variable overrides
//!
//! - `PANDOC_PATH` — path to an existing pandoc executable; skips `PATH` lookup.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Environment variable naming an explicit pandoc executable.
pub const PANDOC_PATH_ENV: &str = "PANDOC_PATH";

/// Executable name looked up on `PATH` when no override is set.
pub const PANDOC_PROGRAM: &str = "pandoc";

/// PDF engine used when the caller does not choose one. `xelatex` handles
/// Unicode text and emoji through system fonts.
pub const DEFAULT_PDF_ENGINE: &str = "xelatex";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by pandoc-probe operations.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// No pandoc executable could be found.
    #[error("pandoc executable not found{}\n{}", override_note(.override_path), install_hint())]
    PandocNotFound { override_path: Option<PathBuf> },

    /// The requested PDF engine is not on `PATH`.
    #[error("PDF engine '{engine}' not found on PATH\n{}", install_hint())]
    EngineNotFound { engine: String },

    /// `pandoc --version` could not be run or produced no version line.
    #[error("Failed to query version from '{program}': {reason}")]
    VersionQuery { program: PathBuf, reason: String },
}

fn override_note(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" ({PANDOC_PATH_ENV}='{}' does not exist)", p.display()),
        None => String::new(),
    }
}

// ── Install hints ────────────────────────────────────────────────────────────

/// Platform-specific instructions for installing Pandoc and a LaTeX distribution.
pub fn install_hint() -> &'static str {
    match std::env::consts::OS {
        "windows" => {
            "Install Pandoc (https://pandoc.org/installing.html) and MiKTeX \
             (https://miktex.org/download), then make sure both are on PATH."
        }
        "macos" => {
            "Install Pandoc (brew install pandoc) and MacTeX \
             (https://www.tug.org/mactex/), then make sure both are on PATH."
        }
        _ => {
            "Install Pandoc (https://pandoc.org/installing.html) and TeX Live \
             (e.g. sudo apt-get install texlive-xetex texlive-fonts-recommended), \
             then make sure both are on PATH."
        }
    }
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Resolve the pandoc executable, honouring `PANDOC_PATH`.
pub fn locate_pandoc() -> Result<PathBuf, ProbeError> {
    let override_path = std::env::var_os(PANDOC_PATH_ENV).map(PathBuf::from);
    locate_pandoc_with(override_path.as_deref())
}

/// Resolve the pandoc executable from an explicit override, falling back to `PATH`.
///
/// An override that does not exist is not silently ignored when `PATH`
/// lookup also fails: the error names it so the user can fix the variable.
pub fn locate_pandoc_with(override_path: Option<&Path>) -> Result<PathBuf, ProbeError> {
    if let Some(p) = override_path {
        if p.is_file() {
            return Ok(p.to_path_buf());
        }
    }

    which::which(PANDOC_PROGRAM).map_err(|_| ProbeError::PandocNotFound {
        override_path: override_path.map(Path::to_path_buf),
    })
}

/// Resolve a PDF engine executable (e.g. `xelatex`, `lualatex`) on `PATH`.
pub fn locate_engine(engine: &str) -> Result<PathBuf, ProbeError> {
    which::which(engine).map_err(|_| ProbeError::EngineNotFound {
        engine: engine.to_string(),
    })
}

/// Run `<program> --version` and return its first line, e.g. `pandoc 3.1.11`.
pub fn pandoc_version(program: &Path) -> Result<String, ProbeError> {
    let output = Command::new(program)
        .arg("--version")
        .output()
        .map_err(|e| ProbeError::VersionQuery {
            program: program.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(ProbeError::VersionQuery {
            program: program.to_path_buf(),
            reason: format!("exited with {}", output.status),
        });
    }

    parse_version_line(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
        ProbeError::VersionQuery {
            program: program.to_path_buf(),
            reason: "empty version output".to_string(),
        }
    })
}

/// First non-empty line of `--version` output, trimmed.
pub fn parse_version_line(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

/// Snapshot of the toolchain on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainReport {
    /// Resolved pandoc executable, if any.
    pub pandoc: Option<PathBuf>,
    /// First line of `pandoc --version`, if it could be queried.
    pub pandoc_version: Option<String>,
    /// Engine name that was probed.
    pub engine: String,
    /// Resolved engine executable, if any.
    pub engine_path: Option<PathBuf>,
}

impl ToolchainReport {
    /// `true` when both pandoc and the engine were found.
    pub fn is_ready(&self) -> bool {
        self.pandoc.is_some() && self.engine_path.is_some()
    }
}

/// Probe pandoc and `engine` without failing; missing pieces come back as `None`.
pub fn probe(engine: &str) -> ToolchainReport {
    let override_path = std::env::var_os(PANDOC_PATH_ENV).map(PathBuf::from);
    probe_with(override_path.as_deref(), engine)
}

/// Like [`probe`], with the pandoc override passed in instead of read from the environment.
pub fn probe_with(pandoc_override: Option<&Path>, engine: &str) -> ToolchainReport {
    let pandoc = locate_pandoc_with(pandoc_override).ok();
    let pandoc_version = pandoc.as_deref().and_then(|p| pandoc_version(p).ok());
    ToolchainReport {
        pandoc,
        pandoc_version,
        engine: engine.to_string(),
        engine_path: locate_engine(engine).ok(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
