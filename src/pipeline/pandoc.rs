//! Converter invocation: one pandoc run per Markdown file.
//!
//! The batch runner only talks to [`DocumentConverter`], so tests and
//! embedders can swap pandoc for anything that turns a file into a PDF.
//! [`PandocConverter`] is the production implementation.
//!
//! A converter never panics or propagates: every problem comes back as a
//! [`FileError`] and [`convert_file`] folds it into a
//! [`ConversionResult::Failure`] so one bad file cannot stop the batch.
//! Partial artifacts left by a failed pandoc run are not cleaned up.

use crate::config::ConversionConfig;
use crate::error::FileError;
use crate::output::ConversionResult;
use crate::pipeline::discover::InputFile;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Turns one Markdown file into one PDF.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Write `output` from `input`, or explain why not.
    async fn convert(&self, input: &InputFile, output: &Path) -> Result<(), FileError>;
}

/// `<output_dir>/<stem>.pdf`.
pub fn output_path_for(input: &InputFile, output_dir: &Path) -> PathBuf {
    output_dir.join(format!("{}.pdf", input.stem()))
}

/// Convert one file into `output_dir`, never failing the caller.
pub async fn convert_file(
    converter: &dyn DocumentConverter,
    input: &InputFile,
    output_dir: &Path,
) -> ConversionResult {
    let output = output_path_for(input, output_dir);
    debug!("Converting {} → {}", input.path().display(), output.display());

    match converter.convert(input, &output).await {
        Ok(()) => ConversionResult::Success { output },
        Err(error) => {
            warn!("{}", error);
            ConversionResult::Failure { error }
        }
    }
}

/// Runs `pandoc <input> -o <output> --pdf-engine=<engine> [extra…]`.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: PathBuf,
    pdf_engine: String,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
}

impl PandocConverter {
    pub fn new(program: impl Into<PathBuf>, pdf_engine: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            pdf_engine: pdf_engine.into(),
            extra_args: Vec::new(),
            timeout: None,
        }
    }

    /// Build from config, resolving the executable the same way `--check` does.
    ///
    /// When pandoc cannot be located the bare program name is kept, so the
    /// spawn fails per file with [`FileError::ToolchainMissing`].
    pub fn from_config(config: &ConversionConfig) -> Self {
        let program = config.pandoc_path.clone().unwrap_or_else(|| {
            pandoc_probe::locate_pandoc()
                .unwrap_or_else(|_| PathBuf::from(pandoc_probe::PANDOC_PROGRAM))
        });
        Self {
            program,
            pdf_engine: config.pdf_engine.clone(),
            extra_args: config.extra_args.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for one conversion.
    pub fn args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            input.as_os_str().to_owned(),
            "-o".into(),
            output.as_os_str().to_owned(),
            format!("--pdf-engine={}", self.pdf_engine).into(),
        ];
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    async fn run(&self, input: &InputFile, output: &Path) -> Result<Output, FileError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(input.path(), output))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let spawned = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(FileError::Timeout {
                        file: input.name().to_string(),
                        secs: limit.as_secs(),
                    })
                }
            },
            None => cmd.output().await,
        };

        spawned.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FileError::ToolchainMissing {
                    file: input.name().to_string(),
                    program: self.program.display().to_string(),
                }
            } else {
                FileError::Spawn {
                    file: input.name().to_string(),
                    detail: e.to_string(),
                }
            }
        })
    }
}

#[async_trait]
impl DocumentConverter for PandocConverter {
    async fn convert(&self, input: &InputFile, output: &Path) -> Result<(), FileError> {
        let result = self.run(input, output).await?;

        if !result.status.success() {
            return Err(FileError::ConversionFailed {
                file: input.name().to_string(),
                code: result.status.code(),
                detail: diagnostic(&result),
            });
        }

        if !output.is_file() {
            return Err(FileError::MissingOutput {
                file: input.name().to_string(),
                path: output.to_path_buf(),
            });
        }

        Ok(())
    }
}

/// Best human-readable explanation of a failed run: stderr, then stdout,
/// then the bare exit status.
fn diagnostic(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return stderr.trim().to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        return stdout.trim().to_string();
    }
    format!("pandoc exited with {}", output.status)
}
