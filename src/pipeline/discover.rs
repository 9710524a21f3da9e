//! Folder discovery: validate a user-supplied folder and list its Markdown files.
//!
//! Only regular files directly inside the folder whose extension is exactly
//! `md` are listed. Subfolders are never descended into. The listing is
//! sorted by file name so repeated runs over the same folder present files
//! in the same order.

use crate::error::Md2PdfError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension (without the dot) that marks a file as Markdown.
pub const MARKDOWN_EXTENSION: &str = "md";

/// A Markdown file found in the selected folder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InputFile {
    path: PathBuf,
    name: String,
}

impl InputFile {
    /// Wrap a path; the display name is its final component.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name shown to the user, e.g. `notes.md`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name without the extension, used to name the PDF.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// `true` if `path` has the Markdown extension.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == MARKDOWN_EXTENSION)
}

/// Check that `folder` exists and is a directory.
pub fn validate_folder(folder: &Path) -> Result<(), Md2PdfError> {
    if folder.is_dir() {
        Ok(())
    } else {
        Err(Md2PdfError::InvalidFolder {
            path: folder.to_path_buf(),
        })
    }
}

/// List the Markdown files directly inside `folder`, sorted by name.
///
/// # Errors
/// - [`Md2PdfError::InvalidFolder`] when `folder` is not an existing directory
/// - [`Md2PdfError::NoMarkdownFiles`] when the folder holds no `.md` files
/// - [`Md2PdfError::ReadFolderFailed`] when the directory cannot be read
pub fn list_markdown_files(folder: impl AsRef<Path>) -> Result<Vec<InputFile>, Md2PdfError> {
    let folder = folder.as_ref();
    validate_folder(folder)?;

    let read_err = |source| Md2PdfError::ReadFolderFailed {
        path: folder.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && is_markdown(&path) {
            files.push(InputFile::new(path));
        }
    }

    if files.is_empty() {
        return Err(Md2PdfError::NoMarkdownFiles {
            folder: folder.to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    debug!("Found {} Markdown files in {}", files.len(), folder.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn lists_only_top_level_markdown_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.md", "a.md", "b.md", "notes.txt", "README.MD"] {
            fs::write(dir.path().join(name), "# x").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/d.md"), "# d").unwrap();
        fs::create_dir(dir.path().join("folder.md")).unwrap();

        let files = list_markdown_files(dir.path()).unwrap();
        let names: Vec<&str> = files.iter().map(InputFile::name).collect();
        assert_eq!(names, vec!["a.md", "b.md", "c.md"]);
    }

    #[test]
    fn missing_folder_is_invalid() {
        let err = list_markdown_files("/definitely/not/a/real/folder").unwrap_err();
        assert!(matches!(err, Md2PdfError::InvalidFolder { .. }));
    }

    #[test]
    fn file_path_is_invalid_folder() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let err = list_markdown_files(tmp.path()).unwrap_err();
        assert!(matches!(err, Md2PdfError::InvalidFolder { .. }));
    }

    #[test]
    fn folder_without_markdown_reports_no_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let err = list_markdown_files(dir.path()).unwrap_err();
        assert!(matches!(err, Md2PdfError::NoMarkdownFiles { .. }));
    }

    #[test]
    fn stem_drops_extension() {
        let f = InputFile::new("/docs/release.notes.md");
        assert_eq!(f.name(), "release.notes.md");
        assert_eq!(f.stem(), "release.notes");
    }
}
