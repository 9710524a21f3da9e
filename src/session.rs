//! Per-run selection state.
//!
//! A [`SelectionSession`] is opened from a folder path, collects the user's
//! choice, and is consumed by [`SelectionSession::run`]. Nothing outlives
//! the run except the returned [`BatchReport`]; a new interaction opens a
//! new session.
//!
//! ```text
//! open(folder) ──▶ select_all / pick … ──▶ run(config) ──▶ BatchReport
//! ```

use crate::config::{ConversionConfig, Selection};
use crate::convert::convert_files;
use crate::error::Md2PdfError;
use crate::output::BatchReport;
use crate::pipeline::discover::{list_markdown_files, InputFile};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// The folder listing plus what the user has chosen from it so far.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    folder: PathBuf,
    listing: Vec<InputFile>,
    select_all: bool,
    picks: BTreeSet<String>,
}

impl SelectionSession {
    /// Validate `folder` and list its Markdown files.
    ///
    /// # Errors
    /// [`Md2PdfError::InvalidFolder`] or [`Md2PdfError::NoMarkdownFiles`].
    pub fn open(folder: impl AsRef<Path>) -> Result<Self, Md2PdfError> {
        let folder = folder.as_ref().to_path_buf();
        let listing = list_markdown_files(&folder)?;
        Ok(Self {
            folder,
            listing,
            select_all: false,
            picks: BTreeSet::new(),
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Every Markdown file in the folder, sorted by name.
    pub fn files(&self) -> &[InputFile] {
        &self.listing
    }

    /// While set, every file is selected regardless of individual picks.
    pub fn set_select_all(&mut self, all: bool) {
        self.select_all = all;
    }

    pub fn is_select_all(&self) -> bool {
        self.select_all
    }

    /// Add a file by display name.
    pub fn pick(&mut self, name: &str) -> Result<(), Md2PdfError> {
        if !self.listing.iter().any(|f| f.name() == name) {
            return Err(Md2PdfError::UnknownFile {
                name: name.to_string(),
                folder: self.folder.clone(),
            });
        }
        self.picks.insert(name.to_string());
        Ok(())
    }

    /// Apply an "all" switch plus picks in one step. When `all` is set the
    /// picks are ignored, so a stale name cannot abort a select-all run.
    pub fn choose(&mut self, all: bool, picks: &[String]) -> Result<(), Md2PdfError> {
        self.set_select_all(all);
        if all {
            return Ok(());
        }
        for name in picks {
            self.pick(name)?;
        }
        Ok(())
    }

    /// Remove a pick; returns whether it was picked.
    pub fn unpick(&mut self, name: &str) -> bool {
        self.picks.remove(name)
    }

    /// Replace the picks with the files at `indices` of [`Self::files`].
    /// Out-of-range indices are ignored.
    pub fn pick_indices(&mut self, indices: &[usize]) {
        self.picks = indices
            .iter()
            .filter_map(|&i| self.listing.get(i))
            .map(|f| f.name().to_string())
            .collect();
    }

    pub fn selection(&self) -> Selection {
        Selection::from_choice(self.select_all, self.picks.iter().cloned().collect())
    }

    /// The files a run would convert right now, in listing order.
    pub fn selected(&self) -> Vec<InputFile> {
        if self.select_all {
            return self.listing.clone();
        }
        self.listing
            .iter()
            .filter(|f| self.picks.contains(f.name()))
            .cloned()
            .collect()
    }

    pub fn output_dir(&self, config: &ConversionConfig) -> PathBuf {
        config.output_dir_for(&self.folder)
    }

    /// Convert the current selection, consuming the session.
    ///
    /// # Errors
    /// [`Md2PdfError::EmptySelection`] when nothing is selected.
    pub async fn run(self, config: &ConversionConfig) -> Result<BatchReport, Md2PdfError> {
        let files = self.selected();
        convert_files(&files, &self.output_dir(config), config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn folder_with(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            fs::write(dir.path().join(name), "# doc").unwrap();
        }
        dir
    }

    fn names(files: &[InputFile]) -> Vec<&str> {
        files.iter().map(InputFile::name).collect()
    }

    #[test]
    fn open_lists_sorted_files() {
        let dir = folder_with(&["b.md", "a.md"]);
        let session = SelectionSession::open(dir.path()).unwrap();
        assert_eq!(names(session.files()), vec!["a.md", "b.md"]);
        assert!(session.selected().is_empty());
    }

    #[test]
    fn select_all_overrides_picks() {
        let dir = folder_with(&["a.md", "b.md", "c.md"]);
        let mut session = SelectionSession::open(dir.path()).unwrap();
        session.pick("b.md").unwrap();
        session.set_select_all(true);
        assert_eq!(session.selection(), Selection::All);
        assert_eq!(names(&session.selected()), vec!["a.md", "b.md", "c.md"]);

        session.set_select_all(false);
        assert_eq!(names(&session.selected()), vec!["b.md"]);
    }

    #[test]
    fn picks_by_index_follow_listing_order() {
        let dir = folder_with(&["a.md", "b.md", "c.md"]);
        let mut session = SelectionSession::open(dir.path()).unwrap();
        session.pick_indices(&[2, 0, 9]);
        assert_eq!(names(&session.selected()), vec!["a.md", "c.md"]);
        assert!(session.unpick("a.md"));
        assert!(!session.unpick("a.md"));
        assert_eq!(names(&session.selected()), vec!["c.md"]);
    }

    #[test]
    fn choose_all_ignores_unknown_picks() {
        let dir = folder_with(&["a.md", "b.md"]);
        let mut session = SelectionSession::open(dir.path()).unwrap();
        session
            .choose(true, &["nope.md".to_string()])
            .unwrap();
        assert_eq!(names(&session.selected()), vec!["a.md", "b.md"]);
    }

    #[test]
    fn choose_without_all_checks_picks() {
        let dir = folder_with(&["a.md", "b.md"]);
        let mut session = SelectionSession::open(dir.path()).unwrap();
        session.choose(false, &["b.md".to_string()]).unwrap();
        assert_eq!(names(&session.selected()), vec!["b.md"]);

        let err = session
            .choose(false, &["nope.md".to_string()])
            .unwrap_err();
        assert!(matches!(err, Md2PdfError::UnknownFile { ref name, .. } if name == "nope.md"));
    }

    #[test]
    fn unknown_pick_is_rejected() {
        let dir = folder_with(&["a.md"]);
        let mut session = SelectionSession::open(dir.path()).unwrap();
        assert!(matches!(
            session.pick("zzz.md"),
            Err(Md2PdfError::UnknownFile { .. })
        ));
    }

    #[tokio::test]
    async fn run_with_nothing_selected_is_rejected() {
        let dir = folder_with(&["a.md"]);
        let session = SelectionSession::open(dir.path()).unwrap();
        let out = session.output_dir(&ConversionConfig::default());
        let err = session.run(&ConversionConfig::default()).await.unwrap_err();
        assert!(matches!(err, Md2PdfError::EmptySelection));
        assert!(!out.exists());
    }
}
