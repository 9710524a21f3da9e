//! Progress-callback trait for per-file conversion events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the batch runner works through the selection.
//!
//! Callers can forward events to a terminal progress bar, a channel, or a
//! log, without the library knowing how the host application presents them.
//!
//! # Example
//!
//! ```rust
//! use edgequake_md2pdf::{BatchProgressCallback, ConversionConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, position: usize, total: usize, output: &Path) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} → {}", position, total, output.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the batch runner as it processes each file.
///
/// Implementations must be `Send + Sync`: with `concurrency > 1` the
/// per-file methods may be called from different tasks. All methods have
/// default no-op implementations so callers only override what they need.
///
/// Exactly one of `on_file_complete` / `on_file_error` fires per file, after
/// the converter returns, so a progress bar advanced in both stays in step
/// with `completed / total`.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once, after the output folder exists and before the first file.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before the converter runs for a file.
    ///
    /// # Arguments
    /// * `position` — 1-indexed position in the selection
    /// * `total`    — number of selected files
    /// * `name`     — display name of the source file
    fn on_file_start(&self, position: usize, total: usize, name: &str) {
        let _ = (position, total, name);
    }

    /// Called when a file converted successfully.
    fn on_file_complete(&self, position: usize, total: usize, output: &Path) {
        let _ = (position, total, output);
    }

    /// Called when a file failed; the batch continues.
    fn on_file_error(&self, position: usize, total: usize, name: &str, error: &str) {
        let _ = (position, total, name, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        success_total: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_file_start(&self, _position: usize, _total: usize, _name: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _position: usize, _total: usize, _output: &Path) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _position: usize, _total: usize, _name: &str, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total_files: usize, success_count: usize) {
            self.success_total.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_file_start(1, 2, "a.md");
        cb.on_file_complete(1, 2, Path::new("/tmp/a.pdf"));
        cb.on_file_error(2, 2, "b.md", "boom");
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_file_start(1, 2, "a.md");
        tracker.on_file_complete(1, 2, Path::new("/tmp/a.pdf"));
        tracker.on_file_start(2, 2, "b.md");
        tracker.on_file_error(2, 2, "b.md", "pandoc missing");
        tracker.on_batch_complete(2, 1);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.success_total.load(Ordering::SeqCst), 1);
    }
}
