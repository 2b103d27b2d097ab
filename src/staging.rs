//! Shared staging file for incoming submissions.
//!
//! A submission is copied into a single staging file, extracted and
//! reconstructed while the staging lock is held, so concurrent submissions
//! never read each other's image.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Temporary directory holding one submission at a time.
pub struct StagingArea {
    dir: TempDir,
    lock: Mutex<()>,
}

impl StagingArea {
    /// Creates a fresh staging directory, removed again on drop.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("drawn-forecast-")
            .tempdir()
            .context("Failed to create staging directory")?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// Path of the staging file for a submission with the given extension.
    fn staged_path(&self, extension: Option<&str>) -> PathBuf {
        let name = match extension {
            Some(ext) => format!("submission.{}", ext),
            None => "submission".to_string(),
        };
        self.dir.path().join(name)
    }

    /// Copies `source` into the staging file and runs `f` on it while holding
    /// the staging lock. The staged copy is removed before the lock is released.
    pub fn with_staged<T>(&self, source: &Path, f: impl FnOnce(&Path) -> Result<T>) -> Result<T> {
        // Nothing is guarded by the lock itself; poisoning is ignored.
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let staged = self.staged_path(source.extension().and_then(|e| e.to_str()));
        fs::copy(source, &staged).context(format!(
            "Failed to stage submission: {}",
            source.display()
        ))?;
        debug!("Staged {} at {}", source.display(), staged.display());

        let result = f(&staged);
        if let Err(e) = fs::remove_file(&staged) {
            warn!("Failed to remove staged submission {}: {}", staged.display(), e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_staged_copy_visible_then_removed() {
        let staging = StagingArea::new().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("drawing.png");
        fs::write(&source, b"pixels").unwrap();

        let staged = staging
            .with_staged(&source, |path| {
                assert_eq!(fs::read(path).unwrap(), b"pixels");
                assert_eq!(path.extension().unwrap(), "png");
                Ok(path.to_path_buf())
            })
            .unwrap();

        assert!(!staged.exists());
    }

    #[test]
    fn test_failed_cleanup_keeps_result() {
        let staging = StagingArea::new().unwrap();
        let source = tempfile::NamedTempFile::new().unwrap();

        let result = staging.with_staged(source.path(), |path| {
            fs::remove_file(path)?;
            Ok(42)
        });

        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_missing_source_fails() {
        let staging = StagingArea::new().unwrap();
        let result = staging.with_staged(Path::new("/nonexistent/drawing.png"), |_| Ok(()));
        assert!(result.is_err());
    }

    #[test]
    fn test_closure_error_propagates() {
        let staging = StagingArea::new().unwrap();
        let source = tempfile::NamedTempFile::new().unwrap();

        let result: Result<()> =
            staging.with_staged(source.path(), |_| Err(anyhow::anyhow!("No line was found.")));

        assert_eq!(result.unwrap_err().to_string(), "No line was found.");
    }

    #[test]
    fn test_submissions_do_not_overlap() {
        let staging = StagingArea::new().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let active = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for i in 0..4 {
                let source = source_dir.path().join(format!("{}.png", i));
                fs::write(&source, format!("submission {}", i)).unwrap();
                let (staging, active) = (&staging, &active);
                s.spawn(move || {
                    staging
                        .with_staged(&source, |path| {
                            assert_eq!(active.fetch_add(1, Ordering::SeqCst), 0);
                            std::thread::sleep(Duration::from_millis(20));
                            let content = fs::read_to_string(path).unwrap();
                            assert_eq!(content, format!("submission {}", i));
                            active.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .unwrap();
                });
            }
        });
    }
}
