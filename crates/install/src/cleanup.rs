//! Temporary artifact cleanup

use distro_config::CleanupConfig;
use distro_errors::Error;
use distro_events::{AppEvent, CleanupEvent, EventEmitter, EventSender, SweepMode};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::task::JoinHandle;

/// Outcome of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: Vec<PathBuf>,
    /// Old enough to go but still referenced by the install queue
    pub protected: usize,
}

/// Owns the temporary artifact directory
///
/// Only files named `<prefix>*.<extension>` directly inside the directory
/// are ever touched.
#[derive(Debug, Clone)]
pub struct CleanupSweeper {
    dir: PathBuf,
    prefix: String,
    extension: String,
    stale_after: Duration,
    deferred_delay: Duration,
    tx: Option<EventSender>,
}

impl EventEmitter for CleanupSweeper {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl CleanupSweeper {
    pub fn new(dir: impl Into<PathBuf>, config: &CleanupConfig) -> Self {
        Self {
            dir: dir.into(),
            prefix: config.artifact_prefix.clone(),
            extension: config.artifact_extension.clone(),
            stale_after: config.stale_after(),
            deferred_delay: config.deferred_delete(),
            tx: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the artifact directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn prepare(&self) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::io_with_path(&e, &self.dir))
    }

    /// Fresh, unique artifact path inside the directory
    #[must_use]
    pub fn allocate(&self) -> PathBuf {
        self.dir.join(format!(
            "{}{}.{}",
            self.prefix,
            uuid::Uuid::new_v4().simple(),
            self.extension
        ))
    }

    /// Whether `path` is one of our temporary artifacts
    #[must_use]
    pub fn is_artifact(&self, path: &Path) -> bool {
        if path.parent() != Some(self.dir.as_path()) {
            return false;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        name.starts_with(&self.prefix)
            && path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str())
    }

    async fn artifacts(&self) -> Result<Vec<PathBuf>, Error> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io_with_path(&e, &self.dir)),
        };

        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if self.is_artifact(&path) && entry.file_type().await?.is_file() {
                found.push(path);
            }
        }
        Ok(found)
    }

    async fn remove(&self, path: &Path, mode: SweepMode) -> bool {
        match fs::remove_file(path).await {
            Ok(()) => {
                self.emit(AppEvent::Cleanup(CleanupEvent::FileDeleted {
                    path: path.to_path_buf(),
                    mode,
                }));
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove artifact");
                false
            }
        }
    }

    fn report(&self, mode: SweepMode, result: &Result<SweepReport, Error>) {
        match result {
            Ok(report) => self.emit(AppEvent::Cleanup(CleanupEvent::SweepCompleted {
                mode,
                removed: report.removed.len(),
                protected: report.protected,
            })),
            Err(e) => self.emit(AppEvent::Cleanup(CleanupEvent::SweepFailed {
                mode,
                message: e.reason(),
            })),
        }
    }

    /// Delete artifacts older than the grace period that are not `protected`
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed.
    pub async fn sweep_stale(&self, protected: &HashSet<PathBuf>) -> Result<SweepReport, Error> {
        let result = self.sweep_stale_inner(protected).await;
        self.report(SweepMode::Stale, &result);
        result
    }

    async fn sweep_stale_inner(&self, protected: &HashSet<PathBuf>) -> Result<SweepReport, Error> {
        let now = SystemTime::now();
        let mut report = SweepReport::default();

        for path in self.artifacts().await? {
            let Ok(modified) = fs::metadata(&path).await.and_then(|m| m.modified()) else {
                continue;
            };
            let age = now.duration_since(modified).unwrap_or_default();
            if age <= self.stale_after {
                continue;
            }
            if protected.contains(&path) {
                report.protected += 1;
                continue;
            }
            if self.remove(&path, SweepMode::Stale).await {
                report.removed.push(path);
            }
        }
        Ok(report)
    }

    /// Delete every artifact regardless of age
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed.
    pub async fn sweep_all(&self) -> Result<SweepReport, Error> {
        let result = self.sweep_all_inner().await;
        self.report(SweepMode::All, &result);
        result
    }

    async fn sweep_all_inner(&self) -> Result<SweepReport, Error> {
        let mut report = SweepReport::default();
        for path in self.artifacts().await? {
            if self.remove(&path, SweepMode::All).await {
                report.removed.push(path);
            }
        }
        Ok(report)
    }

    /// Delete `path` after the deferred delay
    ///
    /// Resolves to whether a file was removed; a file that is already gone
    /// counts as done.
    pub fn schedule_deferred_delete(&self, path: PathBuf) -> JoinHandle<bool> {
        let sweeper = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(sweeper.deferred_delay).await;
            sweeper.remove(&path, SweepMode::Deferred).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweeper(dir: &Path) -> CleanupSweeper {
        CleanupSweeper::new(dir, &CleanupConfig::default())
    }

    #[test]
    fn allocated_paths_are_artifacts() {
        let s = sweeper(Path::new("/tmp/distro"));
        let path = s.allocate();
        assert!(s.is_artifact(&path));
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("temp_"));
        assert_ne!(path, s.allocate());
    }

    #[test]
    fn foreign_files_are_not_artifacts() {
        let s = sweeper(Path::new("/tmp/distro"));
        assert!(!s.is_artifact(Path::new("/tmp/distro/notes.txt")));
        assert!(!s.is_artifact(Path::new("/tmp/distro/temp_x.txt")));
        assert!(!s.is_artifact(Path::new("/tmp/other/temp_x.apk")));
    }

    #[tokio::test]
    async fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let s = sweeper(&dir.path().join("absent"));
        assert_eq!(s.sweep_all().await.unwrap(), SweepReport::default());
    }
}
