//! Integration tests for install sequencing and artifact cleanup

use async_trait::async_trait;
use distro_config::CleanupConfig;
use distro_errors::Error;
use distro_events::{AppEvent, CleanupEvent, InstallEvent};
use distro_install::{CleanupSweeper, InstallSequencer};
use distro_platform::PackageInstaller;
use proptest::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct RecordingInstaller {
    installs: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl PackageInstaller for RecordingInstaller {
    async fn request_install(&self, file: &Path) -> Result<(), Error> {
        self.installs.lock().unwrap().push(file.to_path_buf());
        Ok(())
    }

    async fn request_uninstall(&self, _identifier: &str) -> Result<(), Error> {
        Ok(())
    }
}

fn cleanup_config(stale_after_secs: u64, deferred_delete_secs: u64) -> CleanupConfig {
    CleanupConfig {
        stale_after_secs,
        deferred_delete_secs,
        ..CleanupConfig::default()
    }
}

async fn touch(sweeper: &CleanupSweeper) -> PathBuf {
    let path = sweeper.allocate();
    tokio::fs::write(&path, b"apk").await.unwrap();
    path
}

#[derive(Debug, Clone)]
enum Step {
    Enqueue,
    Acknowledge,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![Just(Step::Enqueue), Just(Step::Acknowledge)]
}

proptest! {
    #[test]
    fn at_most_one_install_pending_in_enqueue_order(steps in prop::collection::vec(step(), 1..40)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let installer = Arc::new(RecordingInstaller::default());
            let sweeper = CleanupSweeper::new("/nonexistent/distro", &CleanupConfig::default());
            let mut seq = InstallSequencer::new(installer.clone(), sweeper);

            let mut enqueued = Vec::new();
            let mut acknowledged = 0usize;
            for (i, step) in steps.iter().enumerate() {
                match step {
                    Step::Enqueue => {
                        let file = PathBuf::from(format!("/nonexistent/distro/temp_{i}.apk"));
                        enqueued.push(file.clone());
                        seq.enqueue(file).await.unwrap();
                    }
                    Step::Acknowledge => {
                        if seq.acknowledge().await.released.is_some() {
                            acknowledged += 1;
                        }
                    }
                }

                let requested = installer.installs.lock().unwrap().clone();
                // one outstanding prompt at most
                assert!(requested.len() <= acknowledged + 1);
                assert_eq!(requested[..], enqueued[..requested.len()]);
            }
        });
    }
}

#[tokio::test]
async fn stale_sweep_skips_protected_and_fresh_files() {
    let dir = tempfile::tempdir().unwrap();
    let old = CleanupSweeper::new(dir.path(), &cleanup_config(0, 2));

    let protected = touch(&old).await;
    let doomed = touch(&old).await;
    let foreign = dir.path().join("keep.txt");
    tokio::fs::write(&foreign, b"x").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let report = old
        .sweep_stale(&HashSet::from([protected.clone()]))
        .await
        .unwrap();

    assert_eq!(report.removed, vec![doomed.clone()]);
    assert_eq!(report.protected, 1);
    assert!(protected.exists());
    assert!(!doomed.exists());
    assert!(foreign.exists());

    // default grace period keeps just-written files
    let fresh_sweeper = CleanupSweeper::new(dir.path(), &CleanupConfig::default());
    let fresh = touch(&fresh_sweeper).await;
    let report = fresh_sweeper.sweep_stale(&HashSet::new()).await.unwrap();
    assert!(!report.removed.contains(&fresh));
    assert!(fresh.exists());
}

#[tokio::test]
async fn sweep_all_ignores_age_and_foreign_files() {
    let dir = tempfile::tempdir().unwrap();
    let sweeper = CleanupSweeper::new(dir.path(), &CleanupConfig::default());
    let a = touch(&sweeper).await;
    let b = touch(&sweeper).await;
    let foreign = dir.path().join("temp_notes.txt");
    tokio::fs::write(&foreign, b"x").await.unwrap();

    let report = sweeper.sweep_all().await.unwrap();
    assert_eq!(report.removed.len(), 2);
    assert!(!a.exists() && !b.exists());
    assert!(foreign.exists());
}

#[tokio::test]
async fn acknowledge_deletes_released_artifact_after_delay() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, mut rx) = distro_events::channel();
    let sweeper = CleanupSweeper::new(dir.path(), &cleanup_config(10, 0)).with_event_sender(tx.clone());
    let first = touch(&sweeper).await;
    let second = touch(&sweeper).await;

    let installer = Arc::new(RecordingInstaller::default());
    let mut seq = InstallSequencer::new(installer.clone(), sweeper).with_event_sender(tx);
    seq.enqueue(first.clone()).await.unwrap();
    seq.enqueue(second.clone()).await.unwrap();

    let ack = seq.acknowledge().await;
    assert_eq!(ack.released.as_deref(), Some(first.as_path()));
    assert_eq!(ack.next.unwrap().as_deref(), Some(second.as_path()));
    assert!(ack.deferred_delete.unwrap().await.unwrap());
    assert!(!first.exists());
    assert!(second.exists());

    let mut saw_ack = false;
    let mut saw_delete = false;
    while let Ok(message) = rx.try_recv() {
        match message.event {
            AppEvent::Install(InstallEvent::Acknowledged { path }) => saw_ack = path == first,
            AppEvent::Cleanup(CleanupEvent::FileDeleted { path, .. }) => saw_delete = path == first,
            _ => {}
        }
    }
    assert!(saw_ack);
    assert!(saw_delete);
}

#[tokio::test]
async fn deferred_delete_of_missing_file_is_quiet() {
    let dir = tempfile::tempdir().unwrap();
    let sweeper = CleanupSweeper::new(dir.path(), &cleanup_config(10, 0));
    let gone = sweeper.allocate();
    assert!(!sweeper.schedule_deferred_delete(gone).await.unwrap());
}

#[tokio::test]
async fn acknowledge_with_nothing_pending_is_noop() {
    let sweeper = CleanupSweeper::new("/nonexistent/distro", &CleanupConfig::default());
    let mut seq = InstallSequencer::new(Arc::new(RecordingInstaller::default()), sweeper);
    let ack = seq.acknowledge().await;
    assert!(ack.released.is_none());
    assert!(ack.deferred_delete.is_none());
    assert_eq!(ack.next.unwrap(), None);
}
