//! Background cleanup of stale uploads and outputs
//!
//! The janitor is owned by `main`: [`spawn`] starts it and the returned
//! [`JanitorHandle`] stops it during graceful shutdown. Each tick lists the
//! target folders and deletes entries whose modification time is older than
//! the retention window.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone)]
pub struct JanitorConfig {
    pub folders: Vec<PathBuf>,
    pub max_age: Duration,
    pub interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JanitorState {
    Idle,
    Sweeping,
}

/// Outcome of one sweep over all folders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Delete everything in `folders` older than `max_age` as of `now`.
///
/// Missing folders are skipped. Subdirectories are abandoned request
/// scratch directories and are removed recursively.
pub fn sweep(folders: &[PathBuf], max_age: Duration, now: SystemTime) -> SweepReport {
    let mut report = SweepReport::default();

    for folder in folders {
        let entries = match std::fs::read_dir(folder) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                tracing::warn!(folder = %folder.display(), error = %e, "Cannot list folder");
                report.failed += 1;
                continue;
            }
        };

        for entry in entries.flatten() {
            report.scanned += 1;
            let path = entry.path();

            let Ok(metadata) = entry.metadata() else {
                report.failed += 1;
                continue;
            };
            let Ok(modified) = metadata.modified() else {
                report.failed += 1;
                continue;
            };
            // Clock skew can put mtime in the future; treat that as brand new.
            let age = now.duration_since(modified).unwrap_or_default();
            if age <= max_age {
                continue;
            }

            match remove(&path, metadata.is_dir()) {
                Ok(()) => {
                    tracing::info!(path = %path.display(), age_secs = age.as_secs(), "Deleted stale file");
                    report.deleted += 1;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to delete stale file");
                    report.failed += 1;
                }
            }
        }
    }

    report
}

fn remove(path: &Path, is_dir: bool) -> std::io::Result<()> {
    if is_dir {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

pub struct JanitorHandle {
    shutdown: oneshot::Sender<()>,
    state: watch::Receiver<JanitorState>,
    task: JoinHandle<()>,
}

impl JanitorHandle {
    pub fn state(&self) -> JanitorState {
        *self.state.borrow()
    }

    /// Signal the loop and wait for it. A sweep in progress finishes first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Janitor task ended abnormally");
        }
    }
}

/// Start the janitor loop. The first sweep runs immediately.
pub fn spawn(config: JanitorConfig) -> JanitorHandle {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    let (state_tx, state_rx) = watch::channel(JanitorState::Idle);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            folders = ?config.folders,
            max_age_secs = config.max_age.as_secs(),
            interval_secs = config.interval.as_secs(),
            "Janitor started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {}
            }

            state_tx.send_replace(JanitorState::Sweeping);
            let folders = config.folders.clone();
            let max_age = config.max_age;
            match tokio::task::spawn_blocking(move || sweep(&folders, max_age, SystemTime::now())).await {
                Ok(report) => tracing::debug!(
                    scanned = report.scanned,
                    deleted = report.deleted,
                    failed = report.failed,
                    "Sweep finished"
                ),
                Err(e) => tracing::error!(error = %e, "Sweep panicked"),
            }
            state_tx.send_replace(JanitorState::Idle);
        }

        tracing::info!("Janitor stopped");
    });

    JanitorHandle {
        shutdown: shutdown_tx,
        state: state_rx,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_old_file_removed_young_file_kept() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("old.pdf");
        std::fs::write(&file, b"x").unwrap();

        // Nothing is old yet.
        let report = sweep(&[dir.path().to_path_buf()], HOUR, SystemTime::now());
        assert_eq!(report, SweepReport { scanned: 1, deleted: 0, failed: 0 });
        assert!(file.exists());

        // Two hours later the same file has aged past the window.
        let later = SystemTime::now() + 2 * HOUR;
        let report = sweep(&[dir.path().to_path_buf()], HOUR, later);
        assert_eq!(report.deleted, 1);
        assert!(!file.exists());
    }

    #[test]
    fn test_stale_scratch_directories_removed() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("req-abc");
        std::fs::create_dir(&scratch).unwrap();
        std::fs::write(scratch.join("000_a.pdf"), b"x").unwrap();

        let report = sweep(&[dir.path().to_path_buf()], HOUR, SystemTime::now() + 2 * HOUR);
        assert_eq!(report.deleted, 1);
        assert!(!scratch.exists());
    }

    #[test]
    fn test_missing_folder_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let report = sweep(&[missing], HOUR, SystemTime::now());
        assert_eq!(report, SweepReport::default());
    }

    #[tokio::test]
    async fn test_spawn_and_stop() {
        let dir = tempfile::tempdir().unwrap();
        let handle = spawn(JanitorConfig {
            folders: vec![dir.path().to_path_buf()],
            max_age: HOUR,
            interval: Duration::from_secs(3600),
        });
        handle.stop().await;
    }

    #[tokio::test]
    async fn test_first_sweep_runs_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fresh.txt");
        std::fs::write(&file, b"x").unwrap();
        std::thread::sleep(Duration::from_millis(20));

        let handle = spawn(JanitorConfig {
            folders: vec![dir.path().to_path_buf()],
            max_age: Duration::ZERO,
            interval: Duration::from_secs(3600),
        });

        for _ in 0..100 {
            if !file.exists() && handle.state() == JanitorState::Idle {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!file.exists());
        assert_eq!(handle.state(), JanitorState::Idle);
        handle.stop().await;
    }
}
