//! Output directory watcher.
//!
//! The engine reports nothing useful on the submission path -- the result
//! filename only ever materializes on disk. The watcher snapshots the
//! output directory before a workflow is submitted, then polls at a flat
//! interval until a new file matching the output pattern appears or the
//! deadline passes. No backoff, no retry policy beyond the single
//! timeout.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use atelier_core::naming::OutputPattern;

/// Errors from the output watcher.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The output directory could not be listed for the initial snapshot.
    #[error("Failed to read output directory {}: {source}", .dir.display())]
    Snapshot {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No matching file appeared before the deadline.
    #[error("No new output matching prefix '{prefix}' within {}s", .timeout.as_secs())]
    Timeout { prefix: String, timeout: Duration },
}

/// Filenames present in the output directory at snapshot time.
///
/// Taken *before* submission so a result written faster than the first
/// poll cycle still counts as new.
#[derive(Debug)]
pub struct Snapshot {
    files: HashSet<String>,
}

/// Polls the engine output directory for new result files.
pub struct OutputWatcher {
    dir: PathBuf,
    pattern: OutputPattern,
    prefix: String,
    poll_interval: Duration,
    timeout: Duration,
}

impl OutputWatcher {
    /// Create a watcher over `dir` for files named `<prefix>_<n>.png`.
    ///
    /// `poll_interval` must be non-zero; `tokio::time::interval` panics
    /// on a zero period.
    pub fn new(
        dir: impl Into<PathBuf>,
        prefix: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            dir: dir.into(),
            pattern: OutputPattern::new(prefix),
            prefix: prefix.to_string(),
            poll_interval,
            timeout,
        }
    }

    /// Record the files present before a workflow is submitted.
    pub async fn snapshot(&self) -> Result<Snapshot, WatchError> {
        let files = self.list_files().await.map_err(|source| WatchError::Snapshot {
            dir: self.dir.clone(),
            source,
        })?;
        tracing::debug!(
            dir = %self.dir.display(),
            existing = files.len(),
            "Output directory snapshot taken",
        );
        Ok(Snapshot { files })
    }

    /// Wait for a fresh output file.
    ///
    /// Scans immediately, then once per poll interval until the timeout.
    /// Among the files absent from `snapshot`, the one with the largest
    /// numeric counter wins. A directory read error during polling is
    /// logged and retried on the next tick -- a transient failure must
    /// not abort a multi-minute wait.
    pub async fn wait_for_output(&self, snapshot: &Snapshot) -> Result<String, WatchError> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        let mut ticker = tokio::time::interval(self.poll_interval);

        loop {
            // The first tick completes immediately, so even a zero
            // timeout gets one scan.
            ticker.tick().await;

            match self.list_files().await {
                Ok(current) => {
                    let newest = self
                        .pattern
                        .largest(current.difference(&snapshot.files).map(String::as_str));
                    if let Some(name) = newest {
                        tracing::info!(file = %name, "New output file found");
                        return Ok(name.to_string());
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        dir = %self.dir.display(),
                        error = %e,
                        "Output directory scan failed; retrying on next tick",
                    );
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(WatchError::Timeout {
                    prefix: self.prefix.clone(),
                    timeout: self.timeout,
                });
            }

            tracing::debug!(
                dir = %self.dir.display(),
                poll_interval_ms = self.poll_interval.as_millis() as u64,
                "No new output yet; waiting",
            );
        }
    }

    /// List the directory into a set of filenames.
    ///
    /// Entries with non-UTF-8 names are skipped; the engine writes plain
    /// ASCII counters.
    async fn list_files(&self) -> std::io::Result<HashSet<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut files = HashSet::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Ok(name) = entry.file_name().into_string() {
                files.insert(name);
            }
        }
        Ok(files)
    }
}
