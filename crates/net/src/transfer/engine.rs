//! Streams one artifact to disk as a sequence of item states

use distro_config::{NetworkConfig, TransferConfig};
use distro_errors::{Error, NetworkError};
use distro_events::{AppEvent, DownloadEvent, EventEmitter, FailureContext};
use distro_platform::PackageInspector;
use distro_types::{ItemState, PackageMetadata, Progress};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use super::throttle::ProgressThrottle;
use crate::client::{transport_error, NetClient};

/// Tuning knobs of the transfer engine
#[derive(Debug, Clone)]
pub struct TransferSettings {
    pub buffer_size: usize,
    pub progress_interval: Duration,
    pub progress_min_delta: f32,
    /// Longest wait for the next body chunk
    pub read_timeout: Duration,
}

impl TransferSettings {
    #[must_use]
    pub fn from_config(transfer: &TransferConfig, network: &NetworkConfig) -> Self {
        Self {
            buffer_size: transfer.buffer_size.max(1),
            progress_interval: transfer.progress_interval(),
            progress_min_delta: transfer.progress_min_delta,
            read_timeout: network.read_timeout(),
        }
    }
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self::from_config(&TransferConfig::default(), &NetworkConfig::default())
    }
}

/// One resolved download
#[derive(Debug, Clone)]
pub struct TransferJob {
    pub url: String,
    pub dest: PathBuf,
    /// Display name used in events
    pub label: Option<String>,
}

/// Transfer engine
///
/// Never returns an error: every failure ends in `ItemState::Failed`.
#[derive(Clone)]
pub struct TransferEngine {
    client: NetClient,
    settings: TransferSettings,
    inspector: Arc<dyn PackageInspector>,
}

impl std::fmt::Debug for TransferEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferEngine")
            .field("client", &self.client)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TransferEngine {
    #[must_use]
    pub fn new(
        client: NetClient,
        settings: TransferSettings,
        inspector: Arc<dyn PackageInspector>,
    ) -> Self {
        Self {
            client,
            settings,
            inspector,
        }
    }

    /// Run `job`, reporting every state through `on_state`
    ///
    /// The first progress state is reported once the response headers are
    /// in, determinate when the server declared a size. The last reported
    /// state is the returned terminal state.
    pub async fn run<E, F>(&self, job: &TransferJob, events: &E, mut on_state: F) -> ItemState
    where
        E: EventEmitter + Sync,
        F: FnMut(ItemState) + Send,
    {
        let started = Instant::now();

        let final_state = match self.stream_to_file(job, events, &mut on_state).await {
            Ok(bytes) => {
                let metadata = self.inspect(&job.dest).await;
                events.emit(AppEvent::Download(DownloadEvent::Completed {
                    url: job.url.clone(),
                    package: job.label.clone(),
                    bytes_downloaded: bytes,
                    elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                }));
                ItemState::Succeeded {
                    local_file: job.dest.clone(),
                    metadata,
                }
            }
            Err(e) => {
                // Partial files are not worth keeping
                let _ = tokio::fs::remove_file(&job.dest).await;
                events.emit(AppEvent::Download(DownloadEvent::Failed {
                    url: job.url.clone(),
                    package: job.label.clone(),
                    failure: FailureContext::from_error(&e),
                }));
                ItemState::failed(e.reason())
            }
        };

        on_state(final_state.clone());
        final_state
    }

    async fn stream_to_file<E, F>(
        &self,
        job: &TransferJob,
        events: &E,
        on_state: &mut F,
    ) -> Result<u64, Error>
    where
        E: EventEmitter + Sync,
        F: FnMut(ItemState) + Send,
    {
        let response = self.client.get(&job.url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or_default().to_string(),
            }
            .into());
        }

        let total = response.content_length().filter(|len| *len > 0);
        events.emit(AppEvent::Download(DownloadEvent::Started {
            url: job.url.clone(),
            package: job.label.clone(),
            total_bytes: total,
        }));

        let file = File::create(&job.dest)
            .await
            .map_err(|e| Error::io_with_path(&e, &job.dest))?;
        let mut writer = BufWriter::with_capacity(self.settings.buffer_size, file);
        let mut throttle =
            ProgressThrottle::new(self.settings.progress_interval, self.settings.progress_min_delta);
        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;

        let opening = progress_for(0, total);
        throttle.observe(Instant::now(), opening.fraction());
        on_state(ItemState::Downloading(opening));

        loop {
            let next = tokio::time::timeout(self.settings.read_timeout, stream.next())
                .await
                .map_err(|_| NetworkError::Stalled {
                    url: job.url.clone(),
                    waited_ms: u64::try_from(self.settings.read_timeout.as_millis())
                        .unwrap_or(u64::MAX),
                })?;
            let Some(chunk) = next else { break };
            let chunk = chunk.map_err(|e| transport_error(&job.url, &e))?;

            writer.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            let progress = progress_for(downloaded, total);
            if throttle.observe(Instant::now(), progress.fraction()) {
                on_state(ItemState::Downloading(progress));
            }
        }

        writer.flush().await?;
        writer.into_inner().sync_all().await?;

        if total.is_some() && throttle.needs_final() {
            throttle.finish(Instant::now());
            on_state(ItemState::Downloading(Progress::Determinate {
                fraction: 1.0,
                bytes_so_far: downloaded,
            }));
        }

        tracing::debug!(url = %job.url, bytes = downloaded, "transfer finished");
        Ok(downloaded)
    }

    async fn inspect(&self, path: &Path) -> Option<PackageMetadata> {
        let inspector = self.inspector.clone();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || inspector.inspect(&path))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "package inspector panicked");
                None
            })
    }
}

#[allow(clippy::cast_precision_loss)]
fn progress_for(downloaded: u64, total: Option<u64>) -> Progress {
    match total {
        Some(total) => Progress::Determinate {
            fraction: (downloaded as f32 / total as f32).min(1.0),
            bytes_so_far: downloaded,
        },
        None => Progress::Indeterminate {
            bytes_so_far: downloaded,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_total_is_indeterminate() {
        assert_eq!(
            progress_for(10, None),
            Progress::Indeterminate { bytes_so_far: 10 }
        );
    }

    #[test]
    fn fraction_is_clamped() {
        assert_eq!(progress_for(12, Some(10)).fraction(), Some(1.0));
        assert_eq!(progress_for(5, Some(10)).fraction(), Some(0.5));
    }
}
