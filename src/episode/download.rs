use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::DownloadError;
use crate::http::{HttpClient, HttpResponse};
use crate::progress::{ProgressEvent, SharedProgressReporter};

use super::model::Episode;
use super::path::{episode_file_path, resolve_relative};

/// Position of a download within a batch, for progress display
#[derive(Debug, Clone)]
pub struct DownloadContext {
    /// Index of this episode in the download queue
    pub episode_index: usize,
    /// Total number of episodes to download
    pub total_to_download: usize,
}

impl DownloadContext {
    /// Context for a lone download
    pub fn single() -> Self {
        Self {
            episode_index: 0,
            total_to_download: 1,
        }
    }
}

/// Outcome of a successful download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// Where the audio was written
    pub path: PathBuf,
    /// Number of bytes written
    pub bytes_downloaded: u64,
}

/// Download an episode below the output root
///
/// The destination is the episode's derived path (computed from
/// `podcast_name` when not attached yet). The podcast directory is created
/// if needed and an existing file is overwritten. The body is streamed to a
/// `.partial` sibling that only takes the final name once fully written, so
/// an interrupted download never looks finished to the scanner.
pub async fn download_episode<C: HttpClient + ?Sized>(
    client: &C,
    episode: &Episode,
    output_dir: &Path,
    podcast_name: Option<&str>,
    context: &DownloadContext,
    reporter: &SharedProgressReporter,
) -> Result<DownloadResult, DownloadError> {
    let url = episode
        .audio_url()
        .ok_or_else(|| DownloadError::MissingAudioUrl {
            title: episode.title.clone(),
        })?;

    let relative = match &episode.file_path {
        Some(path) => path.clone(),
        None => episode_file_path(episode, podcast_name),
    };
    let output_path = resolve_relative(output_dir, &relative);

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DownloadError::CreateDirectoryFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    debug!(url, path = %output_path.display(), "downloading episode");

    let response = client
        .get_stream(url)
        .await
        .map_err(|e| DownloadError::HttpFailed {
            url: url.to_string(),
            source: e,
        })?;

    if !(200..300).contains(&response.status) {
        return Err(DownloadError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    reporter.report(ProgressEvent::DownloadStarting {
        episode_title: episode.title.clone(),
        episode_index: context.episode_index,
        total_to_download: context.total_to_download,
        content_length: response.content_length,
    });

    let partial_path = partial_path_for(&output_path);
    let bytes_downloaded =
        match write_partial(&partial_path, response, url, &episode.title, reporter).await {
            Ok(bytes) => bytes,
            Err(e) => {
                remove_partial(&partial_path).await;
                return Err(e);
            }
        };

    if let Err(e) = tokio::fs::rename(&partial_path, &output_path).await {
        remove_partial(&partial_path).await;
        return Err(DownloadError::FinalizeFailed {
            path: output_path,
            source: e,
        });
    }

    reporter.report(ProgressEvent::DownloadCompleted {
        episode_title: episode.title.clone(),
        bytes_downloaded,
        path: output_path.clone(),
    });

    Ok(DownloadResult {
        path: output_path,
        bytes_downloaded,
    })
}

/// `<path>.partial`, the name a download is streamed to until it completes
///
/// The scanner maps it to `<file>.mp3.mp3`, which no derived path matches.
fn partial_path_for(output_path: &Path) -> PathBuf {
    let mut name = output_path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

async fn write_partial(
    partial_path: &Path,
    response: HttpResponse,
    url: &str,
    episode_title: &str,
    reporter: &SharedProgressReporter,
) -> Result<u64, DownloadError> {
    let mut file =
        File::create(partial_path)
            .await
            .map_err(|e| DownloadError::FileCreateFailed {
                path: partial_path.to_path_buf(),
                source: e,
            })?;

    let mut bytes_downloaded: u64 = 0;
    let mut stream = response.body;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::StreamFailed {
            url: url.to_string(),
            source: e,
        })?;

        file.write_all(&chunk)
            .await
            .map_err(|e| DownloadError::FileWriteFailed {
                path: partial_path.to_path_buf(),
                source: e,
            })?;

        bytes_downloaded += chunk.len() as u64;

        reporter.report(ProgressEvent::DownloadProgress {
            episode_title: episode_title.to_string(),
            bytes_downloaded,
            total_bytes: response.content_length,
        });
    }

    file.flush()
        .await
        .map_err(|e| DownloadError::FileWriteFailed {
            path: partial_path.to_path_buf(),
            source: e,
        })?;

    Ok(bytes_downloaded)
}

async fn remove_partial(partial_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(partial_path).await {
        debug!(path = %partial_path.display(), error = %e, "could not remove partial download");
    }
}
