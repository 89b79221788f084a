// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use tracing::info;

use crate::api::ShowSource;
use crate::config::DEFAULT_EPISODE_LIMIT;
use crate::episode::{DownloadContext, download_episode, fetch_episodes};
use crate::error::SyncError;
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};
use crate::state::{create_download_plan, scan_output_dir};

/// Options for downloading a show's episodes
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Number of latest episodes to consider
    pub episode_limit: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            episode_limit: DEFAULT_EPISODE_LIMIT,
        }
    }
}

/// Result of a batch download
#[derive(Debug, Clone)]
pub struct SyncResult {
    /// Number of episodes successfully downloaded
    pub downloaded: usize,
    /// Number of episodes skipped (already present)
    pub skipped: usize,
    /// Number of episodes that failed to download
    pub failed: usize,
    /// Details of failed episodes (title, error message)
    pub failed_episodes: Vec<(String, String)>,
}

/// Download every listed episode of a show that is not on disk yet
///
/// This:
/// 1. Fetches the show and its latest episodes
/// 2. Scans the output directory for existing downloads
/// 3. Downloads the missing episodes one after the other
///
/// A failed episode does not stop the batch; it is counted and reported.
pub async fn sync_show<S, C>(
    source: &S,
    client: &C,
    show_url: &str,
    output_dir: &Path,
    options: &SyncOptions,
    reporter: SharedProgressReporter,
) -> Result<SyncResult, SyncError>
where
    S: ShowSource + ?Sized,
    C: HttpClient + ?Sized,
{
    reporter.report(ProgressEvent::FetchingShow {
        url: show_url.to_string(),
    });

    let show = source
        .get_show(show_url)
        .await?
        .ok_or_else(|| SyncError::ShowNotFound(show_url.to_string()))?;

    let episodes = fetch_episodes(source, show_url, Some(&show.title), options.episode_limit).await?;
    let total_episodes = episodes.len();

    let state = scan_output_dir(output_dir).await;
    let plan = create_download_plan(episodes, &state);
    let existing = plan.already_present.len();

    reporter.report(ProgressEvent::ShowLoaded {
        show_title: show.title.clone(),
        total_episodes,
        already_downloaded: existing,
    });

    let total_to_download = plan.to_download.len();
    let mut downloaded = 0;
    let mut failed_episodes = Vec::new();

    for (episode_index, episode) in plan.to_download.iter().enumerate() {
        let context = DownloadContext {
            episode_index,
            total_to_download,
        };

        match download_episode(
            client,
            episode,
            &state.output_dir,
            Some(&show.title),
            &context,
            &reporter,
        )
        .await
        {
            Ok(result) => {
                info!(path = %result.path.display(), bytes = result.bytes_downloaded, "episode downloaded");
                downloaded += 1;
            }
            Err(e) => {
                reporter.report(ProgressEvent::DownloadFailed {
                    episode_title: episode.title.clone(),
                    error: e.to_string(),
                });
                failed_episodes.push((episode.title.clone(), e.to_string()));
            }
        }
    }

    let failed = failed_episodes.len();

    reporter.report(ProgressEvent::SyncCompleted {
        downloaded_count: downloaded,
        existing_count: existing,
        failed_count: failed,
    });

    Ok(SyncResult {
        downloaded,
        skipped: existing,
        failed,
        failed_episodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::api::{Brand, DiffusionEdge, DiffusionNode, PodcastEpisode, Show, Theme};
    use crate::error::ApiError;
    use crate::http::{BufferedResponse, ByteStream, HttpResponse};
    use crate::progress::NoopReporter;
    use async_trait::async_trait;
    use bytes::Bytes;
    use tempfile::tempdir;

    struct MockSource {
        show: Option<Show>,
        edges: Vec<DiffusionEdge>,
    }

    #[async_trait]
    impl ShowSource for MockSource {
        async fn brands(&self) -> Result<Vec<Brand>, ApiError> {
            Ok(vec![])
        }

        async fn themes(&self, _brand_id: &str) -> Result<Vec<Theme>, ApiError> {
            Ok(vec![])
        }

        async fn get_show(&self, _url: &str) -> Result<Option<Show>, ApiError> {
            Ok(self.show.clone())
        }

        async fn list_episodes(
            &self,
            _url: &str,
            limit: usize,
        ) -> Result<Vec<DiffusionEdge>, ApiError> {
            Ok(self.edges.iter().take(limit).cloned().collect())
        }
    }

    struct MockHttpClient {
        audio_data: Vec<u8>,
        failing_url: Option<String>,
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn post_json(
            &self,
            _url: &str,
            _headers: &[(&str, &str)],
            _body: Vec<u8>,
        ) -> Result<BufferedResponse, reqwest::Error> {
            panic!("batch downloads go through the show source");
        }

        async fn get_stream(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
            let status = if self.failing_url.as_deref() == Some(url) {
                500
            } else {
                200
            };
            let data = self.audio_data.clone();
            let len = data.len() as u64;

            let stream: ByteStream =
                Box::pin(futures::stream::once(async move { Ok(Bytes::from(data)) }));

            Ok(HttpResponse {
                status,
                content_length: Some(len),
                body: stream,
            })
        }
    }

    fn edge(id: &str, title: &str, date: &str) -> DiffusionEdge {
        DiffusionEdge {
            cursor: format!("cursor-{id}"),
            node: DiffusionNode {
                id: id.to_string(),
                title: Some(title.to_string()),
                url: None,
                published_date: Some(date.to_string()),
                podcast_episode: Some(PodcastEpisode {
                    url: Some(format!("https://example.com/{id}.mp3")),
                    player_url: None,
                    title: None,
                }),
            },
        }
    }

    fn source() -> MockSource {
        MockSource {
            show: Some(Show {
                id: "show-1".to_string(),
                title: "My Show".to_string(),
                url: "https://example.com/show".to_string(),
                stand_first: None,
                podcast: None,
                taxonomies_connection: None,
                personalities_connection: None,
            }),
            edges: vec![
                edge("ep1", "Episode 1", "1700000000"),
                edge("ep2", "Episode 2", "1700086400"),
            ],
        }
    }

    fn client(failing_url: Option<&str>) -> MockHttpClient {
        MockHttpClient {
            audio_data: b"fake audio".to_vec(),
            failing_url: failing_url.map(String::from),
        }
    }

    #[tokio::test]
    async fn sync_downloads_all_episodes() {
        let dir = tempdir().unwrap();

        let result = sync_show(
            &source(),
            &client(None),
            "https://example.com/show",
            dir.path(),
            &SyncOptions::default(),
            NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert_eq!(result.downloaded, 2);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.failed, 0);
        assert!(dir.path().join("my-show").join("2023-11-14-episode-1.mp3").exists());
        assert!(dir.path().join("my-show").join("2023-11-15-episode-2.mp3").exists());
    }

    #[tokio::test]
    async fn sync_respects_episode_limit() {
        let dir = tempdir().unwrap();
        let options = SyncOptions { episode_limit: 1 };

        let result = sync_show(
            &source(),
            &client(None),
            "https://example.com/show",
            dir.path(),
            &options,
            NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert_eq!(result.downloaded, 1);
    }

    #[tokio::test]
    async fn sync_skips_existing_episodes() {
        let dir = tempdir().unwrap();

        sync_show(
            &source(),
            &client(None),
            "https://example.com/show",
            dir.path(),
            &SyncOptions::default(),
            NoopReporter::shared(),
        )
        .await
        .unwrap();

        let result = sync_show(
            &source(),
            &client(None),
            "https://example.com/show",
            dir.path(),
            &SyncOptions::default(),
            NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert_eq!(result.downloaded, 0);
        assert_eq!(result.skipped, 2);
    }

    #[tokio::test]
    async fn sync_continues_after_a_failure() {
        let dir = tempdir().unwrap();

        let result = sync_show(
            &source(),
            &client(Some("https://example.com/ep1.mp3")),
            "https://example.com/show",
            dir.path(),
            &SyncOptions::default(),
            NoopReporter::shared(),
        )
        .await
        .unwrap();

        assert_eq!(result.downloaded, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.failed_episodes[0].0, "Episode 1");
    }

    #[tokio::test]
    async fn sync_fails_for_unknown_show() {
        let dir = tempdir().unwrap();
        let mut source = source();
        source.show = None;

        let result = sync_show(
            &source,
            &client(None),
            "https://example.com/nope",
            dir.path(),
            &SyncOptions::default(),
            NoopReporter::shared(),
        )
        .await;

        assert!(matches!(result, Err(SyncError::ShowNotFound(url)) if url == "https://example.com/nope"));
    }
}
