use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::{DiffusionNode, ShowSource};
use crate::error::ApiError;

use super::path::{episode_file_path, parse_published_date};

/// A downloadable episode of a show
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Episode {
    pub id: String,
    pub title: String,
    /// Primary audio URL
    pub podcast_url: String,
    /// Unix epoch seconds, as text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
    /// Fallback audio URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_url: Option<String>,
    /// Download path relative to the output root, once a podcast name is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl Episode {
    /// Convert an API diffusion, dropping those that cannot be downloaded
    ///
    /// A diffusion needs a title, a publication date and an audio URL.
    pub fn from_diffusion(node: DiffusionNode) -> Option<Self> {
        let title = node.title?;
        let published_date = node.published_date?;
        let podcast = node.podcast_episode?;
        let podcast_url = podcast.url?;

        Some(Self {
            id: node.id,
            title,
            podcast_url,
            published_date: Some(published_date),
            page_url: node.url,
            player_url: podcast.player_url.filter(|u| !u.is_empty()),
            file_path: None,
        })
    }

    /// Attach the derived download path for the given podcast
    pub fn with_file_path(mut self, podcast_name: Option<&str>) -> Self {
        self.file_path = Some(episode_file_path(&self, podcast_name));
        self
    }

    /// URL to download the audio from: the podcast URL, else the player URL
    pub fn audio_url(&self) -> Option<&str> {
        Some(self.podcast_url.as_str())
            .filter(|u| !u.is_empty())
            .or_else(|| self.player_url.as_deref().filter(|u| !u.is_empty()))
    }

    /// Publication instant, if the date is present and well formed
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_date.as_deref().and_then(parse_published_date)
    }
}

/// Fetch the latest downloadable episodes of a show
///
/// When `podcast_name` is non-empty every episode gets its `file_path`
/// derived from it.
pub async fn fetch_episodes<S: ShowSource + ?Sized>(
    source: &S,
    show_url: &str,
    podcast_name: Option<&str>,
    limit: usize,
) -> Result<Vec<Episode>, ApiError> {
    let podcast_name = podcast_name.filter(|n| !n.is_empty());
    let edges = source.list_episodes(show_url, limit).await?;

    Ok(edges
        .into_iter()
        .filter_map(|edge| Episode::from_diffusion(edge.node))
        .map(|episode| match podcast_name {
            Some(name) => episode.with_file_path(Some(name)),
            None => episode,
        })
        .collect())
}
