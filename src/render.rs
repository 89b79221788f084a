use colored::Colorize;
use serde::Serialize;

use crate::api::Show;
use crate::episode::Episode;
use crate::state::OutputState;

/// Personality relations that are not worth showing next to a name
const HIDDEN_RELATIONS: &[&str] = &["staff"];

/// A show with its episodes, as presented to the user
#[derive(Debug, Clone, Serialize)]
pub struct ShowReport<'a> {
    pub show: &'a Show,
    pub episodes: Vec<EpisodeReport<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EpisodeReport<'a> {
    #[serde(flatten)]
    pub episode: &'a Episode,
    pub downloaded: bool,
}

impl<'a> ShowReport<'a> {
    pub fn new(show: &'a Show, episodes: &'a [Episode], state: &OutputState) -> Self {
        Self {
            show,
            episodes: episodes
                .iter()
                .map(|episode| EpisodeReport {
                    episode,
                    downloaded: state.is_downloaded(episode),
                })
                .collect(),
        }
    }
}

/// Render a show report as pretty-printed JSON
pub fn render_json(report: &ShowReport<'_>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Render a show report as human readable text
pub fn render_table(report: &ShowReport<'_>) -> String {
    let mut lines = render_show_header(report.show);

    lines.push(String::new());
    lines.push(
        format!("Latest Episodes ({}):", report.episodes.len())
            .green()
            .bold()
            .to_string(),
    );

    for entry in &report.episodes {
        let marker = if entry.downloaded {
            "✓".green().to_string()
        } else {
            " ".to_string()
        };
        lines.push(format!("{marker} {}", episode_line(entry.episode)));
    }

    lines.join("\n")
}

/// Show title, description, people, taxonomies and links
pub fn render_show_header(show: &Show) -> Vec<String> {
    let mut lines = vec![show.title.cyan().bold().to_string()];

    if let Some(stand_first) = show.stand_first.as_deref().filter(|s| !s.is_empty()) {
        lines.push(String::new());
        lines.push(stand_first.to_string());
    }

    if !show.personalities().is_empty() {
        lines.push(String::new());
        lines.push("Personalities".dimmed().bold().to_string());
        lines.push(personalities_line(show).dimmed().to_string());
    }

    if !show.taxonomies().is_empty() {
        lines.push(String::new());
        lines.push("Taxonomies".dimmed().bold().to_string());
        lines.push(taxonomies_line(show).dimmed().to_string());
    }

    if let Some(podcast) = &show.podcast {
        lines.push(String::new());
        if !show.url.is_empty() {
            lines.push(format!("{} {}", "Page:".yellow(), show.url));
        }
        if let Some(rss) = &podcast.rss {
            lines.push(format!("{} {}", "RSS:".yellow(), rss));
        }
        if let Some(itunes) = &podcast.itunes {
            lines.push(format!("{} {}", "iTunes:".yellow(), itunes));
        }
    }

    lines
}

/// `YYYY/MM/DD - title`, with the UTC publication day
pub fn episode_line(episode: &Episode) -> String {
    let date = episode
        .published_at()
        .map(|dt| dt.format("%Y/%m/%d").to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    format!("{} - {}", date.dimmed(), episode.title)
}

fn personalities_line(show: &Show) -> String {
    show.personalities()
        .iter()
        .map(|edge| match edge.relation.as_deref() {
            Some(relation)
                if !relation.is_empty()
                    && !HIDDEN_RELATIONS.contains(&relation.to_lowercase().as_str()) =>
            {
                format!("{} ({})", edge.node.name, relation)
            }
            _ => edge.node.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(" - ")
}

fn taxonomies_line(show: &Show) -> String {
    show.taxonomies()
        .iter()
        .map(|edge| edge.node.title.as_str())
        .collect::<Vec<_>>()
        .join(" / ")
}
