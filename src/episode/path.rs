use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::model::Episode;
use super::sanitize::sanitize;

/// Maximum length of the podcast folder segment
const MAX_FOLDER_LENGTH: usize = 100;

/// Maximum length of the title portion of a filename
const MAX_TITLE_LENGTH: usize = 80;

const UNKNOWN_PODCAST: &str = "unknown-podcast";
const UNKNOWN_DATE: &str = "unknown";

/// Extension given to every downloaded episode
pub const AUDIO_EXTENSION: &str = "mp3";

/// Relative download path of an episode
///
/// Format: `"{podcast}/{YYYY-MM-DD}-{title}.mp3"`, with `/` as separator
/// whatever the platform. The date is the UTC day of the publication
/// timestamp, or `unknown` when it is missing or malformed. The same
/// inputs always give the same path, which is what lets a directory scan
/// recognize earlier downloads.
pub fn episode_file_path(episode: &Episode, podcast_name: Option<&str>) -> String {
    let folder = podcast_name
        .filter(|name| !name.is_empty())
        .map(|name| sanitize(name, MAX_FOLDER_LENGTH))
        .filter(|folder| !folder.is_empty())
        .unwrap_or_else(|| UNKNOWN_PODCAST.to_string());

    let date = episode
        .published_at()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string());

    let title = sanitize(&episode.title, MAX_TITLE_LENGTH);

    format!("{folder}/{date}-{title}.{AUDIO_EXTENSION}")
}

/// Interpret text as Unix epoch seconds
///
/// Fractional and exponent forms are accepted; anything that is not a
/// finite, representable instant yields `None`.
pub fn parse_published_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(seconds) = raw.parse::<i64>() {
        return DateTime::from_timestamp(seconds, 0);
    }

    let seconds = raw.parse::<f64>().ok().filter(|s| s.is_finite())?;
    DateTime::from_timestamp_millis((seconds * 1000.0).floor() as i64)
}

/// Join a `/`-separated relative path onto a local directory
pub fn resolve_relative(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_episode(title: &str, date: Option<&str>) -> Episode {
        Episode {
            id: "ep-1".to_string(),
            title: title.to_string(),
            podcast_url: "https://example.com/ep.mp3".to_string(),
            published_date: date.map(String::from),
            page_url: None,
            player_url: None,
            file_path: None,
        }
    }

    #[test]
    fn derives_path_with_utc_date() {
        let episode = make_episode("Hello World", Some("1700000000"));
        assert_eq!(
            episode_file_path(&episode, Some("My Show")),
            "my-show/2023-11-14-hello-world.mp3"
        );
    }

    #[test]
    fn uses_fallbacks_without_podcast_or_date() {
        let episode = make_episode("X", None);
        assert_eq!(
            episode_file_path(&episode, None),
            "unknown-podcast/unknown-x.mp3"
        );
    }

    #[test]
    fn empty_podcast_name_uses_fallback() {
        let episode = make_episode("X", None);
        assert_eq!(
            episode_file_path(&episode, Some("")),
            "unknown-podcast/unknown-x.mp3"
        );
    }

    #[test]
    fn podcast_name_without_usable_chars_uses_fallback() {
        let episode = make_episode("X", None);
        assert_eq!(
            episode_file_path(&episode, Some("???")),
            "unknown-podcast/unknown-x.mp3"
        );
    }

    #[test]
    fn malformed_dates_fail_closed() {
        for date in ["", "   ", "yesterday", "NaN", "inf", "1e400"] {
            let episode = make_episode("X", Some(date));
            assert_eq!(
                episode_file_path(&episode, Some("Show")),
                "show/unknown-x.mp3",
                "date {date:?}"
            );
        }
    }

    #[test]
    fn date_just_before_midnight_utc_stays_on_that_day() {
        // 2024-01-15T23:59:59Z
        let episode = make_episode("Late", Some("1705363199"));
        assert_eq!(
            episode_file_path(&episode, Some("Show")),
            "show/2024-01-15-late.mp3"
        );
    }

    #[test]
    fn fractional_seconds_are_accepted() {
        let episode = make_episode("X", Some("1700000000.75"));
        assert_eq!(
            episode_file_path(&episode, Some("Show")),
            "show/2023-11-14-x.mp3"
        );
    }

    #[test]
    fn long_names_are_bounded() {
        let episode = make_episode(&"Title ".repeat(40), Some("0"));
        let path = episode_file_path(&episode, Some(&"Podcast ".repeat(40)));

        let (folder, file) = path.split_once('/').unwrap();
        assert!(folder.len() <= MAX_FOLDER_LENGTH);
        assert!(file.starts_with("1970-01-01-"));
        let title = file
            .trim_start_matches("1970-01-01-")
            .trim_end_matches(".mp3");
        assert!(title.len() <= MAX_TITLE_LENGTH);
        assert!(!title.ends_with('-'));
    }

    #[test]
    fn derivation_is_deterministic() {
        let episode = make_episode("Le Débat du Jour", Some("1700000000"));
        assert_eq!(
            episode_file_path(&episode, Some("France Inter")),
            episode_file_path(&episode.clone(), Some("France Inter"))
        );
    }

    #[test]
    fn resolve_relative_splits_on_forward_slashes() {
        let root = Path::new("downloads");
        let path = resolve_relative(root, "my-show/2023-11-14-hello-world.mp3");

        assert_eq!(
            path,
            Path::new("downloads")
                .join("my-show")
                .join("2023-11-14-hello-world.mp3")
        );
    }
}
