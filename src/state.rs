use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::debug;

use crate::episode::{AUDIO_EXTENSION, Episode};

/// Episodes already present in the output directory
///
/// Each entry has the form `"<podcast-dir>/<file-stem>.mp3"`, the same shape
/// as a derived episode path, so membership answers "is this episode
/// already downloaded".
#[derive(Debug, Clone, Default)]
pub struct OutputState {
    /// The resolved output directory
    pub output_dir: PathBuf,
    /// Download entries found on disk
    pub entries: HashSet<String>,
}

impl OutputState {
    /// Check a derived relative path against the scanned entries
    pub fn contains(&self, relative_path: &str) -> bool {
        self.entries.contains(relative_path)
    }

    /// Check whether an episode's derived path is already on disk
    pub fn is_downloaded(&self, episode: &Episode) -> bool {
        episode
            .file_path
            .as_deref()
            .is_some_and(|path| self.contains(path))
    }
}

/// Episodes split by whether they still need downloading
#[derive(Debug, Clone)]
pub struct DownloadPlan {
    /// Episodes that need to be downloaded
    pub to_download: Vec<Episode>,
    /// Episodes already present in the output directory
    pub already_present: Vec<Episode>,
}

/// Resolve the output directory against the working directory
pub fn resolve_output_dir(output_dir: &Path) -> PathBuf {
    if output_dir.is_absolute() {
        return output_dir.to_path_buf();
    }

    match std::env::current_dir() {
        Ok(cwd) => cwd.join(output_dir),
        Err(e) => {
            debug!(error = %e, "working directory unavailable, using path as given");
            output_dir.to_path_buf()
        }
    }
}

/// Scan the output directory for already-downloaded episodes
///
/// Every direct subdirectory is a podcast folder and every regular file
/// directly inside one is an episode. Deeper directories are ignored. A
/// missing output directory is the normal first-run state and yields an
/// empty result; unreadable entries are skipped. This never fails.
pub async fn scan_output_dir(output_dir: &Path) -> OutputState {
    let output_dir = resolve_output_dir(output_dir);

    if !is_directory(&output_dir).await {
        debug!(path = %output_dir.display(), "output directory not found");
        return OutputState {
            output_dir,
            entries: HashSet::new(),
        };
    }

    let names = list_entries(&output_dir).await;
    let checks = join_all(names.iter().map(|name| is_directory_at(&output_dir, name))).await;
    let podcast_dirs: Vec<&String> = names
        .iter()
        .zip(checks)
        .filter_map(|(name, is_dir)| is_dir.then_some(name))
        .collect();

    let per_podcast = join_all(
        podcast_dirs
            .into_iter()
            .map(|name| scan_podcast_dir(&output_dir, name)),
    )
    .await;

    OutputState {
        output_dir,
        entries: per_podcast.into_iter().flatten().collect(),
    }
}

/// Split episodes into those to download and those already on disk
pub fn create_download_plan(episodes: Vec<Episode>, state: &OutputState) -> DownloadPlan {
    let (already_present, to_download): (Vec<_>, Vec<_>) = episodes
        .into_iter()
        .partition(|episode| state.is_downloaded(episode));

    DownloadPlan {
        to_download,
        already_present,
    }
}

async fn scan_podcast_dir(output_dir: &Path, podcast: &str) -> Vec<String> {
    let dir = output_dir.join(podcast);
    let files = list_entries(&dir).await;
    let checks = join_all(files.iter().map(|file| is_file_at(&dir, file))).await;

    files
        .iter()
        .zip(checks)
        .filter(|(_, is_file)| *is_file)
        .map(|(file, _)| download_entry(podcast, file))
        .collect()
}

/// Build the entry for a file found in a podcast folder
///
/// The on-disk extension is replaced by `.mp3` whatever it was.
fn download_entry(podcast: &str, file_name: &str) -> String {
    format!(
        "{podcast}/{}.{AUDIO_EXTENSION}",
        strip_extension(file_name)
    )
}

/// Remove everything from the last `.` on, if something follows it
fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(pos) if pos + 1 < file_name.len() => &file_name[..pos],
        _ => file_name,
    }
}

/// Names of the direct children of a directory, empty if it cannot be read
async fn list_entries(dir: &Path) -> Vec<String> {
    let mut read_dir = match tokio::fs::read_dir(dir).await {
        Ok(read_dir) => read_dir,
        Err(e) => {
            debug!(path = %dir.display(), error = %e, "skipping unreadable directory");
            return Vec::new();
        }
    };

    let mut names = Vec::new();
    loop {
        match read_dir.next_entry().await {
            Ok(Some(entry)) => match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => debug!(name = ?raw, "skipping non UTF-8 entry"),
            },
            Ok(None) => break,
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "stopped reading directory");
                break;
            }
        }
    }

    names
}

async fn is_directory(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

async fn is_directory_at(parent: &Path, name: &str) -> bool {
    is_directory(&parent.join(name)).await
}

async fn is_file_at(parent: &Path, name: &str) -> bool {
    let path = parent.join(name);
    match tokio::fs::metadata(&path).await {
        Ok(meta) => meta.is_file(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping entry that cannot be stat'ed");
            false
        }
    }
}
