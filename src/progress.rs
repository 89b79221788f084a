use std::path::PathBuf;
use std::sync::Arc;

/// Events emitted while fetching shows and downloading episodes
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Show metadata is being fetched
    FetchingShow { url: String },

    /// Show and its episode list have been fetched and compared with disk
    ShowLoaded {
        show_title: String,
        total_episodes: usize,
        already_downloaded: usize,
    },

    /// A download is starting
    DownloadStarting {
        episode_title: String,
        /// Index of this episode in the download queue
        episode_index: usize,
        /// Total number of episodes to download
        total_to_download: usize,
        /// Expected content length in bytes, if known
        content_length: Option<u64>,
    },

    /// Download progress update
    DownloadProgress {
        episode_title: String,
        bytes_downloaded: u64,
        total_bytes: Option<u64>,
    },

    /// A download completed successfully
    DownloadCompleted {
        episode_title: String,
        bytes_downloaded: u64,
        path: PathBuf,
    },

    /// A download failed
    DownloadFailed { episode_title: String, error: String },

    /// Batch download completed
    SyncCompleted {
        downloaded_count: usize,
        existing_count: usize,
        failed_count: usize,
    },
}

/// Trait for reporting progress events.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
