pub mod api;
pub mod browse;
pub mod config;
pub mod episode;
pub mod error;
pub mod http;
pub mod progress;
pub mod render;
pub mod state;
pub mod sync;

// Re-export main types for convenience
pub use api::{GraphqlClient, Show, ShowSource};
pub use config::{ApiConfig, ProxyConfig};
pub use episode::{Episode, download_episode, episode_file_path, fetch_episodes, sanitize};
pub use error::{ApiError, ConfigError, DownloadError, SyncError};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use state::{OutputState, scan_output_dir};
pub use sync::{SyncOptions, SyncResult, sync_show};
