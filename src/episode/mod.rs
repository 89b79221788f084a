mod download;
mod model;
mod path;
mod sanitize;

pub use download::{DownloadContext, DownloadResult, download_episode};
pub use model::{Episode, fetch_episodes};
pub use path::{AUDIO_EXTENSION, episode_file_path, parse_published_date, resolve_relative};
pub use sanitize::sanitize;
