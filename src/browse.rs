// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use colored::Colorize;
use console::{Key, Term};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use tokio::sync::mpsc;

use crate::api::Show;
use crate::episode::{DownloadContext, Episode, download_episode};
use crate::http::HttpClient;
use crate::progress::NoopReporter;
use crate::render::{episode_line, render_show_header};
use crate::state::OutputState;

const HELP_LINE: &str = "[↑/↓] navigate  [Enter] download  [q] quit";

/// Download state of an episode in the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeStatus {
    /// Found on disk when the list was loaded
    Existing,
    Downloading,
    Downloaded,
    Failed,
}

/// What the caller should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserAction {
    Nothing,
    Download(usize),
    Quit,
}

/// Selectable episode list
///
/// Holds selection and per-episode status; all terminal I/O lives in
/// [`run_browser`].
#[derive(Debug)]
pub struct Browser {
    episodes: Vec<Episode>,
    selected: usize,
    statuses: HashMap<String, EpisodeStatus>,
    downloading: Option<usize>,
    message: Option<String>,
}

impl Browser {
    pub fn new(episodes: Vec<Episode>, state: &OutputState) -> Self {
        let statuses = episodes
            .iter()
            .filter(|episode| state.is_downloaded(episode))
            .map(|episode| (status_key(episode).to_string(), EpisodeStatus::Existing))
            .collect();

        Self {
            episodes,
            selected: 0,
            statuses,
            downloading: None,
            message: None,
        }
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading.is_some()
    }

    pub fn status(&self, episode: &Episode) -> Option<EpisodeStatus> {
        self.statuses.get(status_key(episode)).copied()
    }

    /// Move the selection up, wrapping to the last episode
    pub fn select_previous(&mut self) {
        if self.episodes.is_empty() {
            return;
        }
        self.selected = match self.selected {
            0 => self.episodes.len() - 1,
            n => n - 1,
        };
    }

    /// Move the selection down, wrapping to the first episode
    pub fn select_next(&mut self) {
        if self.episodes.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.episodes.len();
    }

    pub fn handle_key(&mut self, key: &Key) -> BrowserAction {
        match key {
            Key::Char('q') | Key::Char('Q') => BrowserAction::Quit,
            Key::ArrowUp => {
                self.select_previous();
                BrowserAction::Nothing
            }
            Key::ArrowDown => {
                self.select_next();
                BrowserAction::Nothing
            }
            Key::Enter if !self.is_downloading() && self.selected < self.episodes.len() => {
                BrowserAction::Download(self.selected)
            }
            _ => BrowserAction::Nothing,
        }
    }

    pub fn start_download(&mut self, index: usize) {
        if let Some(episode) = self.episodes.get(index) {
            self.statuses
                .insert(status_key(episode).to_string(), EpisodeStatus::Downloading);
            self.downloading = Some(index);
            self.message = None;
        }
    }

    pub fn finish_download(&mut self, index: usize, outcome: Result<PathBuf, String>) {
        self.downloading = None;
        let Some(episode) = self.episodes.get(index) else {
            return;
        };

        let (status, message) = match outcome {
            Ok(path) => (
                EpisodeStatus::Downloaded,
                format!("Saved to {}", path.display()),
            ),
            Err(error) => (
                EpisodeStatus::Failed,
                format!("Failed to download '{}': {}", episode.title, error),
            ),
        };

        self.statuses.insert(status_key(episode).to_string(), status);
        self.message = Some(message);
    }

    /// Lines of the episode list, selection marker and status included
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Latest Episodes ({}):", self.episodes.len())
                .green()
                .bold()
                .to_string(),
        ];

        for (index, episode) in self.episodes.iter().enumerate() {
            let cursor = if index == self.selected {
                "▸".cyan().to_string()
            } else {
                " ".to_string()
            };
            let status = match self.status(episode) {
                Some(EpisodeStatus::Existing) => " [existing]".dimmed().to_string(),
                Some(EpisodeStatus::Downloading) => " [downloading…]".yellow().to_string(),
                Some(EpisodeStatus::Downloaded) => " [downloaded]".green().to_string(),
                Some(EpisodeStatus::Failed) => " [failed]".red().to_string(),
                None => String::new(),
            };
            lines.push(format!("{cursor} {}{status}", episode_line(episode)));
        }

        if let Some(message) = &self.message {
            lines.push(String::new());
            lines.push(message.clone());
        }

        lines
    }
}

/// Status map key: the derived path, or the id when no path is known
fn status_key(episode: &Episode) -> &str {
    episode.file_path.as_deref().unwrap_or(&episode.id)
}

fn draw(term: &Term, header: &[String], browser: &Browser) -> io::Result<()> {
    term.clear_screen()?;
    for line in header {
        term.write_line(line)?;
    }
    term.write_line("")?;
    for line in browser.render() {
        term.write_line(&line)?;
    }
    term.write_line("")?;
    term.write_line(&HELP_LINE.dimmed().to_string())
}

/// Interactive episode picker
///
/// Keys keep being handled while a download runs, so the list stays
/// navigable; Enter is ignored until the download finishes.
pub async fn run_browser<C: HttpClient + ?Sized>(
    term: &Term,
    client: &C,
    show: &Show,
    episodes: Vec<Episode>,
    state: &OutputState,
) -> io::Result<()> {
    let header = render_show_header(show);
    let mut browser = Browser::new(episodes, state);
    let (keys_tx, mut keys) = mpsc::unbounded_channel();
    spawn_key_reader(term.clone(), keys_tx);

    term.hide_cursor()?;
    let result = browse_loop(
        &mut browser,
        &mut keys,
        client,
        show,
        state,
        |browser: &Browser| draw(term, &header, browser),
    )
    .await;
    let restored = term.show_cursor();

    result.and(restored)
}

/// Forward key presses from the terminal until the receiver goes away
///
/// Runs on a plain thread: `read_key` blocks and cannot be cancelled.
fn spawn_key_reader(term: Term, keys: mpsc::UnboundedSender<io::Result<Key>>) {
    std::thread::spawn(move || {
        loop {
            let key = term.read_key();
            let failed = key.is_err();
            if keys.send(key).is_err() || failed {
                break;
            }
        }
    });
}

type PendingDownload<'a> = LocalBoxFuture<'a, (usize, Result<PathBuf, String>)>;

async fn browse_loop<C, D>(
    browser: &mut Browser,
    keys: &mut mpsc::UnboundedReceiver<io::Result<Key>>,
    client: &C,
    show: &Show,
    state: &OutputState,
    mut draw: D,
) -> io::Result<()>
where
    C: HttpClient + ?Sized,
    D: FnMut(&Browser) -> io::Result<()>,
{
    let reporter = NoopReporter::shared();
    let mut download: Option<PendingDownload<'_>> = None;

    loop {
        draw(browser)?;

        tokio::select! {
            key = keys.recv() => {
                let Some(key) = key else {
                    return Ok(());
                };

                match browser.handle_key(&key?) {
                    BrowserAction::Quit => return Ok(()),
                    BrowserAction::Nothing => {}
                    BrowserAction::Download(index) => {
                        let episode = browser.episodes()[index].clone();
                        let reporter = reporter.clone();
                        browser.start_download(index);

                        download = Some(
                            async move {
                                let outcome = download_episode(
                                    client,
                                    &episode,
                                    &state.output_dir,
                                    Some(&show.title),
                                    &DownloadContext::single(),
                                    &reporter,
                                )
                                .await
                                .map(|result| result.path)
                                .map_err(|e| e.to_string());
                                (index, outcome)
                            }
                            .boxed_local(),
                        );
                    }
                }
            }
            (index, outcome) = next_download(&mut download) => {
                download = None;
                browser.finish_download(index, outcome);
            }
        }
    }
}

/// Resolve the running download, or never when idle
async fn next_download(
    download: &mut Option<PendingDownload<'_>>,
) -> (usize, Result<PathBuf, String>) {
    match download {
        Some(pending) => pending.await,
        None => std::future::pending().await,
    }
}
