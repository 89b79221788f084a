use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use console::{Emoji, Term};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use frpd::browse::run_browser;
use frpd::config::{DEFAULT_EPISODE_LIMIT, DEFAULT_GRAPHQL_URI, DEFAULT_OUTPUT_DIR};
use frpd::render::{ShowReport, render_json, render_table};
use frpd::{
    ApiConfig, GraphqlClient, NoopReporter, ProgressEvent, ProgressReporter, ProxyConfig,
    ReqwestClient, SharedProgressReporter, ShowSource, SyncOptions, fetch_episodes,
    scan_output_dir, sync_show,
};

// Emoji with fallback for terminals without Unicode support
static RADIO: Emoji<'_, '_> = Emoji("📻 ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static DOWNLOAD: Emoji<'_, '_> = Emoji("📥 ", "[v] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "x ");

/// France Radio Podcast Dropper - browse and download podcast episodes
#[derive(Parser, Debug)]
#[command(name = "frpd")]
#[command(about = "France Radio Podcast Dropper - browse and download podcast episodes")]
#[command(version)]
struct Args {
    #[command(flatten)]
    api: ApiArgs,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct ApiArgs {
    /// GraphQL endpoint of the podcast API
    #[arg(long, env = "GRAPHQL_URI", default_value = DEFAULT_GRAPHQL_URI, global = true)]
    graphql_uri: String,

    /// API token sent as the x-token header
    #[arg(long, env = "GRAPHQL_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Proxy for HTTP requests (also used for HTTPS when no HTTPS proxy is set)
    #[arg(long, env = "HTTP_PROXY", global = true)]
    http_proxy: Option<String>,

    /// Proxy for HTTPS requests
    #[arg(long, env = "HTTPS_PROXY", global = true)]
    https_proxy: Option<String>,
}

#[derive(clap::Args, Debug)]
struct ShowArgs {
    /// Public page URL of the show
    emission_url: String,

    /// Directory episodes are downloaded into
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Number of latest episodes to list
    #[arg(short = 'n', long, default_value_t = DEFAULT_EPISODE_LIMIT)]
    limit: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show information about an emission and its latest episodes
    Info {
        #[command(flatten)]
        show: ShowArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },

    /// Pick episodes to download from an interactive list
    Browse {
        #[command(flatten)]
        show: ShowArgs,
    },

    /// Download every listed episode that is not on disk yet
    Download {
        #[command(flatten)]
        show: ShowArgs,

        /// Quiet mode - suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// List radio brands
    Brands,

    /// List the themes of a brand
    Themes {
        /// Brand identifier, as listed by `brands`
        brand_id: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Table,
    Json,
}

/// Progress reporter using indicatif for terminal output
struct IndicatifReporter {
    multi: MultiProgress,
    main_bar: ProgressBar,
    download_bar: Mutex<Option<ProgressBar>>,
}

impl IndicatifReporter {
    fn new() -> Self {
        let multi = MultiProgress::new();

        let main_style = ProgressStyle::with_template("{spinner:.green} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let main_bar = multi.add(ProgressBar::new_spinner());
        main_bar.set_style(main_style);
        main_bar.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            multi,
            main_bar,
            download_bar: Mutex::new(None),
        }
    }

    fn current_bar(&self) -> ProgressBar {
        let mut slot = self
            .download_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(bar) = slot.as_ref() {
            return bar.clone();
        }

        let style = ProgressStyle::with_template(&format!(
            "  {DOWNLOAD}[{{bar:30.cyan/blue}}] {{bytes}}/{{total_bytes}} {{wide_msg}}"
        ))
        .map(|style| style.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());

        let bar = self.multi.add(ProgressBar::new(0));
        bar.set_style(style);
        *slot = Some(bar.clone());
        bar
    }

    fn finish_bar(&self, line: String) {
        let bar = self
            .download_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        let _ = self.multi.println(line);
    }
}

impl ProgressReporter for IndicatifReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FetchingShow { url } => {
                self.main_bar
                    .set_message(format!("{SEARCH}Fetching show: {}", url.cyan()));
            }

            ProgressEvent::ShowLoaded {
                show_title,
                total_episodes,
                already_downloaded,
            } => {
                self.main_bar.set_message(format!(
                    "{HEADPHONES}{} • {} episodes listed, {} already downloaded",
                    show_title.bold().green(),
                    total_episodes.to_string().cyan(),
                    already_downloaded.to_string().yellow()
                ));
            }

            ProgressEvent::DownloadStarting {
                episode_title,
                episode_index,
                total_to_download,
                content_length,
            } => {
                let bar = self.current_bar();
                bar.set_length(content_length.unwrap_or(0));
                bar.set_position(0);
                bar.set_message(format!(
                    "[{}/{}] {}",
                    (episode_index + 1).to_string().cyan(),
                    total_to_download.to_string().cyan(),
                    truncate_title(&episode_title, 40)
                ));
            }

            ProgressEvent::DownloadProgress {
                bytes_downloaded,
                total_bytes,
                ..
            } => {
                let bar = self.current_bar();
                if let Some(total) = total_bytes {
                    bar.set_length(total);
                }
                bar.set_position(bytes_downloaded);
            }

            ProgressEvent::DownloadCompleted { episode_title, .. } => {
                self.finish_bar(format!(
                    "  {SUCCESS}{}",
                    truncate_title(&episode_title, 60).green()
                ));
            }

            ProgressEvent::DownloadFailed {
                episode_title,
                error,
            } => {
                self.finish_bar(format!(
                    "  {FAILURE}{} - {}",
                    truncate_title(&episode_title, 40).red(),
                    error.red()
                ));
            }

            ProgressEvent::SyncCompleted {
                downloaded_count,
                existing_count,
                failed_count,
            } => {
                self.main_bar.finish_and_clear();
                println!(
                    "\n{PARTY}{} {} downloaded, {} already present, {} failed",
                    "Download complete:".bold().green(),
                    downloaded_count.to_string().green().bold(),
                    existing_count.to_string().yellow(),
                    if failed_count > 0 {
                        failed_count.to_string().red().bold()
                    } else {
                        failed_count.to_string().green()
                    }
                );
            }
        }
    }
}

fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() <= max_len {
        title.to_string()
    } else {
        let kept: String = title.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "frpd=debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Lowercase variants are common on Unix and not covered by clap's env lookup
    let proxies = ProxyConfig::new(
        args.api
            .http_proxy
            .or_else(|| std::env::var("http_proxy").ok()),
        args.api
            .https_proxy
            .or_else(|| std::env::var("https_proxy").ok()),
    );

    let http = ReqwestClient::with_proxies(&proxies).context("Failed to set up HTTP client")?;
    let api_config = ApiConfig::new(&args.api.graphql_uri, args.api.token)
        .context("Invalid API configuration")?;
    let api = GraphqlClient::new(http.clone(), api_config);

    match args.command {
        Command::Info { show, format } => {
            let emission = api
                .get_show(&show.emission_url)
                .await
                .context("Failed to fetch show")?;
            let Some(emission) = emission else {
                bail!("No show found at {}", show.emission_url);
            };

            let episodes =
                fetch_episodes(&api, &show.emission_url, Some(&emission.title), show.limit)
                    .await
                    .context("Failed to fetch episodes")?;
            let state = scan_output_dir(&show.output).await;
            let report = ShowReport::new(&emission, &episodes, &state);

            match format {
                Format::Table => println!("{}", render_table(&report)),
                Format::Json => println!(
                    "{}",
                    render_json(&report).context("Failed to serialize show")?
                ),
            }
        }

        Command::Browse { show } => {
            let emission = api
                .get_show(&show.emission_url)
                .await
                .context("Failed to fetch show")?;
            let Some(emission) = emission else {
                bail!("No show found at {}", show.emission_url);
            };

            let episodes =
                fetch_episodes(&api, &show.emission_url, Some(&emission.title), show.limit)
                    .await
                    .context("Failed to fetch episodes")?;
            let state = scan_output_dir(&show.output).await;

            let term = Term::stdout();
            run_browser(&term, &http, &emission, episodes, &state)
                .await
                .context("Interactive session failed")?;
        }

        Command::Download { show, quiet } => {
            if !quiet {
                println!(
                    "\n{}{} {}\n",
                    RADIO,
                    "frpd".bold().magenta(),
                    "- Podcast Dropper".dimmed()
                );
            }

            let reporter: SharedProgressReporter = if quiet {
                NoopReporter::shared()
            } else {
                Arc::new(IndicatifReporter::new())
            };

            let options = SyncOptions {
                episode_limit: show.limit,
            };

            let result = sync_show(
                &api,
                &http,
                &show.emission_url,
                &show.output,
                &options,
                reporter,
            )
            .await
            .context("Failed to download show")?;

            if !quiet && !result.failed_episodes.is_empty() {
                println!("\n{}", "Failed episodes:".red().bold());
                for (title, error) in &result.failed_episodes {
                    println!("  {}{} - {}", CROSS, title.yellow(), error.dimmed());
                }
            }

            if !quiet {
                println!(
                    "\n{FOLDER}Output: {}\n",
                    show.output.display().to_string().cyan()
                );
            }

            if result.failed > 0 && result.downloaded == 0 {
                std::process::exit(1);
            }
        }

        Command::Brands => {
            let brands = api.brands().await.context("Failed to fetch brands")?;
            for brand in brands {
                match brand.baseline.as_deref().filter(|b| !b.is_empty()) {
                    Some(baseline) => println!(
                        "{} {} - {}",
                        brand.id.cyan(),
                        brand.title.bold(),
                        baseline.dimmed()
                    ),
                    None => println!("{} {}", brand.id.cyan(), brand.title.bold()),
                }
            }
        }

        Command::Themes { brand_id } => {
            let themes = api
                .themes(&brand_id)
                .await
                .context("Failed to fetch themes")?;
            if themes.is_empty() {
                println!("{}", format!("No themes for brand {brand_id}").dimmed());
            }
            for theme in themes {
                println!("{} {}", theme.id.cyan(), theme.title.bold());
                if let Some(description) = theme.description.as_deref().filter(|d| !d.is_empty()) {
                    println!("    {}", description.dimmed());
                }
            }
        }
    }

    Ok(())
}
