use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commit_chords::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_FETCH_TIMEOUT_SEC, DEFAULT_PORT, DEFAULT_UPSTREAM_URL,
};
use commit_chords::fetch::HttpProfileFetcher;
use commit_chords::{run_server, RequestsLoggingLevel};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the command line.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL profile pages are fetched from, the identifier is appended to it.
    #[clap(long, default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    /// Timeout in seconds for upstream requests.
    #[clap(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SEC)]
    pub fetch_timeout_sec: u64,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            port: self.port,
            logging_level: self.logging_level.clone(),
            upstream_url: self.upstream_url.clone(),
            fetch_timeout_sec: self.fetch_timeout_sec,
            frontend_dir_path: self.frontend_dir_path.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Could not initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!(
        "Scraping profiles from {} (timeout {}s)",
        app_config.upstream_url, app_config.fetch_timeout_sec
    );
    let fetcher = HttpProfileFetcher::new(&app_config.upstream_url, app_config.fetch_timeout_sec)
        .context("Could not create upstream client")?;

    info!("Ready to serve at port {}!", app_config.port);
    run_server(app_config.server_config(), Arc::new(fetcher)).await
}
