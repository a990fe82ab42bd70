use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commit_chords::fetch::GridClient;
use commit_chords::grid::ColorGrid;
use commit_chords::playback::{
    Completion, GraphRenderer, LoopReset, PlaybackController, PlaybackSettings, SoundEngine,
    StartAction,
};
use commit_chords::PitchLabel;

#[derive(Parser, Debug)]
struct CliArgs {
    /// Profile to play.
    pub identifier: String,

    /// URL of a running commit-chords server.
    #[clap(long, default_value = "http://127.0.0.1:3000")]
    pub server_url: String,

    /// Tempo, in quarter notes per minute.
    #[clap(long, default_value_t = 10)]
    pub bpm: u32,

    /// Ticks per quarter note.
    #[clap(long, default_value_t = 192)]
    pub ppq: u32,

    /// Play the sequence once instead of looping.
    #[clap(long)]
    pub no_loop: bool,

    /// When the graph is cleared at each loop.
    #[clap(long, default_value = "before-first-row")]
    pub loop_reset: LoopReset,

    /// Stop after this many passes over the sequence.
    #[clap(long)]
    pub max_passes: Option<u64>,

    /// Timeout in seconds for the scrape request.
    #[clap(long, default_value_t = 30)]
    pub timeout_sec: u64,
}

/// Prints chords instead of synthesizing them.
struct LoggingSoundEngine;

impl SoundEngine for LoggingSoundEngine {
    fn trigger_attack_release(&mut self, pitches: &[PitchLabel], duration_ticks: u64, at_tick: u64) {
        let chord: Vec<String> = pitches.iter().map(|p| p.to_string()).collect();
        info!("@{:>6} [{}] for {} ticks", at_tick, chord.join(" "), duration_ticks);
    }
}

async fn fetch_grid(client: &GridClient, identifier: &str) -> ColorGrid {
    match client.fetch_grid(identifier).await {
        Ok(grid) => grid,
        Err(err) => {
            error!("Scrape failed: {}", err);
            ColorGrid::default()
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

    let settings = PlaybackSettings {
        bpm: cli_args.bpm,
        ppq: cli_args.ppq,
        looping: !cli_args.no_loop,
        loop_reset: cli_args.loop_reset,
    };
    let tick_duration = settings.tick_duration();
    let mut controller = PlaybackController::new(settings);
    let client = GridClient::new(&cli_args.server_url, cli_args.timeout_sec)
        .context("Could not create scrape client")?;

    let ticket = match controller.request_start(&cli_args.identifier) {
        StartAction::Fetch(ticket) => ticket,
        other => {
            warn!("Nothing to fetch: {:?}", other);
            return Ok(());
        }
    };
    info!("Fetching {} from {}...", ticket.identifier, cli_args.server_url);
    let grid = fetch_grid(&client, &ticket.identifier).await;

    match controller.complete_fetch(&ticket, &grid) {
        Completion::Playing { events } => info!("{} chords, {:?} per tick", events, tick_duration),
        Completion::NoData | Completion::Stale => {
            info!("Nothing to play for {}.", cli_args.identifier);
            return Ok(());
        }
    }

    let mut engine = LoggingSoundEngine;
    let mut surface = GraphRenderer::new();
    let mut ticker = tokio::time::interval(tick_duration);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Burst);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if controller.tick(1, &mut engine, &mut surface) > 0 {
                    if let Some(row) = surface.rows().last() {
                        println!("{}", GraphRenderer::row_to_text(row));
                    }
                }

                let passes = controller
                    .session()
                    .map(|s| s.scheduler().completed_passes())
                    .unwrap_or(0);
                let finished = controller
                    .session()
                    .is_some_and(|s| !s.looping() && s.scheduler().next_due_tick().is_none());
                if finished || cli_args.max_passes.is_some_and(|max| passes >= max) {
                    controller.request_stop();
                    info!("Done after {} passes.", passes);
                    break;
                }
            }
            _ = &mut ctrl_c => {
                controller.request_stop();
                info!("Stopped.");
                break;
            }
        }
    }

    Ok(())
}
