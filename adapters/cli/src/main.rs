#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Grid Defence session headlessly.

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use grid_defence_core::{CellCoord, Event, TowerTypeId};
use grid_defence_session::{Session, SessionConfig, SessionSummary};
use tracing_subscriber::EnvFilter;

/// Headless Grid Defence runner.
#[derive(Parser, Debug)]
#[command(name = "grid-defence")]
#[command(about = "Runs a grid defence session without rendering and prints a summary")]
struct Args {
    /// TOML session configuration; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tower to build before play starts, as `column,row`. Repeatable.
    #[arg(long = "tower", value_parser = parse_cell)]
    towers: Vec<CellCoord>,

    /// Catalog tier of the scripted towers.
    #[arg(long, default_value_t = 1)]
    tower_type: u8,

    /// Simulation speed multiplier, overriding the configuration.
    #[arg(long)]
    speed: Option<f32>,

    /// Real time covered by one frame, in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Real time after which the run is abandoned, in seconds.
    #[arg(long, default_value_t = 600)]
    max_seconds: u64,

    /// Number of waves in the game, overriding the configuration.
    #[arg(long)]
    waves: Option<u32>,
}

/// Event counts gathered while the session runs.
#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    spawned: u32,
    killed: u32,
    escaped: u32,
    shots: u32,
}

impl Tally {
    fn record(&mut self, event: &Event) {
        match event {
            Event::EnemySpawned { .. } => self.spawned += 1,
            Event::EnemyKilled { .. } => self.killed += 1,
            Event::EnemyReachedEnd { .. } => self.escaped += 1,
            Event::TowerFired { .. } => self.shots += 1,
            _ => {}
        }
    }
}

/// Entry point for the Grid Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    ensure!(args.frame_ms > 0, "--frame-ms must be positive");

    let config = resolve_config(&args)?;
    let mut session = Session::create(config).context("failed to create session")?;

    let kind = TowerTypeId::new(args.tower_type);
    for cell in &args.towers {
        match session.place_tower(*cell, kind) {
            Ok(tower) => tracing::info!(?cell, tower = tower.get(), "tower built"),
            Err(error) => tracing::warn!(?cell, %error, "tower rejected"),
        }
    }

    let frame = Duration::from_millis(args.frame_ms);
    let frames = args.max_seconds.saturating_mul(1_000) / args.frame_ms;
    let tally = run(&mut session, frame, frames);

    println!("{}", render_summary(&session.dispose(), &tally));
    Ok(())
}

fn resolve_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            SessionConfig::from_toml_str(&source)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => SessionConfig::default(),
    };

    if let Some(speed) = args.speed {
        config.time_scale = speed;
    }
    if let Some(waves) = args.waves {
        config.waves.max_waves = waves;
    }
    config.validate().context("invalid command-line overrides")?;
    Ok(config)
}

fn run(session: &mut Session, frame: Duration, frames: u64) -> Tally {
    let mut tally = Tally::default();
    for _ in 0..frames {
        session.tick(frame);
        for event in session.drain_events() {
            tally.record(&event);
        }
        if session.state() != grid_defence_session::SessionState::Running {
            break;
        }
    }
    tally
}

fn render_summary(summary: &SessionSummary, tally: &Tally) -> String {
    format!(
        "outcome: {:?}\nwaves completed: {}\nmoney: {}\nlives: {}\nsimulated: {:.1}s\n\
         enemies spawned: {}, killed: {}, escaped: {}\nshots fired: {}",
        summary.state,
        summary.waves_completed,
        summary.money,
        summary.lives,
        summary.elapsed.as_secs_f32(),
        tally.spawned,
        tally.killed,
        tally.escaped,
        tally.shots,
    )
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `column,row`, got `{value}`"))?;
    let column = column
        .trim()
        .parse()
        .map_err(|error| format!("invalid column `{column}`: {error}"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|error| format!("invalid row `{row}`: {error}"))?;
    Ok(CellCoord::new(column, row))
}
