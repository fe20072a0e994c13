//! Headless tile grid runner (default binary).
//!
//! Loads a level (or starts a classic board), then either replays an input
//! script or serves the JSON adapter until the process is stopped.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tile_grid::adapter::{apply_command, Adapter};
use tile_grid::core::{Game, LevelData, SeededSource};
use tile_grid::script::parse_script;
use tile_grid::types::{GameMode, Notice, DEFAULT_CLASSIC_HEIGHT, DEFAULT_CLASSIC_WIDTH};

#[derive(Parser, Debug)]
#[command(name = "tile-grid", about = "Deterministic tile-matching puzzle runner")]
struct Args {
    /// Level file (required for challenge mode)
    level: Option<PathBuf>,

    /// Seed for spawns and `?` tiles
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Game mode
    #[arg(long, value_enum, default_value_t = Mode::Challenge)]
    mode: Mode,

    /// Classic board width
    #[arg(long, default_value_t = DEFAULT_CLASSIC_WIDTH)]
    width: u16,

    /// Classic board height
    #[arg(long, default_value_t = DEFAULT_CLASSIC_HEIGHT)]
    height: u16,

    /// Comma-separated inputs to replay, e.g. `l,u,s:1:5,undo,restore`
    #[arg(long)]
    script: Option<String>,

    /// Serve the JSON adapter (TILE_GRID_* environment variables apply)
    #[arg(long)]
    serve: bool,

    /// Print the final snapshot as JSON instead of a board dump
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Empty board, a random tile after every tick
    Classic,
    /// Level file with move and swap budgets
    Challenge,
}

impl From<Mode> for GameMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Classic => GameMode::Classic,
            Mode::Challenge => GameMode::Challenge,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut game = build_game(&args)?;

    if args.serve {
        let Some(mut adapter) = Adapter::start_from_env()? else {
            bail!("adapter disabled via TILE_GRID_DISABLED");
        };
        adapter.serve(&mut game);
        return Ok(());
    }

    if let Some(script) = args.script.as_deref() {
        let commands = parse_script(script)?;
        for command in commands {
            match apply_command(&mut game, command) {
                Ok(changed) => info!(?command, changed, "input applied"),
                Err(e) => warn!(?command, error = %e, "input rejected"),
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&game.snapshot())?);
    } else {
        print!("{}", game.grid());
        println!(
            "state={} moves={} swaps={} undo={} tiles={} reward={}",
            game.state().as_str(),
            game.moves_left(),
            game.swaps_left(),
            game.undo_credits(),
            game.grid().spawned_count(),
            game.reward_tier().as_str(),
        );
    }
    Ok(())
}

fn build_game(args: &Args) -> Result<Game> {
    let source = Box::new(SeededSource::new(args.seed));

    let game = match GameMode::from(args.mode) {
        GameMode::Classic => Game::classic(args.width, args.height, source)?,
        GameMode::Challenge => {
            let Some(path) = args.level.as_ref() else {
                bail!("challenge mode needs a level file");
            };
            let level = LevelData::from_path(path)
                .with_context(|| format!("failed to load level {}", path.display()))?;
            Game::challenge(&level, source)?
        }
    };

    Ok(game.with_notifier(|notice: Notice| info!(message = %notice.message, "notice")))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
