use std::path::PathBuf;

use anyhow::Context as _;
use stackfall_engine::{GameConfig, GameState, PieceSeed};
use tracing::{Level, info};

use crate::{tui::Tui, util};

use self::app::PlayApp;

mod app;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Seed for the piece sequence, as 32 hex digits (random when omitted)
    #[clap(long)]
    pub(super) seed: Option<PieceSeed>,
    /// JSON file overriding board dimensions, spawn position or preview length
    #[clap(long)]
    config: Option<PathBuf>,
    /// Write log events to this file
    #[clap(long)]
    log_file: Option<PathBuf>,
    /// Most verbose level written to the log file
    #[clap(long, default_value_t = Level::INFO)]
    pub(super) log_level: Level,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            seed: None,
            config: None,
            log_file: None,
            log_level: Level::INFO,
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        seed,
        config,
        log_file,
        log_level,
    } = arg;

    if let Some(path) = log_file {
        util::init_logging(path, *log_level)?;
    }

    let config = match config {
        Some(path) => util::read_config_file(path)?,
        None => GameConfig::default(),
    };
    let game = GameState::with_config(config, *seed).context("Invalid game configuration")?;
    info!(seed = ?seed, "starting game");

    let mut app = PlayApp::new(game, *seed);
    Tui::new().run(&mut app)
}
