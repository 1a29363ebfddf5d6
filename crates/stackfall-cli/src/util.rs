use std::{fs::File, io::BufReader, path::Path, sync::Mutex};

use anyhow::Context as _;
use stackfall_engine::GameConfig;
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, prelude::*};

pub(crate) fn read_config_file(path: &Path) -> anyhow::Result<GameConfig> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open config file: {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Sends log events to `path`. The terminal itself belongs to the TUI.
pub(crate) fn init_logging(path: &Path, level: Level) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(LevelFilter::from_level(level))
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}
