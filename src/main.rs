use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chess_rules::config::GameConfig;
use chess_rules::console::ConsoleHandler;

fn main() -> Result<()> {
    // stdout carries the console protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = GameConfig::from_args(std::env::args().skip(1)).context("bad command line")?;
    info!(
        "starting {:?} game, level {}, computer plays {}",
        config.mode, config.level, config.computer_color
    );

    let mut console = ConsoleHandler::new(config);
    console.run()
}
