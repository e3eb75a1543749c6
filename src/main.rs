use anyhow::{Context, Result};
use crossterm::terminal;

use tailmux::{Config, Multiplexer};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from_args();

    // Layout depends on the width, so there is nothing to do without it.
    let columns = match config.width {
        Some(columns) => columns,
        None => {
            terminal::size()
                .context("Unable to determine terminal width")?
                .0
        }
    };

    let output = Multiplexer::stdout(config.color);
    tailmux::run(
        &config.sources,
        config.decode_mode,
        &config.tail,
        columns,
        output,
    )
    .await;

    Ok(())
}
