use clap::Parser;
use tracing_subscriber::EnvFilter;

use gain_rpg::commands::Cli;
use gain_rpg::config::AppConfig;

fn main() {
    // RUST_LOG wins, then LOG_LEVEL
    let config = AppConfig::from_env().unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    let cli = Cli::parse();

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(cli.execute()));

    if let Err(e) = result {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
