use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use webman::config::Config;
use webman::server::{self, ServerContext};

#[derive(Parser)]
#[command(name = "webman", about = "Browser file manager and system monitor")]
struct Cli {
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overriding config and `LISTEN`.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(),
    };
    if let Some(listen) = cli.listen {
        cfg.server.listen_addr = listen;
    }

    let ctx = ServerContext::new(cfg);

    tokio::select! {
        res = server::listener::run(ctx) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
