//! Slide Duel server (default binary).
//!
//! Binds the TCP listener and serves duels until interrupted.
//! Settings come from the environment; flags override them.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use slide_duel::adapter::server::{check_tcp_listen_available, run_server, ServerConfig};

#[derive(Parser)]
#[command(name = "slide-duel", about = "Two-player sliding-tile race server")]
#[command(version)]
struct Cli {
    /// Bind address [env: SLIDE_DUEL_HOST]
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on [env: SLIDE_DUEL_PORT, PORT]
    #[arg(short, long)]
    port: Option<u16>,

    /// Fixed seed for participant codes and boards [env: SLIDE_DUEL_SEED]
    #[arg(long)]
    seed: Option<u32>,

    /// Append every wire line to this file [env: SLIDE_DUEL_LOG_PATH]
    #[arg(long)]
    log_path: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.log_path.is_some() {
            config.log_path = self.log_path;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = cli.apply(ServerConfig::from_env());

    check_tcp_listen_available(&config.host, config.port)
        .with_context(|| format!("cannot listen on {}:{}", config.host, config.port))?;

    info!(
        host = %config.host,
        port = config.port,
        seed = ?config.seed,
        wire_log = ?config.log_path,
        "starting slide duel server"
    );

    run_server(config, None).await
}
