//! Butler CLI
//!
//! Command-line interface for scheduling and following builds on a
//! Jenkins-style build server.

mod commands;
mod config;
mod types;

use anyhow::Result;
use butler_client::Context;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "butler")]
#[command(about = "Build server CLI", long_about = None)]
struct Cli {
    /// Build server URL
    #[arg(long, env = "BUTLER_URL", default_value = "http://localhost:8080")]
    server_url: String,

    /// User to authenticate as
    #[arg(long, env = "BUTLER_USER", default_value = "")]
    username: String,

    /// API token of the user
    #[arg(long, env = "BUTLER_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Milliseconds between two polls while waiting
    #[arg(long, env = "BUTLER_RETRY_INTERVAL_MS", default_value_t = 1000)]
    retry_interval_ms: u64,

    /// Seconds to wait for a build to leave the queue (library default if unset)
    #[arg(long, env = "BUTLER_QUEUE_TIMEOUT")]
    queue_timeout: Option<u64>,

    /// Seconds to wait for a build to finish (library default if unset)
    #[arg(long, env = "BUTLER_BUILD_TIMEOUT")]
    build_timeout: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            server_url: self.server_url.clone(),
            username: self.username.clone(),
            api_key: self.api_key.clone(),
            retry_interval: Duration::from_millis(self.retry_interval_ms),
            queue_timeout: self.queue_timeout.map(Duration::from_secs),
            build_timeout: self.build_timeout.map(Duration::from_secs),
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "butler=info,butler_client=info",
        1 => "butler=debug,butler_client=debug",
        _ => "butler=trace,butler_client=trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config();
    config.validate()?;
    debug!(server_url = %config.server_url, "loaded configuration");

    // Ctrl-C cancels whatever wait is in progress
    let (ctx, cancel) = Context::with_cancel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            cancel.cancel();
        }
    });

    handle_command(cli.command, &config, &ctx).await
}
