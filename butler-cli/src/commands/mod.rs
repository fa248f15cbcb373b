//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod build;
mod job;
mod queue;
mod view;

pub use job::JobCommands;
pub use queue::QueueCommands;
pub use view::ViewCommands;

use anyhow::Result;
use butler_client::{BuildInfo, Context};
use clap::Subcommand;
use colored::*;

use crate::config::Config;
use crate::types::parse_param;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Schedule a build of a job
    Build {
        /// Job name
        job: String,

        /// Build parameter, repeatable
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Wait until the build has started and finished
        #[arg(short, long)]
        wait: bool,
    },
    /// Build queue inspection
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },
    /// Builds of a job
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// View inspection
    View {
        #[command(subcommand)]
        command: ViewCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
/// * `ctx` - Context cancelled on Ctrl-C
pub async fn handle_command(command: Commands, config: &Config, ctx: &Context) -> Result<()> {
    match command {
        Commands::Build { job, params, wait } => {
            build::handle_build_command(&job, &params, wait, config, ctx).await
        }
        Commands::Queue { command } => queue::handle_queue_command(command, config, ctx).await,
        Commands::Job { command } => job::handle_job_command(command, config, ctx).await,
        Commands::View { command } => view::handle_view_command(command, config, ctx).await,
    }
}

/// Print a one-build summary
pub(crate) fn print_build_summary(build: &BuildInfo) {
    println!(
        "  {} Build {}  {}",
        "▸".cyan(),
        build.number.to_string().bold(),
        colorize_result(build)
    );
    if build.queue_id != 0 {
        println!("    Queue id: {}", build.queue_id.to_string().dimmed());
    }
    println!("    URL:      {}", build.url.dimmed());
    println!();
}

/// Colorize the state of a build
pub(crate) fn colorize_result(build: &BuildInfo) -> ColoredString {
    if build.building {
        return "BUILDING".cyan();
    }
    match build.result.as_deref() {
        Some("SUCCESS") => "SUCCESS".green(),
        Some("UNSTABLE") => "UNSTABLE".yellow(),
        Some(result @ ("ABORTED" | "NOT_BUILT")) => result.dimmed(),
        Some(other) => other.red(),
        None => "UNKNOWN".dimmed(),
    }
}

/// Fail the command when a finished build did not succeed
pub(crate) fn ensure_succeeded(build: &BuildInfo) -> Result<()> {
    if build.succeeded() {
        Ok(())
    } else {
        anyhow::bail!(
            "build {} finished with result {}",
            build.number,
            build.result.as_deref().unwrap_or("UNKNOWN")
        )
    }
}
