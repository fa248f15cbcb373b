//! Queue command handlers

use anyhow::{Context as _, Result};
use butler_client::{Context, QueueApi, QueueId};
use clap::Subcommand;
use colored::*;

use crate::config::Config;

/// Queue subcommands
#[derive(Subcommand)]
pub enum QueueCommands {
    /// Show how many items are queued and for which jobs
    Stats,
    /// Wait until a queue item starts its build
    Wait {
        /// Queue item id, as printed by `butler build`
        id: u32,
    },
}

/// Handle queue commands
///
/// # Arguments
/// * `command` - The queue command to execute
/// * `config` - The CLI configuration
/// * `ctx` - Context cancelled on Ctrl-C
pub async fn handle_queue_command(
    command: QueueCommands,
    config: &Config,
    ctx: &Context,
) -> Result<()> {
    match command {
        QueueCommands::Stats => queue_stats(config, ctx).await,
        QueueCommands::Wait { id } => wait_for_queue_item(config, ctx, QueueId(id)).await,
    }
}

async fn queue_stats(config: &Config, ctx: &Context) -> Result<()> {
    let stats = config
        .client()
        .queue_stats(ctx)
        .await
        .context("Failed to read the build queue")?;

    if stats.length == 0 {
        println!("{}", "The queue is empty.".yellow());
        return Ok(());
    }

    println!("{}", format!("{} item(s) queued:", stats.length).bold());
    println!();
    for name in &stats.task_names {
        println!("  {} {}", "▸".cyan(), name);
    }

    Ok(())
}

async fn wait_for_queue_item(config: &Config, ctx: &Context, id: QueueId) -> Result<()> {
    println!(
        "{}",
        format!("Waiting for queue item {} to start...", id).dimmed()
    );

    let item = config
        .client()
        .wait_until_build_is_queued(&config.queue_context(ctx), id, config.retry_interval)
        .await
        .with_context(|| format!("Queue item {} did not start a build", id))?;

    println!("{}", "✓ Build started!".green().bold());
    println!("  Build: {}", item.number.to_string().bold());
    println!("  URL:   {}", item.url.cyan());
    println!();
    println!(
        "Follow it with: {}",
        format!("butler job wait {}", item.url).dimmed()
    );

    Ok(())
}
