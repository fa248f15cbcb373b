//! Build command handler
//!
//! Schedules a build and, on request, follows it through the queue until it
//! finishes.

use anyhow::{Context as _, Result};
use butler_client::{Context, JobApi, QueueApi};
use colored::*;
use tracing::info;

use super::{ensure_succeeded, print_build_summary};
use crate::config::Config;

/// Schedule a build of `job`
///
/// With `wait`, blocks until the build left the queue and completed, and
/// fails when the build did not succeed.
pub async fn handle_build_command(
    job: &str,
    params: &[(String, String)],
    wait: bool,
    config: &Config,
    ctx: &Context,
) -> Result<()> {
    let client = config.client();

    let queue_id = client
        .schedule_build(ctx, job, params)
        .await
        .with_context(|| format!("Failed to schedule a build of '{}'", job))?;

    println!("{}", "✓ Build scheduled!".green().bold());
    println!("  Job:      {}", job.bold());
    println!("  Queue id: {}", queue_id.to_string().cyan());

    if !wait {
        println!();
        println!(
            "Follow it with: {}",
            format!("butler queue wait {}", queue_id).dimmed()
        );
        return Ok(());
    }

    println!();
    println!("{}", "Waiting for the build to start...".dimmed());
    let item = client
        .wait_until_build_is_queued(&config.queue_context(ctx), queue_id, config.retry_interval)
        .await
        .with_context(|| format!("Build of '{}' did not leave the queue", job))?;
    info!(build = %item.number, "build started");
    println!("  Started build {} at {}", item.number.to_string().bold(), item.url.dimmed());

    println!("{}", "Waiting for the build to finish...".dimmed());
    let build = client
        .wait_until_build_is_complete(&config.build_context(ctx), &item, config.retry_interval)
        .await
        .with_context(|| format!("Build {} of '{}' did not complete", item.number, job))?;

    println!();
    print_build_summary(&build);
    ensure_succeeded(&build)
}
