//! Job command handlers
//!
//! Handles listing the builds of a job and following a single build.

use anyhow::{Context as _, Result, bail};
use butler_client::{Context, JobApi};
use clap::Subcommand;
use colored::*;

use super::{ensure_succeeded, print_build_summary};
use crate::config::Config;
use crate::types::build_item_from_url;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// List builds of a job, newest first
    Builds {
        /// Job name
        job: String,

        /// Index of the first build (inclusive)
        #[arg(long, default_value_t = 0)]
        from: u32,

        /// Index of the last build (exclusive)
        #[arg(long, default_value_t = 10)]
        to: u32,
    },
    /// Wait until a build finishes
    Wait {
        /// Build URL, e.g. http://host/job/app/42/
        url: String,
    },
}

/// Handle job commands
///
/// # Arguments
/// * `command` - The job command to execute
/// * `config` - The CLI configuration
/// * `ctx` - Context cancelled on Ctrl-C
pub async fn handle_job_command(command: JobCommands, config: &Config, ctx: &Context) -> Result<()> {
    match command {
        JobCommands::Builds { job, from, to } => list_builds(config, ctx, &job, from, to).await,
        JobCommands::Wait { url } => wait_for_build(config, ctx, &url).await,
    }
}

async fn list_builds(config: &Config, ctx: &Context, job: &str, from: u32, to: u32) -> Result<()> {
    if from > to {
        bail!("--from ({}) must not be greater than --to ({})", from, to);
    }

    let builds = config
        .client()
        .get_builds(ctx, job, from, to)
        .await
        .with_context(|| format!("Failed to list builds of '{}'", job))?;

    if builds.is_empty() {
        println!("{}", format!("No builds found for '{}'.", job).yellow());
    } else {
        println!("{}", format!("Found {} build(s):", builds.len()).bold());
        println!();
        for build in &builds {
            print_build_summary(build);
        }
    }

    Ok(())
}

async fn wait_for_build(config: &Config, ctx: &Context, url: &str) -> Result<()> {
    let item = build_item_from_url(url);
    println!(
        "{}",
        format!("Waiting for build {} to finish...", item.url).dimmed()
    );

    let build = config
        .client()
        .wait_until_build_is_complete(&config.build_context(ctx), &item, config.retry_interval)
        .await
        .with_context(|| format!("Build {} did not complete", url))?;

    println!();
    print_build_summary(&build);
    ensure_succeeded(&build)
}
