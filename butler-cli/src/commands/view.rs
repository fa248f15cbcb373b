//! View command handlers

use anyhow::{Context as _, Result};
use butler_client::{Context, ViewApi};
use clap::Subcommand;
use colored::*;

use crate::config::Config;

/// View subcommands
#[derive(Subcommand)]
pub enum ViewCommands {
    /// List the jobs of a view
    Jobs {
        /// View name
        view: String,
    },
}

pub async fn handle_view_command(command: ViewCommands, config: &Config, ctx: &Context) -> Result<()> {
    match command {
        ViewCommands::Jobs { view } => {
            let names = config
                .client()
                .list_job_names(ctx, &view)
                .await
                .with_context(|| format!("Failed to read view '{}'", view))?;

            if names.is_empty() {
                println!("{}", format!("View '{}' has no jobs.", view).yellow());
            } else {
                println!("{}", format!("Jobs in '{}':", view).bold());
                for name in names {
                    println!("  {} {}", "▸".cyan(), name);
                }
            }
            Ok(())
        }
    }
}
