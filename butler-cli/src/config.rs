//! Configuration module
//!
//! Handles CLI configuration: server connection, credentials and the
//! intervals and timeouts used while waiting on the server.

use anyhow::{Result, bail};
use butler_client::{Client, Context};
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the build server
    pub server_url: String,

    pub username: String,

    pub api_key: String,

    /// Pause between two polls
    pub retry_interval: Duration,

    /// Upper bound for waiting on a queued build; `None` keeps the client default
    pub queue_timeout: Option<Duration>,

    /// Upper bound for waiting on a running build; `None` keeps the client default
    pub build_timeout: Option<Duration>,
}

impl Config {
    /// Checks the configuration before anything is sent
    pub fn validate(&self) -> Result<()> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            bail!(
                "server URL must start with http:// or https://, got '{}'",
                self.server_url
            );
        }
        if self.username.is_empty() != self.api_key.is_empty() {
            bail!("username and API key must be given together");
        }
        if self.retry_interval.is_zero() {
            bail!("retry interval must be greater than zero");
        }
        if self.queue_timeout.is_some_and(|t| t.is_zero()) {
            bail!("queue timeout must be greater than zero");
        }
        if self.build_timeout.is_some_and(|t| t.is_zero()) {
            bail!("build timeout must be greater than zero");
        }
        Ok(())
    }

    pub fn client(&self) -> Client {
        Client::new(&self.server_url, &self.username, &self.api_key)
    }

    /// Context bounding a wait for a queued build
    pub fn queue_context(&self, parent: &Context) -> Context {
        bounded(parent, self.queue_timeout)
    }

    /// Context bounding a wait for a running build
    pub fn build_context(&self, parent: &Context) -> Context {
        bounded(parent, self.build_timeout)
    }
}

fn bounded(parent: &Context, timeout: Option<Duration>) -> Context {
    match timeout {
        Some(timeout) => parent.child_with_timeout(timeout),
        None => parent.clone(),
    }
}
