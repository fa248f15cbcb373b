//! Butler HTTP Client
//!
//! A type-safe client for the REST API of a Jenkins-style build server.
//!
//! Besides plain queries, the client can wait for asynchronous transitions on
//! the server: a scheduled build leaving the queue, and a running build
//! finishing. Every call takes a [`Context`] carrying a deadline and a
//! cancellation signal; waits poll the server until the transition happens,
//! an error occurs, or the context ends.
//!
//! # Example
//!
//! ```no_run
//! use butler_client::{Client, Context, JobApi, QueueApi};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Client::new("http://localhost:8080", "admin", "api-token");
//!     let ctx = Context::with_timeout(Duration::from_secs(600));
//!
//!     let params = vec![("branch".to_string(), "main".to_string())];
//!     let queue_id = client.schedule_build(&ctx, "my-job", &params).await?;
//!     let item = client
//!         .wait_until_build_is_queued(&ctx, queue_id, Duration::from_secs(1))
//!         .await?;
//!     let build = client
//!         .wait_until_build_is_complete(&ctx, &item, Duration::from_secs(5))
//!         .await?;
//!
//!     println!("Build {} finished: {:?}", build.number, build.result);
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod endpoint;
pub mod error;
pub mod jobs;
pub mod queue;
pub mod response;
pub mod retry;
pub mod transport;
pub mod views;

// Re-export commonly used types
pub use butler_core::domain::job::{BuildInfo, BuildNumber};
pub use butler_core::domain::queue::{QueueId, QueueItem, QueueStats};
pub use context::{CancelHandle, Context, ContextError};
pub use endpoint::UrlBuilder;
pub use error::{ClientError, Failure, FailureList, Result};
pub use jobs::{DEFAULT_WAIT_FOR_BUILD_TO_BE_COMPLETED_TIMEOUT, JobApi, JobClient};
pub use queue::{DEFAULT_WAIT_FOR_BUILD_TO_BE_QUEUED_TIMEOUT, QueueApi, QueueClient};
pub use retry::{Attempt, retry_until_done};
pub use transport::{HttpTransport, Request, Transport};
pub use views::{ViewApi, ViewClient};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Everything the build server offers: jobs, queue and views
///
/// Implemented by any type providing the three capabilities.
pub trait BuildServerApi: JobApi + QueueApi + ViewApi {}

impl<T: JobApi + QueueApi + ViewApi> BuildServerApi for T {}

/// HTTP client for the build server API
///
/// Aggregates one client per capability, all sharing the same transport:
/// - Jobs: schedule builds, list builds, wait for completion
/// - Queue: queue statistics, wait for a build to start
/// - Views: list the jobs of a view
#[derive(Debug, Clone)]
pub struct Client {
    urls: UrlBuilder,
    jobs: JobClient,
    queue: QueueClient,
    views: ViewClient,
}

impl Client {
    /// Create a new client authenticating with basic auth
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the server (e.g., "http://localhost:8080/jenkins")
    /// * `username` - The user to authenticate as
    /// * `api_key` - The user's API token
    ///
    /// # Example
    /// ```
    /// use butler_client::Client;
    ///
    /// let client = Client::new("http://localhost:8080/", "admin", "token");
    /// assert_eq!(client.base_url(), "http://localhost:8080");
    /// ```
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self::with_transport(base_url, Arc::new(HttpTransport::new(username, api_key)))
    }

    /// Create a new client on top of a custom transport
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc. via
    /// [`HttpTransport::with_client`], or to plug in another transport.
    pub fn with_transport(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let urls = UrlBuilder::new(base_url);
        Self {
            jobs: JobClient::new(urls.clone(), Arc::clone(&transport)),
            queue: QueueClient::new(urls.clone(), Arc::clone(&transport)),
            views: ViewClient::new(urls.clone(), transport),
            urls,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        self.urls.base_url()
    }

    pub fn jobs(&self) -> &JobClient {
        &self.jobs
    }

    pub fn queue(&self) -> &QueueClient {
        &self.queue
    }

    pub fn views(&self) -> &ViewClient {
        &self.views
    }
}

#[async_trait]
impl JobApi for Client {
    async fn schedule_build(
        &self,
        ctx: &Context,
        job_name: &str,
        params: &[(String, String)],
    ) -> Result<QueueId> {
        self.jobs.schedule_build(ctx, job_name, params).await
    }

    async fn get_builds(
        &self,
        ctx: &Context,
        job_name: &str,
        m: u32,
        n: u32,
    ) -> Result<Vec<BuildInfo>> {
        self.jobs.get_builds(ctx, job_name, m, n).await
    }

    async fn build_info(&self, ctx: &Context, item: &QueueItem) -> Result<BuildInfo> {
        self.jobs.build_info(ctx, item).await
    }

    async fn wait_until_build_is_complete(
        &self,
        ctx: &Context,
        item: &QueueItem,
        retry_after: Duration,
    ) -> Result<BuildInfo> {
        self.jobs
            .wait_until_build_is_complete(ctx, item, retry_after)
            .await
    }
}

#[async_trait]
impl QueueApi for Client {
    async fn queue_stats(&self, ctx: &Context) -> Result<QueueStats> {
        self.queue.queue_stats(ctx).await
    }

    async fn wait_until_build_is_queued(
        &self,
        ctx: &Context,
        id: QueueId,
        retry_after: Duration,
    ) -> Result<QueueItem> {
        self.queue
            .wait_until_build_is_queued(ctx, id, retry_after)
            .await
    }
}

#[async_trait]
impl ViewApi for Client {
    async fn list_job_names(&self, ctx: &Context, view_name: &str) -> Result<Vec<String>> {
        self.views.list_job_names(ctx, view_name).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn assert_build_server_api<T: BuildServerApi>(_: &T) {}

    #[test]
    fn test_client_creation() {
        let client = Client::new("http://localhost:8080", "user", "key");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_build_server_api(&client);
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = Client::new("http://localhost:8080/", "user", "key");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_with_custom_transport() {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::with_client(
            reqwest::Client::new(),
            "user",
            "key",
        ));
        let client = Client::with_transport("http://localhost:8080", transport);
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_schedule_and_follow_build_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        let build_url = format!("{}/job/Test/2/", server.url());

        server
            .mock("POST", "/job/Test/buildWithParameters/api/json")
            .match_header("authorization", "Basic dXNlcjprZXk=")
            .with_status(201)
            .with_header("Location", &format!("{}/queue/item/7/", server.url()))
            .create_async()
            .await;
        server
            .mock("GET", "/queue/item/7/api/json")
            .with_body(format!(
                r#"{{"executable": {{"number": 2, "url": "{}"}}}}"#,
                build_url
            ))
            .create_async()
            .await;
        server
            .mock("GET", "/job/Test/2/api/json")
            .match_query(mockito::Matcher::Any)
            .with_body(format!(
                r#"{{"building": false, "number": 2, "queueId": 7, "result": "FAILURE", "url": "{}"}}"#,
                build_url
            ))
            .create_async()
            .await;

        let client = Client::new(server.url(), "user", "key");
        let ctx = Context::with_timeout(Duration::from_secs(5));

        let queue_id = client.schedule_build(&ctx, "Test", &[]).await.unwrap();
        assert_eq!(queue_id, QueueId(7));

        let item = client
            .wait_until_build_is_queued(&ctx, queue_id, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(item, QueueItem::new(BuildNumber(2), build_url.clone()));

        let build = client
            .wait_until_build_is_complete(&ctx, &item, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(build.queue_id, 7);
        assert_eq!(build.result.as_deref(), Some("FAILURE"));
        assert!(!build.succeeded());
    }
}
