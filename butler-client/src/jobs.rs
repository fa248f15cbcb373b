//! Job-related API endpoints

use async_trait::async_trait;
use butler_core::domain::job::BuildInfo;
use butler_core::domain::queue::{QueueId, QueueItem};
use butler_core::dto::job::{BuildsResponse, build_info_tree, builds_tree};
use regex::Regex;
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info};

use crate::context::Context;
use crate::endpoint::UrlBuilder;
use crate::error::{ClientError, Result};
use crate::response::{JsonDecoder, NoOpDecoder, StatusVerifier};
use crate::retry::{Attempt, retry_until_done};
use crate::transport::{Request, Transport};

/// How long [`JobApi::wait_until_build_is_complete`] polls when the caller's
/// context carries no deadline
pub const DEFAULT_WAIT_FOR_BUILD_TO_BE_COMPLETED_TIMEOUT: Duration = Duration::from_secs(25 * 60);

static QUEUE_ID_FROM_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*/item/(\d+)").expect("valid queue id pattern"));

/// Operations on jobs and their builds
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Schedule a build of `job_name` with the given parameters
    ///
    /// # Returns
    /// The id of the queue item the server created for the build
    async fn schedule_build(
        &self,
        ctx: &Context,
        job_name: &str,
        params: &[(String, String)],
    ) -> Result<QueueId>;

    /// Builds `m` (inclusive) to `n` (exclusive) of `job_name`, newest first
    async fn get_builds(&self, ctx: &Context, job_name: &str, m: u32, n: u32)
    -> Result<Vec<BuildInfo>>;

    /// Current state of the build behind `item`
    async fn build_info(&self, ctx: &Context, item: &QueueItem) -> Result<BuildInfo>;

    /// Poll the build behind `item` until it stops running
    ///
    /// The deadline of `ctx` bounds the wait; without one,
    /// [`DEFAULT_WAIT_FOR_BUILD_TO_BE_COMPLETED_TIMEOUT`] applies. Between
    /// polls the client waits `retry_after`.
    async fn wait_until_build_is_complete(
        &self,
        ctx: &Context,
        item: &QueueItem,
        retry_after: Duration,
    ) -> Result<BuildInfo>;
}

/// [`JobApi`] over a [`Transport`]
#[derive(Debug, Clone)]
pub struct JobClient {
    urls: UrlBuilder,
    transport: Arc<dyn Transport>,
}

impl JobClient {
    pub fn new(urls: UrlBuilder, transport: Arc<dyn Transport>) -> Self {
        Self { urls, transport }
    }
}

#[async_trait]
impl JobApi for JobClient {
    // =============================================================================
    // Scheduling
    // =============================================================================

    async fn schedule_build(
        &self,
        ctx: &Context,
        job_name: &str,
        params: &[(String, String)],
    ) -> Result<QueueId> {
        let url = self
            .urls
            .json_endpoint(&["job", job_name, "buildWithParameters"]);
        let request = Request::post(url).form(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let mut response = self.transport.send(ctx, request).await?;
        response
            .verify_and_decode(NoOpDecoder, &[&StatusVerifier(StatusCode::CREATED)])
            .await?;

        let location = response.head().header(LOCATION.as_str()).ok_or_else(|| {
            ClientError::Parse("failed to parse queue id: response has no Location header".into())
        })?;
        let queue_id = queue_id_from_location(location)?;

        debug!(job = job_name, queue_id = %queue_id, "build scheduled");
        Ok(queue_id)
    }

    // =============================================================================
    // Build Queries
    // =============================================================================

    async fn get_builds(
        &self,
        ctx: &Context,
        job_name: &str,
        m: u32,
        n: u32,
    ) -> Result<Vec<BuildInfo>> {
        let request =
            Request::get(self.urls.json_endpoint(&["job", job_name])).query("tree", builds_tree(m, n));

        let mut response = self.transport.send(ctx, request).await?;
        let builds: BuildsResponse = response.verify_and_decode(JsonDecoder::new(), &[]).await?;

        Ok(builds.builds)
    }

    async fn build_info(&self, ctx: &Context, item: &QueueItem) -> Result<BuildInfo> {
        let request =
            Request::get(UrlBuilder::json_endpoint_of(&item.url)).query("tree", build_info_tree());

        let mut response = self.transport.send(ctx, request).await?;
        response.verify_and_decode(JsonDecoder::new(), &[]).await
    }

    // =============================================================================
    // Waiting
    // =============================================================================

    async fn wait_until_build_is_complete(
        &self,
        ctx: &Context,
        item: &QueueItem,
        retry_after: Duration,
    ) -> Result<BuildInfo> {
        let ctx = &ctx.or_timeout(DEFAULT_WAIT_FOR_BUILD_TO_BE_COMPLETED_TIMEOUT);
        debug!(build = %item.number, url = %item.url, "waiting for build to complete");

        let info = retry_until_done(ctx, retry_after, move || async move {
            let info = self.build_info(ctx, item).await?;
            Ok(if info.building {
                Attempt::Pending
            } else {
                Attempt::Done(info)
            })
        })
        .await?;

        info!(build = %info.number, result = ?info.result, "build completed");
        Ok(info)
    }
}

/// Extract the queue id from a `.../queue/item/<id>/` location
fn queue_id_from_location(location: &str) -> Result<QueueId> {
    let id = QUEUE_ID_FROM_LOCATION
        .captures(location)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| ClientError::Parse(format!("failed to parse queue id from '{}'", location)))?;

    id.as_str()
        .parse::<u32>()
        .map(QueueId)
        .map_err(|e| ClientError::Parse(format!("invalid queue id in '{}': {}", location, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_transport, test_urls};
    use butler_core::domain::job::BuildNumber;
    use mockito::Matcher;

    const BUILD_IN_PROGRESS: &str = r#"{
        "building": true,
        "number": 2,
        "queueId": 3,
        "result": null,
        "url": "http://testurl.com/jenkins/job/Test/2"
    }"#;

    const BUILD_COMPLETE: &str = r#"{
        "building": false,
        "number": 2,
        "queueId": 3,
        "result": "SUCCESS",
        "url": "http://testurl.com/jenkins/job/Test/2"
    }"#;

    const GET_BUILDS: &str = r#"{
        "builds": [
            {"number": 2, "queueId": 3, "result": "SUCCESS", "url": "http://testurl.com/jenkins/job/Test/2"},
            {"number": 3, "queueId": 4, "result": "FAILURE", "url": "http://testurl.com/jenkins/job/Test/3"},
            {"number": 4, "queueId": 5, "result": "SUCCESS", "url": "http://testurl.com/jenkins/job/Test/4"}
        ]
    }"#;

    fn job_client(server: &mockito::ServerGuard) -> JobClient {
        JobClient::new(test_urls(server), test_transport())
    }

    fn completed_build() -> BuildInfo {
        BuildInfo {
            number: BuildNumber(2),
            queue_id: 3,
            url: "http://testurl.com/jenkins/job/Test/2".to_string(),
            result: Some("SUCCESS".to_string()),
            building: false,
        }
    }

    fn build_item(server: &mockito::ServerGuard) -> QueueItem {
        QueueItem::new(BuildNumber(1), format!("{}/job/Test/1", server.url()))
    }

    fn build_info_query() -> Matcher {
        Matcher::UrlEncoded("tree".into(), "number,queueId,url,result,building".into())
    }

    #[test]
    fn test_queue_id_from_location() {
        assert_eq!(
            queue_id_from_location("http://testurl.com/queue/item/3").unwrap(),
            QueueId(3)
        );
        assert_eq!(
            queue_id_from_location("http://testurl.com/queue/item/17/").unwrap(),
            QueueId(17)
        );
        assert!(matches!(
            queue_id_from_location("http://testurl.com/job/Test/"),
            Err(ClientError::Parse(_))
        ));
        assert!(matches!(
            queue_id_from_location("http://testurl.com/queue/item/99999999999"),
            Err(ClientError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_schedule_build() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/job/Test/buildWithParameters/api/json")
            .match_body("branch=main")
            .with_status(201)
            .with_header("Location", "http://testurl.com/queue/item/3")
            .create_async()
            .await;

        let params = vec![("branch".to_string(), "main".to_string())];
        let queue_id = job_client(&server)
            .schedule_build(&Context::background(), "Test", &params)
            .await
            .unwrap();

        assert_eq!(queue_id, QueueId(3));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_schedule_build_without_location_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/job/Test/buildWithParameters/api/json")
            .with_status(201)
            .create_async()
            .await;

        let err = job_client(&server)
            .schedule_build(&Context::background(), "Test", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Parse(_)));
        assert!(!err.is_transport());
        assert!(!err.is_verification());
    }

    #[tokio::test]
    async fn test_schedule_build_surfaces_unexpected_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/job/Test/buildWithParameters/api/json")
            .with_status(200)
            .with_header("Location", "http://testurl.com/queue/item/3")
            .create_async()
            .await;

        let err = job_client(&server)
            .schedule_build(&Context::background(), "Test", &[])
            .await
            .unwrap_err();

        assert!(err.is_verification());
        assert_eq!(err.status(), Some(200));
    }

    #[tokio::test]
    async fn test_get_builds() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/job/Test/api/json")
            .match_query(Matcher::UrlEncoded(
                "tree".into(),
                "builds[number,queueId,url,result]{0,5}".into(),
            ))
            .with_body(GET_BUILDS)
            .create_async()
            .await;

        let builds = job_client(&server)
            .get_builds(&Context::background(), "Test", 0, 5)
            .await
            .unwrap();

        assert_eq!(builds.len(), 3);
        assert_eq!(builds[1].number, BuildNumber(3));
        assert_eq!(builds[1].result.as_deref(), Some("FAILURE"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_wait_returns_once_build_is_complete() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/job/Test/1/api/json")
            .match_query(build_info_query())
            .with_body(BUILD_COMPLETE)
            .expect(1)
            .create_async()
            .await;

        let ctx = Context::with_timeout(Duration::from_secs(1));
        let info = job_client(&server)
            .wait_until_build_is_complete(&ctx, &build_item(&server), Duration::from_millis(1))
            .await
            .unwrap();

        assert_eq!(info, completed_build());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_wait_retries_until_build_completes() {
        let mut server = mockito::Server::new_async().await;
        let in_progress = server
            .mock("GET", "/job/Test/1/api/json")
            .match_query(build_info_query())
            .with_body(BUILD_IN_PROGRESS)
            .expect(1)
            .create_async()
            .await;
        let complete = server
            .mock("GET", "/job/Test/1/api/json")
            .match_query(build_info_query())
            .with_body(BUILD_COMPLETE)
            .expect(1)
            .create_async()
            .await;

        let ctx = Context::with_timeout(Duration::from_secs(1));
        let info = job_client(&server)
            .wait_until_build_is_complete(&ctx, &build_item(&server), Duration::from_millis(1))
            .await
            .unwrap();

        assert_eq!(info, completed_build());
        in_progress.assert_async().await;
        complete.assert_async().await;
    }

    #[tokio::test]
    async fn test_wait_stops_polling_on_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/job/Test/1/api/json")
            .match_query(build_info_query())
            .with_body("")
            .expect(1)
            .create_async()
            .await;

        let ctx = Context::with_timeout(Duration::from_secs(1));
        let err = job_client(&server)
            .wait_until_build_is_complete(&ctx, &build_item(&server), Duration::from_millis(1))
            .await
            .unwrap_err();

        assert!(err.is_decode());
        assert!(err.to_string().contains("EOF"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_wait_times_out_while_building() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/Test/1/api/json")
            .match_query(build_info_query())
            .with_body(BUILD_IN_PROGRESS)
            .create_async()
            .await;

        let ctx = Context::with_timeout(Duration::from_millis(5));
        let err = job_client(&server)
            .wait_until_build_is_complete(&ctx, &build_item(&server), Duration::from_millis(2))
            .await
            .unwrap_err();

        assert!(err.is_deadline_exceeded(), "unexpected error: {err}");
    }
}
