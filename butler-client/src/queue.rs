//! Queue-related API endpoints

use async_trait::async_trait;
use butler_core::domain::queue::{QueueId, QueueItem, QueueStats};
use butler_core::dto::queue::{QueueItemResponse, QueueResponse};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::context::Context;
use crate::endpoint::UrlBuilder;
use crate::error::Result;
use crate::response::JsonDecoder;
use crate::retry::{Attempt, retry_until_done};
use crate::transport::{Request, Transport};

/// How long [`QueueApi::wait_until_build_is_queued`] polls when the caller's
/// context carries no deadline
pub const DEFAULT_WAIT_FOR_BUILD_TO_BE_QUEUED_TIMEOUT: Duration = Duration::from_secs(60);

/// Operations on the build queue
#[async_trait]
pub trait QueueApi: Send + Sync {
    /// Number of queued items and the jobs they belong to
    async fn queue_stats(&self, ctx: &Context) -> Result<QueueStats>;

    /// Poll the queue item `id` until the server starts a build for it
    ///
    /// The deadline of `ctx` bounds the wait; without one,
    /// [`DEFAULT_WAIT_FOR_BUILD_TO_BE_QUEUED_TIMEOUT`] applies. Between polls
    /// the client waits `retry_after`.
    ///
    /// # Returns
    /// Number and URL of the started build
    async fn wait_until_build_is_queued(
        &self,
        ctx: &Context,
        id: QueueId,
        retry_after: Duration,
    ) -> Result<QueueItem>;
}

/// [`QueueApi`] over a [`Transport`]
#[derive(Debug, Clone)]
pub struct QueueClient {
    urls: UrlBuilder,
    transport: Arc<dyn Transport>,
}

impl QueueClient {
    pub fn new(urls: UrlBuilder, transport: Arc<dyn Transport>) -> Self {
        Self { urls, transport }
    }
}

#[async_trait]
impl QueueApi for QueueClient {
    async fn queue_stats(&self, ctx: &Context) -> Result<QueueStats> {
        let request = Request::get(self.urls.json_endpoint(&["queue"]));

        let mut response = self.transport.send(ctx, request).await?;
        let queue: QueueResponse = response.verify_and_decode(JsonDecoder::new(), &[]).await?;

        Ok(queue.into())
    }

    async fn wait_until_build_is_queued(
        &self,
        ctx: &Context,
        id: QueueId,
        retry_after: Duration,
    ) -> Result<QueueItem> {
        let ctx = &ctx.or_timeout(DEFAULT_WAIT_FOR_BUILD_TO_BE_QUEUED_TIMEOUT);
        let url = &self.urls.json_endpoint(&["queue", "item", &id.to_string()]);
        let transport = self.transport.as_ref();
        debug!(queue_id = %id, "waiting for queue item to start a build");

        let item = retry_until_done(ctx, retry_after, move || async move {
            let mut response = transport.send(ctx, Request::get(url.as_str())).await?;
            let queued: QueueItemResponse =
                response.verify_and_decode(JsonDecoder::new(), &[]).await?;

            Ok(match queued.assigned_build() {
                Some(item) => Attempt::Done(item),
                None => Attempt::Pending,
            })
        })
        .await?;

        info!(queue_id = %id, build = %item.number, "queue item left the queue");
        Ok(item)
    }
}
