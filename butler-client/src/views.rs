//! View-related API endpoints

use async_trait::async_trait;
use butler_core::dto::view::ViewResponse;
use std::sync::Arc;

use crate::context::Context;
use crate::endpoint::UrlBuilder;
use crate::error::Result;
use crate::response::JsonDecoder;
use crate::transport::{Request, Transport};

/// Operations on views
#[async_trait]
pub trait ViewApi: Send + Sync {
    /// Names of the jobs listed by `view_name`
    async fn list_job_names(&self, ctx: &Context, view_name: &str) -> Result<Vec<String>>;
}

/// [`ViewApi`] over a [`Transport`]
#[derive(Debug, Clone)]
pub struct ViewClient {
    urls: UrlBuilder,
    transport: Arc<dyn Transport>,
}

impl ViewClient {
    pub fn new(urls: UrlBuilder, transport: Arc<dyn Transport>) -> Self {
        Self { urls, transport }
    }
}

#[async_trait]
impl ViewApi for ViewClient {
    async fn list_job_names(&self, ctx: &Context, view_name: &str) -> Result<Vec<String>> {
        let request = Request::get(self.urls.json_endpoint(&["view", view_name]));

        let mut response = self.transport.send(ctx, request).await?;
        let view: ViewResponse = response.verify_and_decode(JsonDecoder::new(), &[]).await?;

        Ok(view.job_names())
    }
}
