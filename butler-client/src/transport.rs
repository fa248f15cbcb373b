//! HTTP transport
//!
//! [`Transport`] issues a single HTTP exchange and hands back a [`Response`]
//! that still has to be verified and decoded. [`HttpTransport`] is the
//! `reqwest` implementation with HTTP basic authentication.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};
use std::fmt;
use tracing::debug;

use crate::context::Context;
use crate::error::{ClientError, Result};
use crate::response::Response;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM_URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// Description of one outgoing request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    /// Defaults to `application/json` when unset
    pub content_type: Option<String>,
    pub body: Option<String>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            content_type: None,
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Use the url-encoded `pairs` as body
    pub fn form<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.content_type = Some(CONTENT_TYPE_FORM_URL_ENCODED.to_string());
        self.body = Some(body);
        self
    }

    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(CONTENT_TYPE_JSON)
    }
}

/// Issues one HTTP exchange
///
/// Implementations must give up on the exchange once `ctx` is cancelled or
/// its deadline passes, returning the matching context error.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(&self, ctx: &Context, request: Request) -> Result<Response>;
}

/// `reqwest` transport authenticating with a user name and API key
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    username: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), username, api_key)
    }

    /// Use a preconfigured client (proxies, TLS settings, ...)
    pub fn with_client(
        client: Client,
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            username: username.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, ctx: &Context, request: Request) -> Result<Response> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        let url = Url::parse(&request.url)
            .map_err(|e| ClientError::InvalidRequest(format!("{}: {}", request.url, e)))?;

        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .basic_auth(&self.username, Some(&self.api_key))
            .header(CONTENT_TYPE, request.content_type());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = tokio::select! {
            biased;
            err = ctx.done() => return Err(err.into()),
            res = builder.send() => res.map_err(ClientError::Transport)?,
        };

        debug!(status = %response.status(), "received response");
        Ok(Response::new(ctx.clone(), response))
    }
}
