//! Response verification and decoding
//!
//! Every response goes through [`Response::verify_and_decode`]: all verifiers
//! run against the status line and headers, then the body is read and decoded
//! exactly once. Failures from both stages are reported together.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::warn;

use crate::context::Context;
use crate::error::{ClientError, Failure, FailureList, Result};

/// Status line and headers of a response
///
/// Stays readable after the body has been consumed.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseHead {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of a header, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Check applied to the head of a response
pub trait Verifier: Send + Sync {
    fn verify(&self, head: &ResponseHead) -> std::result::Result<(), Failure>;
}

impl<F> Verifier for F
where
    F: Fn(&ResponseHead) -> std::result::Result<(), Failure> + Send + Sync,
{
    fn verify(&self, head: &ResponseHead) -> std::result::Result<(), Failure> {
        self(head)
    }
}

/// Requires an exact status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusVerifier(pub StatusCode);

/// Verifier used when a caller passes none
pub const STATUS_OK: StatusVerifier = StatusVerifier(StatusCode::OK);

impl Verifier for StatusVerifier {
    fn verify(&self, head: &ResponseHead) -> std::result::Result<(), Failure> {
        if head.status != self.0 {
            return Err(Failure::UnexpectedStatus {
                expected: self.0.as_u16(),
                actual: head.status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Turns a response body into a value
pub trait Decoder {
    type Output;

    fn decode(&self, body: &[u8]) -> std::result::Result<Self::Output, Failure>;
}

/// Drains the body and ignores it, for calls where only the head matters
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpDecoder;

impl Decoder for NoOpDecoder {
    type Output = ();

    fn decode(&self, _body: &[u8]) -> std::result::Result<(), Failure> {
        Ok(())
    }
}

/// Parses the body as JSON into `T`
#[derive(Debug, Clone, Copy)]
pub struct JsonDecoder<T>(PhantomData<fn() -> T>);

impl<T> JsonDecoder<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Decoder for JsonDecoder<T> {
    type Output = T;

    fn decode(&self, body: &[u8]) -> std::result::Result<T, Failure> {
        serde_json::from_slice(body).map_err(|e| Failure::Decode(e.to_string()))
    }
}

/// A received response whose body can be consumed once
#[derive(Debug)]
pub struct Response {
    ctx: Context,
    head: ResponseHead,
    body: Option<reqwest::Response>,
}

impl Response {
    /// Wrap a raw response; `ctx` bounds the later body read
    pub fn new(ctx: Context, response: reqwest::Response) -> Self {
        let head = ResponseHead {
            status: response.status(),
            headers: response.headers().clone(),
        };
        Self {
            ctx,
            head,
            body: Some(response),
        }
    }

    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    pub fn is_consumed(&self) -> bool {
        self.body.is_none()
    }

    /// Verify the response and decode its body
    ///
    /// An empty `verifiers` slice means "status must be 200". All verifier and
    /// decoder failures end up in one [`ClientError::Response`]. The body is
    /// released whatever the outcome; a second call fails with
    /// [`ClientError::AlreadyConsumed`].
    ///
    /// If the context ends while the body is read, the context error is
    /// returned instead and failures collected so far are only logged.
    pub async fn verify_and_decode<D: Decoder>(
        &mut self,
        decoder: D,
        verifiers: &[&dyn Verifier],
    ) -> Result<D::Output> {
        let result = self.try_verify_and_decode(decoder, verifiers).await;
        if let Err(err) = &result {
            warn!(status = %self.head.status, error = %err, "response verification failed");
        }
        result
    }

    async fn try_verify_and_decode<D: Decoder>(
        &mut self,
        decoder: D,
        verifiers: &[&dyn Verifier],
    ) -> Result<D::Output> {
        let Some(body) = self.body.take() else {
            return Err(ClientError::AlreadyConsumed);
        };

        let mut failures = FailureList::new();
        let defaults: [&dyn Verifier; 1] = [&STATUS_OK];
        let verifiers = if verifiers.is_empty() {
            &defaults[..]
        } else {
            verifiers
        };
        for verifier in verifiers {
            if let Err(failure) = verifier.verify(&self.head) {
                failures.push(failure);
            }
        }

        let bytes = tokio::select! {
            biased;
            err = self.ctx.done() => {
                if !failures.is_empty() {
                    warn!(%failures, "context ended before the body was read");
                }
                return Err(err.into());
            }
            res = body.bytes() => res,
        };

        let output = match bytes {
            Ok(bytes) => match decoder.decode(&bytes) {
                Ok(output) => Some(output),
                Err(failure) => {
                    failures.push(failure);
                    None
                }
            },
            Err(e) => {
                failures.push(Failure::Body(e.to_string()));
                None
            }
        };

        match output {
            Some(output) if failures.is_empty() => Ok(output),
            _ => Err(ClientError::Response(failures)),
        }
    }
}
