//! Error types for the Butler client

use std::fmt;
use thiserror::Error;

use crate::context::ContextError;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Butler client
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP exchange itself failed (network, DNS, TLS)
    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response failed verification and/or could not be decoded
    #[error("{0}")]
    Response(FailureList),

    /// The body of a response was read more than once
    #[error("cannot decode from a consumed response body")]
    AlreadyConsumed,

    /// The operation ran out of time
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The operation was cancelled by the caller
    #[error("operation cancelled")]
    Cancelled,

    /// A verified response lacked a field the operation needs
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Check if the operation exhausted its time budget
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded)
    }

    /// Check if the operation was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if the HTTP exchange failed
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if the response failed a status or shape check
    pub fn is_verification(&self) -> bool {
        matches!(self, Self::Response(list) if list.iter().any(|f| !f.is_decode()))
    }

    /// Check if the response body could not be decoded
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Response(list) if list.iter().any(Failure::is_decode))
    }

    /// The unexpected status code reported by a status verifier, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response(list) => list.iter().find_map(|f| match f {
                Failure::UnexpectedStatus { actual, .. } => Some(*actual),
                _ => None,
            }),
            _ => None,
        }
    }
}

impl From<ContextError> for ClientError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Cancelled => Self::Cancelled,
            ContextError::DeadlineExceeded => Self::DeadlineExceeded,
        }
    }
}

/// A single failure found while verifying or decoding a response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    #[error("Unexpected status code {actual}. Expected {expected}")]
    UnexpectedStatus { expected: u16, actual: u16 },

    /// Failure reported by a custom verifier
    #[error("{0}")]
    Verification(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("failed to decode response body: {0}")]
    Decode(String),
}

impl Failure {
    pub fn verification(message: impl Into<String>) -> Self {
        Self::Verification(message.into())
    }

    /// Whether this failure came from reading or decoding the body
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Body(_) | Self::Decode(_))
    }
}

/// Ordered collection of failures found on one response
///
/// Rendered as the individual messages joined with `" : "`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureList(Vec<Failure>);

impl FailureList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, failure: Failure) {
        self.0.push(failure);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Failure> {
        self.0.iter()
    }

    /// `Ok(())` when no failure was collected
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Response(self))
        }
    }
}

impl fmt::Display for FailureList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" : ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for FailureList {}

impl From<Vec<Failure>> for FailureList {
    fn from(failures: Vec<Failure>) -> Self {
        Self(failures)
    }
}

impl<'a> IntoIterator for &'a FailureList {
    type Item = &'a Failure;
    type IntoIter = std::slice::Iter<'a, Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
