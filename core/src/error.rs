//! Error types for the list gateway.
//!
//! # Design
//! Failed responses are returned whole so callers can inspect status, headers
//! and body. A 404 from the existence probe gets its own variant because it
//! means the web itself is missing, while `Rejected` means the actual query
//! was refused. Transport failures keep the original error as their source.

use thiserror::Error;

use crate::http::HttpResponse;

/// Boxed error produced by a transport when no response could be obtained.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct TransportError(#[from] Box<dyn std::error::Error + Send + Sync>);

impl TransportError {
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self(err.into())
    }

    /// The original error as handed over by the transport.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync> {
        self.0
    }
}

/// Errors returned by `ListService` operations and the response parsers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The existence probe against the web returned 404; the query was not sent.
    #[error("web not found (probe returned HTTP {})", .0.status)]
    ProbeNotFound(HttpResponse),

    /// The remote store answered with a non-2xx status.
    #[error("HTTP {}: {}", .0.status, .0.body)]
    Rejected(HttpResponse),

    /// The transport failed before a response was obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body could not be deserialized into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// The response carried by `ProbeNotFound` or `Rejected`.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            ApiError::ProbeNotFound(resp) | ApiError::Rejected(resp) => Some(resp),
            _ => None,
        }
    }
}
