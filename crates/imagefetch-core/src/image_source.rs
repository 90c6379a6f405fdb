//! Image source trait and request/error types.
//!
//! This module defines the adapter contract (`ImageSource`) that every
//! provider implementation follows. Adapters perform exactly one upstream
//! call per [`ImageSearchRequest`] and never touch engine state; the engine
//! decides what a failure means for the rest of the request.
//!
//! # Failure kinds
//!
//! | Kind | Code | Raised when |
//! |------|------|-------------|
//! | `RateLimited` | `source.rate_limited` | Upstream reports an exhausted quota |
//! | `Unavailable` | `source.unavailable` | Connection or other transport failure |
//! | `TimedOut` | `source.timed_out` | No response within the request timeout |
//! | `UpstreamStatus` | `source.upstream_status` | Any other non-2xx status |
//! | `MalformedResponse` | `source.malformed_response` | Body does not match the provider schema |
//! | `AdapterNotRegistered` | `source.adapter_not_registered` | No adapter configured for a policy provider |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{ImageBatch, ProviderId, SearchQuery};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    RateLimited,
    Unavailable,
    TimedOut,
    UpstreamStatus,
    MalformedResponse,
    AdapterNotRegistered,
}

/// Structured source error carrying the failing provider and a readable cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    provider: ProviderId,
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn rate_limited(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::new(provider, SourceErrorKind::RateLimited, message)
    }

    pub fn unavailable(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::new(provider, SourceErrorKind::Unavailable, message)
    }

    pub fn timed_out(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::new(provider, SourceErrorKind::TimedOut, message)
    }

    pub fn upstream_status(provider: ProviderId, status: u16) -> Self {
        Self::new(
            provider,
            SourceErrorKind::UpstreamStatus,
            format!("{provider} upstream returned status {status}"),
        )
    }

    pub fn malformed_response(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::new(provider, SourceErrorKind::MalformedResponse, message)
    }

    pub fn adapter_not_registered(provider: ProviderId) -> Self {
        Self::new(
            provider,
            SourceErrorKind::AdapterNotRegistered,
            format!("source adapter '{provider}' is not registered"),
        )
    }

    /// Appends upstream detail (e.g. a response body excerpt) to the message.
    pub fn with_detail(mut self, detail: &str) -> Self {
        self.message = format!("{}: {detail}", self.message);
        self
    }

    fn new(provider: ProviderId, kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            message: message.into(),
        }
    }

    pub const fn provider(&self) -> ProviderId {
        self.provider
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn is_rate_limited(&self) -> bool {
        matches!(self.kind, SourceErrorKind::RateLimited)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::TimedOut => "source.timed_out",
            SourceErrorKind::UpstreamStatus => "source.upstream_status",
            SourceErrorKind::MalformedResponse => "source.malformed_response",
            SourceErrorKind::AdapterNotRegistered => "source.adapter_not_registered",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.provider, self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for one adapter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSearchRequest {
    pub query: SearchQuery,
    /// Requested upper bound; providers may return fewer.
    pub count: u32,
}

impl ImageSearchRequest {
    pub fn new(query: SearchQuery, count: u32) -> Self {
        Self { query, count }
    }
}

pub type SearchFuture<'a> = Pin<Box<dyn Future<Output = Result<ImageBatch, SourceError>> + Send + 'a>>;

/// Image provider adapter contract.
///
/// Implementations must be `Send + Sync`; the engine shares them across
/// spawned tasks behind an `Arc`.
pub trait ImageSource: Send + Sync {
    /// Returns the provider identifier stamped on every produced record.
    fn id(&self) -> ProviderId;

    /// Performs one upstream search.
    ///
    /// A `count` of zero resolves to an empty batch. Returning fewer images
    /// than requested is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport failure, non-success upstream
    /// status (rate limiting is reported as [`SourceErrorKind::RateLimited`]),
    /// or a body that does not match the provider schema.
    fn search<'a>(&'a self, req: ImageSearchRequest) -> SearchFuture<'a>;
}
