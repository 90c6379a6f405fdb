//! # imagefetch core
//!
//! Concurrent image search across Unsplash, Pexels and Pixabay.
//!
//! ## Overview
//!
//! One query fans out to every provider at once. Providers may fail in any
//! combination; whatever succeeds is merged and returned in a uniformly
//! random order. When the primary provider (Unsplash by default) is rate
//! limited, the other two request extra images to make up the shortfall.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Unsplash, Pexels, Pixabay) |
//! | [`config`] | Environment-backed credentials |
//! | [`domain`] | Query and image record types |
//! | [`engine`] | Aggregation engine and builder |
//! | [`error`] | Core error types |
//! | [`events`] | Structured search events and sinks |
//! | [`fallback`] | Single-assignment fallback signal |
//! | [`http_client`] | HTTP client abstraction |
//! | [`image_source`] | Adapter trait and source errors |
//! | [`provider`] | Provider identifiers |
//! | [`quota`] | Per-provider quota policy |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use imagefetch_core::{ImageSearchEngineBuilder, SearchOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = ImageSearchEngineBuilder::new()
//!         .with_env_credentials()
//!         .build();
//!
//!     let report = engine.search("northern lights").await?;
//!     match report.outcome {
//!         SearchOutcome::NoContent => println!("nothing found"),
//!         SearchOutcome::Images(images) => {
//!             for image in images {
//!                 println!("{} ({})", image.url, image.source);
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ Server / CLI     │
//! └────────┬─────────┘
//!          │ SearchQuery
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ ImageSearchEngine│────▶│ QuotaPolicy +    │
//! │ (spawn + join)   │     │ FallbackSignal   │
//! └────────┬─────────┘     └──────────────────┘
//!          │ one task per provider
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ ImageSource      │────▶│ HttpClient       │
//! │ (adapter trait)  │     │ (reqwest)        │
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Only an empty query is an error. Provider failures are recorded on the
//! [`SearchReport`] and never fail the request:
//!
//! ```rust
//! use imagefetch_core::{ProviderId, SourceError, SourceErrorKind};
//!
//! let error = SourceError::rate_limited(ProviderId::Unsplash, "hourly quota exhausted");
//! match error.kind() {
//!     SourceErrorKind::RateLimited => { /* other providers compensate */ }
//!     _ => { /* provider contributes nothing */ }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys are read from environment variables only and never logged
//! - Query text is URL-escaped before reaching any provider

pub mod adapters;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod events;
pub mod fallback;
pub mod http_client;
pub mod image_source;
pub mod provider;
pub mod quota;

// Adapter implementations
pub use adapters::{PexelsAdapter, PixabayAdapter, UnsplashAdapter};

// Configuration
pub use config::ProviderCredentials;

// Domain types
pub use domain::{ImageBatch, ImageRecord, SearchQuery};

// Engine
pub use engine::{
    AttemptStatus, ImageSearchEngine, ImageSearchEngineBuilder, ProviderAttempt, SearchOutcome,
    SearchReport,
};

// Error types
pub use error::ValidationError;

// Events
pub use events::{EventSink, MemoryEventSink, SearchEvent, SearchEventKind, TracingEventSink};

// Fallback signal
pub use fallback::{FallbackReader, FallbackSignal, FallbackWriter};

// HTTP client types
pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Image source trait and types
pub use image_source::{ImageSearchRequest, ImageSource, SearchFuture, SourceError, SourceErrorKind};

// Provider identifiers
pub use provider::ProviderId;

// Quota policy
pub use quota::{FallbackShare, QuotaPolicy, QuotaRule};
