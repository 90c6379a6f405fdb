//! Concurrent fan-out/fan-in over every provider in the quota policy.
//!
//! One request runs as follows:
//!
//! ```text
//! Pending ──▶ AllDispatched ──▶ branches settle ──▶ AllCollected ──▶ NoContent | Images
//! ```
//!
//! All branches are spawned together. The primary branch resolves the
//! fallback signal once its call settles; dependent branches wait for that
//! value before computing their quota. The engine joins every branch (full
//! barrier), merges successful batches and shuffles the result uniformly.
//! A failing branch never cancels or affects its siblings.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::adapters::{PexelsAdapter, PixabayAdapter, UnsplashAdapter};
use crate::config::ProviderCredentials;
use crate::events::{EventSink, SearchEvent, SearchEventKind, TracingEventSink};
use crate::fallback::{FallbackReader, FallbackSignal, FallbackWriter};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::image_source::{ImageSearchRequest, ImageSource, SourceError};
use crate::quota::{QuotaPolicy, QuotaRule};
use crate::{ImageBatch, ImageRecord, ProviderId, SearchQuery, ValidationError};

const BRANCH_PANICKED: &str = "engine.branch_panicked";

/// Settled state of one provider branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptStatus {
    Succeeded { count: usize },
    Failed { code: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderAttempt {
    pub provider: ProviderId,
    /// Requested count; `None` when the branch died before computing it.
    pub quota: Option<u32>,
    #[serde(flatten)]
    pub status: AttemptStatus,
}

impl ProviderAttempt {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, AttemptStatus::Succeeded { .. })
    }

    pub fn was_rate_limited(&self) -> bool {
        matches!(&self.status, AttemptStatus::Failed { code, .. } if code == "source.rate_limited")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "images", rename_all = "snake_case")]
pub enum SearchOutcome {
    NoContent,
    Images(Vec<ImageRecord>),
}

/// Everything one search produced: the merged images plus per-provider detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchReport {
    pub request_id: Uuid,
    pub outcome: SearchOutcome,
    pub attempts: Vec<ProviderAttempt>,
    /// Value observed on the fallback signal for this request.
    pub fallback: u32,
    pub latency_ms: u64,
}

impl SearchReport {
    pub fn is_no_content(&self) -> bool {
        matches!(self.outcome, SearchOutcome::NoContent)
    }

    pub fn images(&self) -> &[ImageRecord] {
        match &self.outcome {
            SearchOutcome::NoContent => &[],
            SearchOutcome::Images(images) => images,
        }
    }

    pub fn into_images(self) -> Vec<ImageRecord> {
        match self.outcome {
            SearchOutcome::NoContent => Vec::new(),
            SearchOutcome::Images(images) => images,
        }
    }

    pub fn attempt(&self, provider: ProviderId) -> Option<&ProviderAttempt> {
        self.attempts.iter().find(|attempt| attempt.provider == provider)
    }
}

/// Aggregation engine over a fixed set of image sources.
pub struct ImageSearchEngine {
    sources: HashMap<ProviderId, Arc<dyn ImageSource>>,
    policy: QuotaPolicy,
    sink: Arc<dyn EventSink>,
    shuffle_seed: Option<u64>,
}

impl ImageSearchEngine {
    pub fn new(sources: Vec<Arc<dyn ImageSource>>, policy: QuotaPolicy) -> Self {
        let sources = sources
            .into_iter()
            .map(|source| (source.id(), source))
            .collect();
        Self {
            sources,
            policy,
            sink: Arc::new(TracingEventSink),
            shuffle_seed: None,
        }
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Fixes the output permutation; intended for reproducible runs.
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    pub fn registered_providers(&self) -> Vec<ProviderId> {
        let mut providers = self.sources.keys().copied().collect::<Vec<_>>();
        providers.sort();
        providers
    }

    /// Policy providers with no adapter; their branches contribute nothing.
    pub fn unregistered_providers(&self) -> Vec<ProviderId> {
        self.policy
            .rules()
            .iter()
            .map(|rule| rule.provider)
            .filter(|provider| !self.sources.contains_key(provider))
            .collect()
    }

    /// Validates `query` and runs the search.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyQuery`] for blank input; no provider
    /// is contacted in that case. Provider failures are never errors.
    pub async fn search(&self, query: &str) -> Result<SearchReport, ValidationError> {
        let query = SearchQuery::parse(query)?;
        Ok(self.search_query(&query).await)
    }

    pub async fn search_query(&self, query: &SearchQuery) -> SearchReport {
        let started = Instant::now();
        let request_id = Uuid::new_v4();
        self.sink.emit(SearchEvent {
            request_id,
            kind: SearchEventKind::Started {
                query: query.as_str().to_owned(),
            },
        });

        let (writer, reader) = FallbackSignal::channel();
        let mut writer = Some(writer);
        let mut branches = Vec::with_capacity(self.policy.rules().len());

        for rule in self.policy.rules() {
            let branch = Branch {
                request_id,
                query: query.clone(),
                rule: *rule,
                source: self.sources.get(&rule.provider).cloned(),
                sink: Arc::clone(&self.sink),
            };

            let handle = if rule.provider == self.policy.primary() {
                let writer = writer.take();
                let sentinel = self.policy.rate_limit_fallback();
                tokio::spawn(branch.run_primary(writer, sentinel))
            } else if rule.share.depends_on_fallback() {
                tokio::spawn(branch.run_dependent(reader.clone()))
            } else {
                tokio::spawn(branch.run(0))
            };
            branches.push((rule.provider, handle));
        }
        drop(writer);

        let mut attempts = Vec::with_capacity(branches.len());
        let mut collected = Vec::new();
        for (provider, handle) in branches {
            match handle.await {
                Ok(BranchOutput {
                    quota,
                    result: Ok(batch),
                }) => {
                    attempts.push(ProviderAttempt {
                        provider,
                        quota: Some(quota),
                        status: AttemptStatus::Succeeded { count: batch.len() },
                    });
                    collected.extend(batch.images);
                }
                Ok(BranchOutput {
                    quota,
                    result: Err(error),
                }) => {
                    attempts.push(ProviderAttempt {
                        provider,
                        quota: Some(quota),
                        status: AttemptStatus::Failed {
                            code: error.code().to_owned(),
                            message: error.message().to_owned(),
                        },
                    });
                }
                Err(join_error) => {
                    let message = format!("{provider} branch terminated: {join_error}");
                    self.sink.emit(SearchEvent {
                        request_id,
                        kind: SearchEventKind::ProviderFailed {
                            provider,
                            code: BRANCH_PANICKED,
                            message: message.clone(),
                        },
                    });
                    attempts.push(ProviderAttempt {
                        provider,
                        quota: None,
                        status: AttemptStatus::Failed {
                            code: String::from(BRANCH_PANICKED),
                            message,
                        },
                    });
                }
            }
        }

        // Every branch has settled, so the writer is resolved or dropped.
        let fallback = reader.observe().await;

        let outcome = if collected.is_empty() {
            SearchOutcome::NoContent
        } else {
            self.shuffle(&mut collected);
            SearchOutcome::Images(collected)
        };

        let latency_ms = elapsed_ms(started);
        let total = match &outcome {
            SearchOutcome::NoContent => 0,
            SearchOutcome::Images(images) => images.len(),
        };
        self.sink.emit(SearchEvent {
            request_id,
            kind: SearchEventKind::Completed {
                total,
                no_content: total == 0,
                latency_ms,
            },
        });

        SearchReport {
            request_id,
            outcome,
            attempts,
            fallback,
            latency_ms,
        }
    }

    fn shuffle(&self, images: &mut [ImageRecord]) {
        let mut rng = match self.shuffle_seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        rng.shuffle(images);
    }
}

struct BranchOutput {
    quota: u32,
    result: Result<ImageBatch, SourceError>,
}

/// Owned inputs for one spawned provider branch.
struct Branch {
    request_id: Uuid,
    query: SearchQuery,
    rule: QuotaRule,
    source: Option<Arc<dyn ImageSource>>,
    sink: Arc<dyn EventSink>,
}

impl Branch {
    async fn run_primary(self, writer: Option<FallbackWriter>, sentinel: u32) -> BranchOutput {
        let sink = Arc::clone(&self.sink);
        let request_id = self.request_id;
        let output = self.run(0).await;

        let value = match &output.result {
            Err(error) if error.is_rate_limited() => sentinel,
            _ => 0,
        };
        sink.emit(SearchEvent {
            request_id,
            kind: SearchEventKind::FallbackResolved { value },
        });
        if let Some(writer) = writer {
            writer.resolve(value);
        }
        output
    }

    async fn run_dependent(self, reader: FallbackReader) -> BranchOutput {
        let fallback = reader.observe().await;
        self.run(fallback).await
    }

    async fn run(self, fallback: u32) -> BranchOutput {
        let provider = self.rule.provider;
        let quota = self.rule.quota(fallback);

        let result = match self.source {
            Some(source) => {
                self.sink.emit(SearchEvent {
                    request_id: self.request_id,
                    kind: SearchEventKind::Dispatched { provider, quota },
                });
                source
                    .search(ImageSearchRequest::new(self.query, quota))
                    .await
            }
            None => Err(SourceError::adapter_not_registered(provider)),
        };

        let kind = match &result {
            Ok(batch) => SearchEventKind::ProviderSucceeded {
                provider,
                count: batch.len(),
            },
            Err(error) => SearchEventKind::ProviderFailed {
                provider,
                code: error.code(),
                message: error.message().to_owned(),
            },
        };
        self.sink.emit(SearchEvent {
            request_id: self.request_id,
            kind,
        });

        BranchOutput { quota, result }
    }
}

/// Builder for an engine backed by the real provider adapters.
///
/// # Example
///
/// ```rust,ignore
/// use imagefetch_core::ImageSearchEngineBuilder;
///
/// let engine = ImageSearchEngineBuilder::new()
///     .with_env_credentials()
///     .build();
/// let report = engine.search("cat").await?;
/// ```
#[derive(Default)]
pub struct ImageSearchEngineBuilder {
    credentials: ProviderCredentials,
    http_client: Option<Arc<dyn HttpClient>>,
    policy: QuotaPolicy,
    sink: Option<Arc<dyn EventSink>>,
    shuffle_seed: Option<u64>,
    overrides: Vec<Arc<dyn ImageSource>>,
}

impl ImageSearchEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads provider keys from the environment (see [`crate::config`]).
    pub fn with_env_credentials(mut self) -> Self {
        self.credentials = ProviderCredentials::from_env();
        self
    }

    pub fn with_credentials(mut self, credentials: ProviderCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Transport shared by all built-in adapters. Defaults to reqwest.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_quota_policy(mut self, policy: QuotaPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Registers a custom source, replacing the built-in adapter with the same id.
    pub fn with_source(mut self, source: Arc<dyn ImageSource>) -> Self {
        self.overrides.push(source);
        self
    }

    pub fn build(self) -> ImageSearchEngine {
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));

        let mut sources: Vec<Arc<dyn ImageSource>> = Vec::with_capacity(3);
        if let Some(key) = self.credentials.key_for(ProviderId::Unsplash) {
            sources.push(Arc::new(UnsplashAdapter::new(Arc::clone(&http_client), key)));
        }
        if let Some(key) = self.credentials.key_for(ProviderId::Pexels) {
            sources.push(Arc::new(PexelsAdapter::new(Arc::clone(&http_client), key)));
        }
        if let Some(key) = self.credentials.key_for(ProviderId::Pixabay) {
            sources.push(Arc::new(PixabayAdapter::new(Arc::clone(&http_client), key)));
        }
        // Later entries win when the engine keys sources by provider id.
        sources.extend(self.overrides);

        let mut engine = ImageSearchEngine::new(sources, self.policy);
        for provider in engine.unregistered_providers() {
            warn!(%provider, "no API key configured; provider will contribute no images");
        }
        if let Some(sink) = self.sink {
            engine = engine.with_event_sink(sink);
        }
        if let Some(seed) = self.shuffle_seed {
            engine = engine.with_shuffle_seed(seed);
        }
        engine
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
