//! Structured search events and the sinks that consume them.
//!
//! The engine reports progress through an injected [`EventSink`] instead of
//! logging globally. Binaries install a `tracing` subscriber and use
//! [`TracingEventSink`]; tests and the CLI `--explain` mode collect events
//! with [`MemoryEventSink`].

use std::sync::Mutex;

use serde::Serialize;
use uuid::Uuid;

use crate::ProviderId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SearchEventKind {
    Started {
        query: String,
    },
    Dispatched {
        provider: ProviderId,
        quota: u32,
    },
    FallbackResolved {
        value: u32,
    },
    ProviderSucceeded {
        provider: ProviderId,
        count: usize,
    },
    ProviderFailed {
        provider: ProviderId,
        code: &'static str,
        message: String,
    },
    Completed {
        total: usize,
        no_content: bool,
        latency_ms: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEvent {
    pub request_id: Uuid,
    #[serde(flatten)]
    pub kind: SearchEventKind,
}

/// Destination for engine events. Called concurrently from provider branches.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: SearchEvent);
}

/// Forwards events to the `tracing` dispatcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: SearchEvent) {
        let request_id = event.request_id;
        match event.kind {
            SearchEventKind::Started { query } => {
                tracing::info!(%request_id, %query, "image search started");
            }
            SearchEventKind::Dispatched { provider, quota } => {
                tracing::debug!(%request_id, %provider, quota, "provider call dispatched");
            }
            SearchEventKind::FallbackResolved { value } => {
                tracing::debug!(%request_id, fallback = value, "fallback signal resolved");
            }
            SearchEventKind::ProviderSucceeded { provider, count } => {
                tracing::info!(%request_id, %provider, count, "provider returned images");
            }
            SearchEventKind::ProviderFailed {
                provider,
                code,
                message,
            } => {
                tracing::warn!(%request_id, %provider, code, %message, "provider call failed");
            }
            SearchEventKind::Completed {
                total,
                no_content,
                latency_ms,
            } => {
                tracing::info!(%request_id, total, no_content, latency_ms, "image search completed");
            }
        }
    }
}

/// Collects events in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<SearchEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SearchEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn kinds(&self) -> Vec<SearchEventKind> {
        self.events().into_iter().map(|event| event.kind).collect()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: SearchEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
