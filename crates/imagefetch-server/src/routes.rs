//! HTTP routes.
//!
//! | Method | Path | Auth | Response |
//! |--------|------|------|----------|
//! | GET | `/health` | none | `200 {"status":"ok"}` |
//! | GET | `/imagesearch/search?query=` | bearer JWT | `200` image array, `204` no content, `400` blank query, `401` bad token |

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use imagefetch_core::{ImageSearchEngine, SearchOutcome, SearchQuery};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{Authenticated, JwtVerifier};
use crate::error::ApiError;

/// Application state shared across handlers.
pub struct AppState {
    pub engine: ImageSearchEngine,
    pub verifier: JwtVerifier,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/imagesearch/search", get(search))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: Option<String>,
}

async fn search(
    Authenticated(claims): Authenticated,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let query = SearchQuery::parse(params.query.as_deref().unwrap_or_default())?;
    tracing::debug!(subject = %claims.sub, %query, "search requested");

    let report = state.engine.search_query(&query).await;
    let response = match report.outcome {
        SearchOutcome::NoContent => StatusCode::NO_CONTENT.into_response(),
        SearchOutcome::Images(images) => Json(images).into_response(),
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::{settings, valid_token};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use imagefetch_core::{
        ImageBatch, ImageRecord, ImageSearchRequest, ImageSource, ProviderId, QuotaPolicy,
        SearchFuture, SourceError,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct FixedSource {
        provider: ProviderId,
        images: usize,
        calls: Arc<AtomicUsize>,
    }

    impl ImageSource for FixedSource {
        fn id(&self) -> ProviderId {
            self.provider
        }

        fn search<'a>(&'a self, req: ImageSearchRequest) -> SearchFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let provider = self.provider;
            let count = self.images.min(req.count as usize);
            Box::pin(async move {
                if count == 0 {
                    return Err(SourceError::unavailable(provider, "offline"));
                }
                Ok(ImageBatch {
                    provider,
                    images: (0..count)
                        .map(|i| ImageRecord {
                            url: format!("https://{provider}.test/{i}"),
                            source: provider,
                            photographer: String::from("someone"),
                            photographer_url: String::new(),
                            description: String::new(),
                        })
                        .collect(),
                })
            })
        }
    }

    fn app(images_per_provider: usize) -> (Router, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let sources: Vec<Arc<dyn ImageSource>> = ProviderId::ALL
            .into_iter()
            .map(|provider| {
                Arc::new(FixedSource {
                    provider,
                    images: images_per_provider,
                    calls: calls.clone(),
                }) as Arc<dyn ImageSource>
            })
            .collect();
        let state = Arc::new(AppState {
            engine: ImageSearchEngine::new(sources, QuotaPolicy::default()),
            verifier: JwtVerifier::new(&settings()),
        });
        (router(state), calls)
    }

    fn search_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).expect("request builds")
    }

    #[tokio::test]
    async fn authorized_search_returns_merged_images() {
        let (app, calls) = app(10);
        let token = valid_token(&settings());

        let response = app
            .oneshot(search_request("/imagesearch/search?query=cat", Some(&token)))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let images: Vec<serde_json::Value> = serde_json::from_slice(&body).expect("json array");
        assert_eq!(images.len(), 12);
        assert!(images[0].get("photographerUrl").is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn all_providers_failing_yields_no_content() {
        let (app, _) = app(0);
        let token = valid_token(&settings());

        let response = app
            .oneshot(search_request("/imagesearch/search?query=cat", Some(&token)))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn blank_query_is_a_bad_request_without_provider_calls() {
        let (app, calls) = app(10);
        let token = valid_token(&settings());

        let response = app
            .oneshot(search_request("/imagesearch/search?query=%20%20", Some(&token)))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        assert_eq!(&body[..], b"Query is required");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_query_parameter_is_a_bad_request() {
        let (app, _) = app(10);
        let token = valid_token(&settings());

        let response = app
            .oneshot(search_request("/imagesearch/search", Some(&token)))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let (app, calls) = app(10);

        let response = app
            .oneshot(search_request("/imagesearch/search?query=cat", None))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).map(|v| v.as_bytes()),
            Some(&b"Bearer"[..])
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let (app, _) = app(10);

        let response = app
            .oneshot(search_request("/imagesearch/search?query=cat", Some("not-a-jwt")))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_needs_no_token() {
        let (app, _) = app(10);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
