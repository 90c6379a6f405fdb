use std::sync::Arc;

use serde::Deserialize;

use super::{clamp_per_page, fetch_body, parse_body, text};
use crate::http_client::{HttpClient, HttpRequest};
use crate::image_source::{ImageSearchRequest, ImageSource, SearchFuture};
use crate::{ImageBatch, ImageRecord, ProviderId};

const DEFAULT_ENDPOINT: &str = "https://api.unsplash.com/search/photos";
const MAX_PER_PAGE: u32 = 30;

/// Unsplash photo search adapter authenticated with a `client_id` access key.
#[derive(Clone)]
pub struct UnsplashAdapter {
    http_client: Arc<dyn HttpClient>,
    access_key: String,
    endpoint: String,
}

impl UnsplashAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, access_key: impl Into<String>) -> Self {
        Self {
            http_client,
            access_key: access_key.into(),
            endpoint: String::from(DEFAULT_ENDPOINT),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn search_url(&self, req: &ImageSearchRequest) -> String {
        format!(
            "{}?query={}&per_page={}&client_id={}",
            self.endpoint,
            req.query.url_encoded(),
            clamp_per_page(req.count, 1, MAX_PER_PAGE),
            urlencoding::encode(&self.access_key)
        )
    }
}

/// Unsplash answers an exhausted hourly quota with 403 rather than 429.
fn is_rate_limit(status: u16) -> bool {
    status == 403 || status == 429
}

impl ImageSource for UnsplashAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Unsplash
    }

    fn search<'a>(&'a self, req: ImageSearchRequest) -> SearchFuture<'a> {
        Box::pin(async move {
            if req.count == 0 {
                return Ok(ImageBatch::empty(ProviderId::Unsplash));
            }

            let request = HttpRequest::get(self.search_url(&req));
            let body = fetch_body(
                self.http_client.as_ref(),
                ProviderId::Unsplash,
                request,
                is_rate_limit,
            )
            .await?;
            let payload: UnsplashSearchResponse = parse_body(ProviderId::Unsplash, &body)?;

            let images = payload
                .results
                .into_iter()
                .take(req.count as usize)
                .map(normalize_photo)
                .collect();

            Ok(ImageBatch {
                provider: ProviderId::Unsplash,
                images,
            })
        })
    }
}

fn normalize_photo(photo: UnsplashPhoto) -> ImageRecord {
    let user = photo.user.unwrap_or_default();
    ImageRecord {
        url: text(photo.urls.and_then(|urls| urls.regular)),
        source: ProviderId::Unsplash,
        photographer: text(user.name),
        photographer_url: text(user.links.and_then(|links| links.html)),
        description: text(photo.alt_description),
    }
}

#[derive(Debug, Deserialize)]
struct UnsplashSearchResponse {
    results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    #[serde(default)]
    urls: Option<UnsplashUrls>,
    #[serde(default)]
    user: Option<UnsplashUser>,
    #[serde(default)]
    alt_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
    #[serde(default)]
    regular: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UnsplashUser {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    links: Option<UnsplashUserLinks>,
}

#[derive(Debug, Deserialize)]
struct UnsplashUserLinks {
    #[serde(default)]
    html: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::RecordingHttpClient;
    use crate::image_source::SourceErrorKind;
    use crate::SearchQuery;

    const BODY: &str = r#"{
        "total": 2,
        "results": [
            {
                "urls": { "regular": "https://images.unsplash.test/cat-1" },
                "user": { "name": "Mia", "links": { "html": "https://unsplash.test/@mia" } },
                "alt_description": "cat on a sofa"
            },
            {
                "urls": { "regular": "https://images.unsplash.test/cat-2" },
                "user": { "name": "Leo", "links": { "html": "https://unsplash.test/@leo" } },
                "alt_description": null
            }
        ]
    }"#;

    fn request(text: &str, count: u32) -> ImageSearchRequest {
        ImageSearchRequest::new(SearchQuery::parse(text).expect("valid query"), count)
    }

    #[tokio::test]
    async fn builds_search_url_with_escaped_query_and_access_key() {
        let client = Arc::new(RecordingHttpClient::responding(200, BODY));
        let adapter = UnsplashAdapter::new(client.clone(), "access-key");

        adapter
            .search(request("black cat", 2))
            .await
            .expect("search should succeed");

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://api.unsplash.com/search/photos?query=black%20cat&per_page=2&client_id=access-key"
        );
    }

    #[tokio::test]
    async fn normalizes_results_and_defaults_missing_text() {
        let client = Arc::new(RecordingHttpClient::responding(200, BODY));
        let adapter = UnsplashAdapter::new(client, "access-key");

        let batch = adapter.search(request("cat", 2)).await.expect("search should succeed");

        assert_eq!(batch.provider, ProviderId::Unsplash);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.images[0].url, "https://images.unsplash.test/cat-1");
        assert_eq!(batch.images[0].photographer_url, "https://unsplash.test/@mia");
        assert_eq!(batch.images[0].description, "cat on a sofa");
        assert_eq!(batch.images[1].description, "");
        assert!(batch.images.iter().all(|image| image.source == ProviderId::Unsplash));
    }

    #[tokio::test]
    async fn forbidden_status_is_reported_as_rate_limited() {
        let client = Arc::new(RecordingHttpClient::responding(403, "Rate Limit Exceeded"));
        let adapter = UnsplashAdapter::new(client, "access-key");

        let error = adapter.search(request("cat", 2)).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::RateLimited);
        assert_eq!(error.provider(), ProviderId::Unsplash);
    }

    #[tokio::test]
    async fn missing_results_array_is_malformed() {
        let client = Arc::new(RecordingHttpClient::responding(200, r#"{"errors":["oops"]}"#));
        let adapter = UnsplashAdapter::new(client, "access-key");

        let error = adapter.search(request("cat", 2)).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn zero_count_skips_the_network_call() {
        let client = Arc::new(RecordingHttpClient::responding(200, BODY));
        let adapter = UnsplashAdapter::new(client.clone(), "access-key");

        let batch = adapter.search(request("cat", 0)).await.expect("empty batch");
        assert!(batch.is_empty());
        assert!(client.recorded_requests().is_empty());
    }
}
