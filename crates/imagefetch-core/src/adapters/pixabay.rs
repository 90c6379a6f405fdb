use std::sync::Arc;

use serde::Deserialize;

use super::{clamp_per_page, fetch_body, parse_body, text};
use crate::http_client::{HttpClient, HttpRequest};
use crate::image_source::{ImageSearchRequest, ImageSource, SearchFuture};
use crate::{ImageBatch, ImageRecord, ProviderId};

const DEFAULT_ENDPOINT: &str = "https://pixabay.com/api/";
const MIN_PER_PAGE: u32 = 3;
const MAX_PER_PAGE: u32 = 200;

/// Pixabay search adapter authenticated with a `key` query parameter.
#[derive(Clone)]
pub struct PixabayAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    endpoint: String,
}

impl PixabayAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            endpoint: String::from(DEFAULT_ENDPOINT),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

fn is_rate_limit(status: u16) -> bool {
    status == 429
}

impl ImageSource for PixabayAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Pixabay
    }

    fn search<'a>(&'a self, req: ImageSearchRequest) -> SearchFuture<'a> {
        Box::pin(async move {
            if req.count == 0 {
                return Ok(ImageBatch::empty(ProviderId::Pixabay));
            }

            // per_page below 3 is rejected upstream; results are truncated below.
            let url = format!(
                "{}?key={}&q={}&per_page={}&image_type=photo",
                self.endpoint,
                urlencoding::encode(&self.api_key),
                req.query.url_encoded(),
                clamp_per_page(req.count, MIN_PER_PAGE, MAX_PER_PAGE)
            );

            let body = fetch_body(
                self.http_client.as_ref(),
                ProviderId::Pixabay,
                HttpRequest::get(url),
                is_rate_limit,
            )
            .await?;
            let payload: PixabaySearchResponse = parse_body(ProviderId::Pixabay, &body)?;

            let images = payload
                .hits
                .into_iter()
                .take(req.count as usize)
                .map(normalize_hit)
                .collect();

            Ok(ImageBatch {
                provider: ProviderId::Pixabay,
                images,
            })
        })
    }
}

fn normalize_hit(hit: PixabayHit) -> ImageRecord {
    let user = text(hit.user);
    let photographer_url = if user.is_empty() {
        String::new()
    } else {
        format!("https://pixabay.com/users/{}/", user.to_lowercase())
    };

    ImageRecord {
        url: text(hit.webformat_url),
        source: ProviderId::Pixabay,
        photographer: user,
        photographer_url,
        description: text(hit.tags),
    }
}

#[derive(Debug, Deserialize)]
struct PixabaySearchResponse {
    hits: Vec<PixabayHit>,
}

#[derive(Debug, Deserialize)]
struct PixabayHit {
    #[serde(rename = "webformatURL", default)]
    webformat_url: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    tags: Option<String>,
}
