use std::sync::Arc;

use serde::Deserialize;

use super::{clamp_per_page, fetch_body, parse_body, text};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::image_source::{ImageSearchRequest, ImageSource, SearchFuture};
use crate::{ImageBatch, ImageRecord, ProviderId};

const DEFAULT_ENDPOINT: &str = "https://api.pexels.com/v1/search";
const MAX_PER_PAGE: u32 = 80;
const USER_AGENT: &str = "Mozilla/5.0 (compatible; ImageFetcherBot/1.0)";

/// Pexels search adapter authenticated with a bearer API key.
#[derive(Clone)]
pub struct PexelsAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    endpoint: String,
}

impl PexelsAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            auth: HttpAuth::BearerToken(api_key.into()),
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

impl ImageSource for PexelsAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Pexels
    }

    fn search<'a>(&'a self, req: ImageSearchRequest) -> SearchFuture<'a> {
        Box::pin(async move {
            if req.count == 0 {
                return Ok(ImageBatch::empty(ProviderId::Pexels));
            }

            let url = format!(
                "{}?query={}&per_page={}",
                self.endpoint,
                req.query.url_encoded(),
                clamp_per_page(req.count, 1, MAX_PER_PAGE)
            );
            let request = HttpRequest::get(url)
                .with_auth(&self.auth)
                .with_header("user-agent", USER_AGENT);

            let body = fetch_body(
                self.http_client.as_ref(),
                ProviderId::Pexels,
                request,
                is_rate_limit,
            )
            .await?;
            let payload: PexelsSearchResponse = parse_body(ProviderId::Pexels, &body)?;

            let images = payload
                .photos
                .into_iter()
                .take(req.count as usize)
                .map(normalize_photo)
                .collect();

            Ok(ImageBatch {
                provider: ProviderId::Pexels,
                images,
            })
        })
    }
}

fn normalize_photo(photo: PexelsPhoto) -> ImageRecord {
    ImageRecord {
        url: text(photo.src.and_then(|src| src.medium)),
        source: ProviderId::Pexels,
        photographer: text(photo.photographer),
        photographer_url: text(photo.photographer_url),
        description: text(photo.alt),
    }
}

#[derive(Debug, Deserialize)]
struct PexelsSearchResponse {
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    #[serde(default)]
    src: Option<PexelsSources>,
    #[serde(default)]
    photographer: Option<String>,
    #[serde(default)]
    photographer_url: Option<String>,
    #[serde(default)]
    alt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PexelsSources {
    #[serde(default)]
    medium: Option<String>,
}
