//! Provider adapters for Unsplash, Pexels and Pixabay.
//!
//! Each adapter issues one GET per call against its fixed endpoint template
//! and normalizes the provider JSON into [`ImageRecord`](crate::ImageRecord)s.
//! Missing or null string fields normalize to `""`.

mod pexels;
mod pixabay;
mod unsplash;

pub use pexels::PexelsAdapter;
pub use pixabay::PixabayAdapter;
pub use unsplash::UnsplashAdapter;

use serde::de::DeserializeOwned;

use crate::http_client::{HttpClient, HttpRequest};
use crate::image_source::SourceError;
use crate::ProviderId;

const ERROR_BODY_PREVIEW: usize = 200;

/// Executes the request and returns the body of a 2xx response.
///
/// `is_rate_limit` decides which non-success statuses the provider uses to
/// signal an exhausted quota.
async fn fetch_body(
    http_client: &dyn HttpClient,
    provider: ProviderId,
    request: HttpRequest,
    is_rate_limit: fn(u16) -> bool,
) -> Result<String, SourceError> {
    let response = http_client.execute(request).await.map_err(|error| {
        if error.timed_out() {
            SourceError::timed_out(provider, format!("{provider} timed out: {}", error.message()))
        } else {
            SourceError::unavailable(
                provider,
                format!("{provider} transport error: {}", error.message()),
            )
        }
    })?;

    if response.is_success() {
        return Ok(response.body);
    }

    if is_rate_limit(response.status) {
        return Err(SourceError::rate_limited(
            provider,
            format!("{provider} rate limit reached (status {})", response.status),
        ));
    }

    let preview: String = response.body.chars().take(ERROR_BODY_PREVIEW).collect();
    let error = SourceError::upstream_status(provider, response.status);
    if preview.trim().is_empty() {
        return Err(error);
    }
    Err(error.with_detail(preview.trim()))
}

fn parse_body<T: DeserializeOwned>(provider: ProviderId, body: &str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| {
        SourceError::malformed_response(provider, format!("failed to parse {provider} response: {e}"))
    })
}

fn clamp_per_page(count: u32, min: u32, max: u32) -> u32 {
    count.clamp(min, max)
}

fn text(value: Option<String>) -> String {
    value.unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};

    #[derive(Debug)]
    pub struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        pub fn responding(status: u16, body: &str) -> Self {
            Self {
                response: Ok(HttpResponse::with_status(status, body)),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                response: Err(HttpError::new(message)),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn timing_out(message: &str) -> Self {
            Self {
                response: Err(HttpError::timeout(message)),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }
}
