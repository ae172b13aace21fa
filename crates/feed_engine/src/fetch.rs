use std::num::NonZeroU32;
use std::time::Duration;

use feed_core::{Event, FailureKind, FetchError};
use feed_logging::feed_debug;
use futures_util::StreamExt;
use reqwest::Url;

const EVENTS_PATH: &str = "api/events";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            max_bytes: 1024 * 1024,
        }
    }
}

/// Retrieves one bounded snapshot of the remote event collection.
///
/// Implementations do not retry; the next scheduled poll is the retry.
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, limit: NonZeroU32) -> Result<Vec<Event>, FetchError>;
}

/// Fetches `GET <base>/api/events?limit=N` over HTTP.
#[derive(Debug, Clone)]
pub struct ReqwestFeedFetcher {
    endpoint: Result<Url, FetchError>,
    client: Result<reqwest::Client, FetchError>,
    settings: FetchSettings,
}

impl ReqwestFeedFetcher {
    /// A missing or invalid `base_url` is not rejected here: every fetch
    /// then fails with a network error, which keeps the engine running.
    pub fn new(base_url: Option<&str>, settings: FetchSettings) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::network(err.to_string()));

        Self {
            endpoint: resolve_endpoint(base_url),
            client,
            settings,
        }
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref().ok()
    }
}

#[async_trait::async_trait]
impl FeedFetcher for ReqwestFeedFetcher {
    async fn fetch(&self, limit: NonZeroU32) -> Result<Vec<Event>, FetchError> {
        let endpoint = self.endpoint.clone()?;
        let client = self.client.as_ref().map_err(Clone::clone)?;

        feed_debug!("GET {} limit={}", endpoint, limit);
        let response = client
            .get(endpoint)
            .query(&[("limit", limit.get())])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        decode_snapshot(&bytes)
    }
}

/// Parses a response body into an ordered event list.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Vec<Event>, FetchError> {
    serde_json::from_slice(bytes).map_err(|err| FetchError::decode(err.to_string()))
}

fn resolve_endpoint(base_url: Option<&str>) -> Result<Url, FetchError> {
    let base = base_url
        .map(str::trim)
        .filter(|base| !base.is_empty())
        .ok_or_else(|| FetchError::network("backend base url is not configured"))?;

    let endpoint = format!("{}/{}", base.trim_end_matches('/'), EVENTS_PATH);
    let url = Url::parse(&endpoint)
        .map_err(|err| FetchError::network(format!("invalid backend base url {base:?}: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(FetchError::network(format!(
            "unsupported backend url scheme {scheme:?}"
        ))),
    }
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::network(format!(
        "response too large (max {max_bytes}, actual {actual})"
    ))
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::network(format!("timeout: {err}"));
    }
    if err.is_decode() {
        return FetchError::decode(err.to_string());
    }
    FetchError::network(err.to_string())
}
