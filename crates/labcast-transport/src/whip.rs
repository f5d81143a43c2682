//! WHIP publish client.
//!
//! One `POST` per broadcast attempt: the local offer goes up as
//! `application/sdp`, the answer comes back in the response body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use labcast_ipc::StreamKey;

use crate::error::{PublishError, TransportError};
use crate::peer::SessionDescription;
use crate::TransportResult;

/// Default live-ingest origin.
pub const DEFAULT_INGEST_BASE_URL: &str = "https://global-live.mux.com";

/// Default path prefix of the per-stream publish endpoint.
pub const DEFAULT_WHIP_PATH: &str = "/api/v1/whip";

/// Content type of offer and answer bodies.
pub const SDP_CONTENT_TYPE: &str = "application/sdp";

/// Ingest origin settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Origin base URL, `https://` (or `http://` for a local ingest).
    pub base_url: String,

    /// Path prefix; the stream key is appended as the last segment.
    pub whip_path: String,

    /// Overall timeout for the publish request. Unbounded when unset.
    pub publish_timeout_secs: Option<u64>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_INGEST_BASE_URL.to_string(),
            whip_path: DEFAULT_WHIP_PATH.to_string(),
            publish_timeout_secs: None,
        }
    }
}

/// Successful publish handshake result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishAnswer {
    /// HTTP status of the response (2xx).
    pub status: u16,

    /// Raw answer SDP.
    pub sdp: String,

    /// WHIP resource URL from the `Location` header, resolved against the endpoint.
    pub resource_url: Option<Url>,
}

impl PublishAnswer {
    /// The answer as a remote description.
    pub fn description(&self) -> SessionDescription {
        SessionDescription::answer(self.sdp.clone())
    }
}

/// Performs the publish handshake against an ingest origin.
#[async_trait]
pub trait IngestPublisher: Send + Sync {
    /// Send `offer_sdp` for `stream_key` and return the remote answer.
    async fn publish(
        &self,
        stream_key: &StreamKey,
        offer_sdp: &str,
    ) -> Result<PublishAnswer, PublishError>;
}

/// HTTP WHIP client.
#[derive(Debug, Clone)]
pub struct WhipClient {
    http: reqwest::Client,
    base_url: Url,
    whip_path: String,
}

impl WhipClient {
    /// Create a client for the configured ingest origin.
    pub fn new(config: &IngestConfig) -> TransportResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| TransportError::InvalidEndpoint(format!("{}: {e}", config.base_url)))?;

        match base_url.scheme() {
            "https" | "http" => {}
            other => {
                return Err(TransportError::InvalidEndpoint(format!(
                    "unsupported scheme '{other}', expected https"
                )))
            }
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.publish_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| TransportError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            whip_path: config.whip_path.clone(),
        })
    }

    /// Per-stream publish endpoint.
    pub fn endpoint(&self, stream_key: &StreamKey) -> TransportResult<Url> {
        self.endpoint_with(stream_key.expose())
    }

    /// Endpoint with the stream key masked, for logs and displays.
    pub fn masked_endpoint(&self, stream_key: &StreamKey) -> TransportResult<String> {
        Ok(self.endpoint_with(&stream_key.masked())?.to_string())
    }

    /// Only the final path segment carries the key.
    fn endpoint_with(&self, last_segment: &str) -> TransportResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                TransportError::InvalidEndpoint("base URL cannot carry a path".to_string())
            })?;
            segments.pop_if_empty();
            for segment in self.whip_path.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
            segments.push(last_segment);
        }
        Ok(url)
    }
}

#[async_trait]
impl IngestPublisher for WhipClient {
    #[instrument(name = "whip_publish", skip(self, stream_key, offer_sdp), fields(stream_key = %stream_key))]
    async fn publish(
        &self,
        stream_key: &StreamKey,
        offer_sdp: &str,
    ) -> Result<PublishAnswer, PublishError> {
        let endpoint = self.endpoint(stream_key)?;
        info!(
            endpoint = %self.masked_endpoint(stream_key)?,
            offer_bytes = offer_sdp.len(),
            "Posting offer to ingest server"
        );

        // Errors are stripped of the URL: it carries the stream key.
        let response = self
            .http
            .post(endpoint.clone())
            .header(CONTENT_TYPE, SDP_CONTENT_TYPE)
            .body(offer_sdp.to_owned())
            .send()
            .await
            .map_err(|e| PublishError::Network(e.without_url()))?;

        let status = response.status();
        let resource_url = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|location| endpoint.join(location).ok());

        let body = response
            .text()
            .await
            .map_err(|e| PublishError::Network(e.without_url()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Ingest server rejected offer");
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                detail: body,
            });
        }

        validate_answer(&body)?;
        debug!(
            status = status.as_u16(),
            answer_bytes = body.len(),
            has_resource = resource_url.is_some(),
            "Received answer"
        );

        Ok(PublishAnswer {
            status: status.as_u16(),
            sdp: body,
            resource_url,
        })
    }
}

/// Check that a response body looks like a session description.
pub fn validate_answer(sdp: &str) -> Result<(), PublishError> {
    let first_line = sdp.lines().map(str::trim).find(|line| !line.is_empty());
    match first_line {
        None => Err(PublishError::MalformedAnswer("empty body".to_string())),
        Some(line) if line.starts_with("v=") => Ok(()),
        Some(line) => {
            let preview: String = line.chars().take(40).collect();
            Err(PublishError::MalformedAnswer(format!(
                "expected 'v=' line, found '{preview}'"
            )))
        }
    }
}
