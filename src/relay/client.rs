use reqwest::{
    Client, ClientBuilder, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::relay::{
    charset::decode_body,
    errors::RelayError,
    provider::{EnvelopeKind, RelayProvider},
};

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const USER_AGENT: &str = "ReadRelay/0.1 (+https://github.com/readrelay/readrelay)";

/// Performs single requests against one relay provider.
///
/// The client carries no request timeout of its own; deadlines are applied
/// per attempt by the caller.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: Client,
}

impl RelayClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.8,*/*;q=0.7",
            ),
        );

        let http = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers(headers)
            .build()?;

        Ok(Self { http })
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Fetch `target` through `provider` and unwrap the provider's envelope.
    #[instrument(skip_all, fields(provider = %provider.id, target = %target))]
    pub async fn fetch(&self, target: &Url, provider: &RelayProvider) -> Result<String, RelayError> {
        let endpoint = provider
            .endpoint_for(target)
            .map_err(|e| RelayError::Transport(format!("invalid relay endpoint: {e}")))?;

        let response = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(RelayError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::BadStatus(status));
        }

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(RelayError::BodyTooLarge(content_length));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(RelayError::from_reqwest_error)?;

        // Content-Length may be missing or wrong for chunked/compressed bodies
        if body.len() as u64 > MAX_BODY_SIZE {
            return Err(RelayError::BodyTooLarge(body.len() as u64));
        }

        debug!(
            status = %status,
            content_type = %content_type,
            bytes = body.len(),
            "Relay responded"
        );

        match &provider.envelope {
            EnvelopeKind::RawText => Ok(decode_body(&content_type, &body)),
            EnvelopeKind::JsonWrapped { field } => unwrap_json_envelope(&body, field),
        }
    }

    /// Issue a HEAD request for `target` through `provider`, returning only the status.
    #[instrument(skip_all, fields(provider = %provider.id, target = %target))]
    pub async fn head(&self, target: &Url, provider: &RelayProvider) -> Result<StatusCode, RelayError> {
        let endpoint = provider
            .endpoint_for(target)
            .map_err(|e| RelayError::Transport(format!("invalid relay endpoint: {e}")))?;

        let response = self
            .http
            .head(endpoint)
            .send()
            .await
            .map_err(RelayError::from_reqwest_error)?;

        Ok(response.status())
    }
}

fn unwrap_json_envelope(body: &[u8], field: &str) -> Result<String, RelayError> {
    let envelope: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| RelayError::Decode(format!("envelope is not JSON: {e}")))?;

    envelope
        .get(field)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RelayError::Decode(format!("envelope has no string field `{field}`")))
}
