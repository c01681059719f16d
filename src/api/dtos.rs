use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{extractor::ExtractRequest, relay::Accessibility};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtractArticleRequest {
    /// Absolute http(s) URL of the page.
    pub url: String,
    /// Replaces the extracted title when not blank.
    pub title: Option<String>,
    /// Comma-delimited tags added after the extracted ones.
    pub tags: Option<String>,
    /// Run the accessibility probe before retrieval.
    #[serde(default)]
    pub probe: bool,
}

impl From<ExtractArticleRequest> for ExtractRequest {
    fn from(payload: ExtractArticleRequest) -> Self {
        Self {
            url: payload.url,
            title: payload.title,
            tags: payload.tags,
            probe: payload.probe,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProbeRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProbeResponse {
    pub url: String,
    pub accessibility: Accessibility,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
