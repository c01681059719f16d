pub mod document;
pub mod locator;
pub mod metadata;
pub mod model;
pub mod progress;
pub mod synthesizer;

#[cfg(test)]
mod tests;

pub use document::{ParseError, ParsedDocument};
pub use locator::{ContentCandidate, ContentLocator, ContentRule, NoContentFound};
pub use model::{ArticleRecord, DegradeCause, ExtractionStatus, TagSet};
pub use progress::{Checkpoint, LogProgress, ProgressObserver};
pub use synthesizer::CallerOverrides;

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::{
    config::Config,
    relay::{Accessibility, AccessibilityProbe, MarkupSource, RelayChain, RelayClient},
};

/// Errors that reach the caller. Everything past URL validation degrades
/// into a placeholder [`ArticleRecord`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
}

/// One extraction request as submitted by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractRequest {
    pub url: String,
    pub title: Option<String>,
    /// Comma-delimited tag list.
    pub tags: Option<String>,
    /// Run the accessibility probe before retrieval.
    pub probe: bool,
}

impl ExtractRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn with_probe(mut self, probe: bool) -> Self {
        self.probe = probe;
        self
    }
}

/// Absolute http(s) URL with a host, or the reason it is not one.
pub fn validate_url(raw: &str) -> Result<Url, ExtractError> {
    let url = Url::parse(raw.trim())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ExtractError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ExtractError::MissingHost);
    }

    Ok(url)
}

/// Turns a URL into an [`ArticleRecord`], always.
///
/// Retrieval goes through the configured [`MarkupSource`]; parsing, content
/// location and metadata extraction run on the returned markup. When any of
/// those stages come up empty the record carries an explanatory placeholder
/// and a [`ExtractionStatus::Degraded`] status.
#[derive(Clone)]
pub struct ArticleExtractor {
    source: Arc<dyn MarkupSource>,
    probe: AccessibilityProbe,
    locator: ContentLocator,
}

impl ArticleExtractor {
    pub fn new(source: Arc<dyn MarkupSource>, probe: AccessibilityProbe) -> Self {
        Self {
            source,
            probe,
            locator: ContentLocator::default(),
        }
    }

    /// Relay chain and probe built from `config`, sharing one HTTP client.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = RelayClient::new()?;
        let chain = RelayChain::new(
            client.clone(),
            config.relay_providers().to_vec(),
            config.chain_settings(),
        );
        let probe = AccessibilityProbe::new(
            client,
            config.probe_provider().cloned(),
            config.probe_timeout(),
        );

        Ok(Self::new(Arc::new(chain), probe))
    }

    pub fn with_locator(mut self, locator: ContentLocator) -> Self {
        self.locator = locator;
        self
    }

    pub async fn extract(&self, request: &ExtractRequest) -> Result<ArticleRecord, ExtractError> {
        self.extract_with_progress(request, None).await
    }

    #[instrument(
        skip_all,
        fields(extraction_id = %Uuid::new_v4(), url = %request.url)
    )]
    pub async fn extract_with_progress(
        &self,
        request: &ExtractRequest,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<ArticleRecord, ExtractError> {
        let target = validate_url(&request.url)?;
        let source_url = request.url.trim();
        let overrides = CallerOverrides::new(request.title.as_deref(), request.tags.as_deref());
        let report = |checkpoint: Checkpoint| {
            if let Some(observer) = observer {
                observer.on_checkpoint(checkpoint);
            }
        };

        if request.probe {
            report(Checkpoint::Probing);
            let accessibility = self.probe.check(&target).await;
            info!(accessibility = ?accessibility, "Accessibility probe finished");
        }

        report(Checkpoint::Retrieving);
        let markup = match self.source.retrieve(&target).await {
            Ok(markup) => markup,
            Err(error) => {
                warn!(attempts = error.attempts().len(), "Retrieval failed: {}", error);
                report(Checkpoint::Synthesizing);
                return Ok(synthesizer::synthesize_degraded(
                    DegradeCause::RelaysExhausted,
                    None,
                    &target,
                    source_url,
                    &overrides,
                ));
            }
        };

        report(Checkpoint::Parsing);
        let record = self.build_record(&markup, &target, source_url, &overrides, &report);
        info!(
            degraded = record.is_degraded(),
            words = record.word_count,
            "Extraction finished"
        );
        Ok(record)
    }

    /// Probe `raw_url` without extracting it.
    pub async fn probe(&self, raw_url: &str) -> Result<Accessibility, ExtractError> {
        let target = validate_url(raw_url)?;
        Ok(self.probe.check(&target).await)
    }

    // Synchronous on purpose: the parsed tree is not `Send` and must not live
    // across an await point.
    fn build_record(
        &self,
        markup: &str,
        target: &Url,
        source_url: &str,
        overrides: &CallerOverrides,
        report: &dyn Fn(Checkpoint),
    ) -> ArticleRecord {
        let document = match ParsedDocument::parse(markup) {
            Ok(document) => document,
            Err(error) => {
                warn!("Markup could not be parsed: {}", error);
                report(Checkpoint::Synthesizing);
                return synthesizer::synthesize_degraded(
                    DegradeCause::UnparsableMarkup,
                    None,
                    target,
                    source_url,
                    overrides,
                );
            }
        };

        match self.locator.locate(&document) {
            Ok(candidate) => {
                info!(
                    origin = ?candidate.origin,
                    chars = candidate.length,
                    "Main content located"
                );
                report(Checkpoint::Synthesizing);
                synthesizer::synthesize_located(
                    candidate.text,
                    &document,
                    target,
                    source_url,
                    overrides,
                )
            }
            Err(NoContentFound) => {
                warn!("No main content found");
                report(Checkpoint::Synthesizing);
                synthesizer::synthesize_degraded(
                    DegradeCause::NoContentFound,
                    Some(&document),
                    target,
                    source_url,
                    overrides,
                )
            }
        }
    }
}
