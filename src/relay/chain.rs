use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::relay::{
    client::RelayClient,
    errors::{AttemptFailure, RelayError, RetrievalError},
    provider::RelayProvider,
    timeout::TimeoutGuard,
};

/// Markup shorter than this is treated as a failed attempt.
pub const MIN_MARKUP_CHARS: usize = 100;

/// Anything that can turn a target URL into page markup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarkupSource: Send + Sync {
    async fn retrieve(&self, target: &Url) -> Result<String, RetrievalError>;
}

#[derive(Debug, Clone)]
pub struct ChainSettings {
    /// Deadline for one provider.
    pub attempt_timeout: Duration,
    /// Deadline for the whole chain; caps every attempt.
    pub retrieval_budget: Duration,
    pub min_markup_chars: usize,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(10),
            retrieval_budget: Duration::from_secs(45),
            min_markup_chars: MIN_MARKUP_CHARS,
        }
    }
}

/// Tries relay providers one after another, in configured order.
///
/// Attempts are strictly sequential: the first provider that returns enough
/// markup wins and no later provider is contacted.
#[derive(Debug, Clone)]
pub struct RelayChain {
    client: RelayClient,
    providers: Vec<RelayProvider>,
    settings: ChainSettings,
}

impl RelayChain {
    pub fn new(client: RelayClient, providers: Vec<RelayProvider>, settings: ChainSettings) -> Self {
        Self {
            client,
            providers,
            settings,
        }
    }

    async fn attempt(
        &self,
        target: &Url,
        provider: &RelayProvider,
        budget: Instant,
    ) -> Result<String, RelayError> {
        let guard = TimeoutGuard::after(self.settings.attempt_timeout).capped_at(budget);
        if guard.is_expired() {
            return Err(RelayError::TimedOut);
        }

        let markup = guard.run(self.client.fetch(target, provider)).await??;

        let length = markup.chars().count();
        if length < self.settings.min_markup_chars {
            return Err(RelayError::InsufficientMarkup { length });
        }

        Ok(markup)
    }
}

#[async_trait]
impl MarkupSource for RelayChain {
    #[instrument(skip_all, fields(target = %target, providers = self.providers.len()))]
    async fn retrieve(&self, target: &Url) -> Result<String, RetrievalError> {
        let budget = TimeoutGuard::after(self.settings.retrieval_budget).deadline();
        let mut attempts = Vec::with_capacity(self.providers.len());

        for (index, provider) in self.providers.iter().enumerate() {
            debug!(
                "Trying relay {}/{}: {}",
                index + 1,
                self.providers.len(),
                provider.id
            );

            let started_at = Utc::now();
            let started = Instant::now();

            match self.attempt(target, provider, budget).await {
                Ok(markup) => {
                    info!(
                        provider = %provider.id,
                        chars = markup.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Relay retrieval succeeded"
                    );
                    return Ok(markup);
                }
                Err(error) => {
                    warn!(
                        provider = %provider.id,
                        kind = error.kind(),
                        "Relay attempt failed: {}",
                        error
                    );
                    attempts.push(AttemptFailure {
                        provider: provider.id.clone(),
                        started_at,
                        elapsed: started.elapsed(),
                        error,
                    });
                }
            }
        }

        warn!(attempts = attempts.len(), "All relay providers exhausted");
        Err(RetrievalError::AllProvidersExhausted { attempts })
    }
}
