use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;
use utoipa::ToSchema;

use crate::relay::{client::RelayClient, provider::RelayProvider, timeout::TimeoutGuard};

/// Advisory answer of a reachability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    Accessible,
    Inaccessible,
    Unknown,
}

/// Fast, best-effort check of whether a URL is reachable through a relay.
///
/// Sends one HEAD request through a single provider under its own short
/// timeout. Any failure collapses to [`Accessibility::Unknown`]; nothing is
/// ever propagated to the caller.
#[derive(Debug, Clone)]
pub struct AccessibilityProbe {
    client: RelayClient,
    provider: Option<RelayProvider>,
    timeout: Duration,
}

impl AccessibilityProbe {
    pub fn new(client: RelayClient, provider: Option<RelayProvider>, timeout: Duration) -> Self {
        Self {
            client,
            provider,
            timeout,
        }
    }

    #[instrument(skip_all, fields(target = %target))]
    pub async fn check(&self, target: &Url) -> Accessibility {
        let Some(provider) = &self.provider else {
            debug!("No relay configured for probing");
            return Accessibility::Unknown;
        };

        match TimeoutGuard::after(self.timeout)
            .run(self.client.head(target, provider))
            .await
        {
            Ok(Ok(status)) if status.is_success() => Accessibility::Accessible,
            Ok(Ok(status)) => {
                debug!(status = %status, "Probe answered with non-success status");
                Accessibility::Inaccessible
            }
            Ok(Err(error)) => {
                debug!(kind = error.kind(), "Probe failed: {}", error);
                Accessibility::Unknown
            }
            Err(timed_out) => {
                debug!("Probe abandoned: {}", timed_out);
                Accessibility::Unknown
            }
        }
    }
}
