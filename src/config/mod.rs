//! Configuration handling for the service.
//!
//! Everything is read from environment variables with development defaults.
//! `Config::from_env` validates the relay timeouts against each other so a
//! misconfigured deployment fails at startup instead of on the first request.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use crate::relay::{ChainSettings, RelayProvider};

/// Environment variable names.
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_RELAY_PROVIDERS: &str = "RELAY_PROVIDERS";
pub const ENV_RELAY_ATTEMPT_TIMEOUT_MS: &str = "RELAY_ATTEMPT_TIMEOUT_MS";
pub const ENV_RETRIEVAL_BUDGET_MS: &str = "RETRIEVAL_BUDGET_MS";
pub const ENV_PROBE_TIMEOUT_MS: &str = "PROBE_TIMEOUT_MS";
pub const ENV_RELAY_PROBE_PROVIDER: &str = "RELAY_PROBE_PROVIDER";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_RETRIEVAL_BUDGET_MS: u64 = 45_000;
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Service runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    bind_addr: String,
    relay_providers: Vec<RelayProvider>,
    probe_provider: Option<String>,
    attempt_timeout: Duration,
    retrieval_budget: Duration,
    probe_timeout: Duration,
    log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            relay_providers: RelayProvider::public_defaults(),
            probe_provider: None,
            attempt_timeout: Duration::from_millis(DEFAULT_ATTEMPT_TIMEOUT_MS),
            retrieval_budget: Duration::from_millis(DEFAULT_RETRIEVAL_BUDGET_MS),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let relay_providers = match env::var(ENV_RELAY_PROVIDERS) {
            Ok(raw) => parse_providers(&raw)?,
            Err(_) => RelayProvider::public_defaults(),
        };

        let config = Self {
            bind_addr,
            relay_providers,
            probe_provider: env::var(ENV_RELAY_PROBE_PROVIDER)
                .ok()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            attempt_timeout: millis_var(ENV_RELAY_ATTEMPT_TIMEOUT_MS, DEFAULT_ATTEMPT_TIMEOUT_MS)?,
            retrieval_budget: millis_var(ENV_RETRIEVAL_BUDGET_MS, DEFAULT_RETRIEVAL_BUDGET_MS)?,
            probe_timeout: millis_var(ENV_PROBE_TIMEOUT_MS, DEFAULT_PROBE_TIMEOUT_MS)?,
            log_format: match env::var(ENV_LOG_FORMAT) {
                Ok(raw) => raw.parse().map_err(|reason| ConfigError::InvalidValue {
                    field: ENV_LOG_FORMAT,
                    reason,
                })?,
                Err(_) => LogFormat::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Replace the relay list, e.g. to point the service at local relays.
    pub fn with_relay_providers(mut self, providers: Vec<RelayProvider>) -> Self {
        self.relay_providers = providers;
        self
    }

    pub fn with_timeouts(mut self, attempt: Duration, budget: Duration, probe: Duration) -> Self {
        self.attempt_timeout = attempt;
        self.retrieval_budget = budget;
        self.probe_timeout = probe;
        self
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// Relays in the order they are tried.
    pub fn relay_providers(&self) -> &[RelayProvider] {
        &self.relay_providers
    }

    /// The relay used by the accessibility probe, if any is configured.
    pub fn probe_provider(&self) -> Option<&RelayProvider> {
        match &self.probe_provider {
            Some(id) => self.relay_providers.iter().find(|p| &p.id == id),
            None => self.relay_providers.first(),
        }
    }

    pub fn chain_settings(&self) -> ChainSettings {
        ChainSettings {
            attempt_timeout: self.attempt_timeout,
            retrieval_budget: self.retrieval_budget,
            ..ChainSettings::default()
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            (ENV_RELAY_ATTEMPT_TIMEOUT_MS, self.attempt_timeout),
            (ENV_RETRIEVAL_BUDGET_MS, self.retrieval_budget),
            (ENV_PROBE_TIMEOUT_MS, self.probe_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        if self.attempt_timeout >= self.retrieval_budget {
            return Err(ConfigError::InvalidValue {
                field: ENV_RELAY_ATTEMPT_TIMEOUT_MS,
                reason: format!("must be less than {ENV_RETRIEVAL_BUDGET_MS}"),
            });
        }
        if self.probe_timeout >= self.attempt_timeout {
            return Err(ConfigError::InvalidValue {
                field: ENV_PROBE_TIMEOUT_MS,
                reason: format!("must be less than {ENV_RELAY_ATTEMPT_TIMEOUT_MS}"),
            });
        }

        for provider in &self.relay_providers {
            if !provider.has_placeholder() {
                return Err(ConfigError::InvalidValue {
                    field: ENV_RELAY_PROVIDERS,
                    reason: format!("provider '{}' has no {{url}} placeholder", provider.id),
                });
            }
        }

        if let Some(id) = &self.probe_provider
            && !self.relay_providers.iter().any(|p| &p.id == id)
        {
            return Err(ConfigError::InvalidValue {
                field: ENV_RELAY_PROBE_PROVIDER,
                reason: format!("no configured provider named '{id}'"),
            });
        }

        Ok(())
    }
}

fn parse_providers(raw: &str) -> Result<Vec<RelayProvider>, ConfigError> {
    serde_json::from_str(raw).map_err(|e| ConfigError::InvalidValue {
        field: ENV_RELAY_PROVIDERS,
        reason: e.to_string(),
    })
}

fn millis_var(field: &'static str, default: u64) -> Result<Duration, ConfigError> {
    let Ok(raw) = env::var(field) else {
        return Ok(Duration::from_millis(default));
    };

    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::InvalidValue {
            field,
            reason: e.to_string(),
        })
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
