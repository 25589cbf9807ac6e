use std::time::Duration;

use thiserror::Error;

use crate::ProviderId;

/// Errors that can occur when configuring or driving the orchestrator.
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Streaming error: {0}")]
    Streaming(String),

    #[error("No provider adapter is registered for the requested selection")]
    NoProviders,
}

impl Error {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth(message.into())
    }

    pub fn streaming(message: impl Into<String>) -> Self {
        Error::Streaming(message.into())
    }
}

/// Failure of a single provider within a run.
///
/// These never abort a run. They become the `error` half of that provider's
/// [`ProviderOutcome`](crate::ProviderOutcome), and their `Display` output is the
/// human-readable string relayed to clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{} not configured", .provider.label())]
    NotConfigured { provider: ProviderId },

    #[error("{label} timeout after {timeout_ms}ms")]
    Timeout { label: String, timeout_ms: u64 },

    #[error("{} error: {message}", .provider.label())]
    Upstream {
        provider: ProviderId,
        message: String,
    },
}

impl ProviderError {
    pub fn not_configured(provider: ProviderId) -> Self {
        ProviderError::NotConfigured { provider }
    }

    pub fn timeout(label: impl Into<String>, timeout: Duration) -> Self {
        ProviderError::Timeout {
            label: label.into(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn upstream(provider: ProviderId, message: impl ToString) -> Self {
        ProviderError::Upstream {
            provider,
            message: message.to_string(),
        }
    }

    /// Wrap an adapter-internal error as an upstream failure of `provider`.
    pub fn from_error(provider: ProviderId, error: Error) -> Self {
        match error {
            Error::Provider { message, .. } => Self::upstream(provider, message),
            other => Self::upstream(provider, other),
        }
    }

    /// Short machine-friendly name of the failure class, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured { .. } => "not_configured",
            ProviderError::Timeout { .. } => "timeout",
            ProviderError::Upstream { .. } => "upstream",
        }
    }
}
