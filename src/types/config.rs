use std::env;
use std::time::Duration;

use crate::Error;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GOOGLE_CLOUD_REGION: &str = "europe-west1";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// OpenAI adapter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAIConfig {
    /// `None` leaves the adapter registered but unconfigured.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }
}

/// Gemini adapter settings.
///
/// An API key selects the Generative Language endpoint. Without one, a project id
/// selects Vertex AI, authenticated with `access_token` when present and with
/// Application Default Credentials otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub project_id: Option<String>,
    pub location: String,
    pub access_token: Option<String>,
    pub base_url: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            project_id: None,
            location: DEFAULT_GOOGLE_CLOUD_REGION.to_string(),
            access_token: None,
            base_url: None,
        }
    }
}

/// Everything needed to build an [`Orchestrator`](crate::Orchestrator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub openai: OpenAIConfig,
    pub gemini: GeminiConfig,
    /// Default per-provider deadline, overridable per run.
    pub timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            openai: OpenAIConfig::default(),
            gemini: GeminiConfig::default(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl OrchestratorConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let openai = OpenAIConfig {
            api_key: get("OPENAI_API_KEY"),
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
        };

        let gemini = GeminiConfig {
            api_key: get("GEMINI_API_KEY"),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            project_id: get("GOOGLE_CLOUD_PROJECT"),
            location: get("GOOGLE_CLOUD_REGION")
                .unwrap_or_else(|| DEFAULT_GOOGLE_CLOUD_REGION.to_string()),
            access_token: get("VERTEX_ACCESS_TOKEN"),
            base_url: get("GEMINI_BASE_URL"),
        };

        let timeout_ms = match get("AI_TIMEOUT_MS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => return Err(Error::config("AI_TIMEOUT_MS must be positive")),
                Ok(ms) => ms,
                Err(_) => {
                    return Err(Error::config(format!(
                        "AI_TIMEOUT_MS must be a number of milliseconds, got '{raw}'"
                    )))
                }
            },
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            openai,
            gemini,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, OrchestratorConfig::default());
        assert_eq!(config.timeout, Duration::from_millis(30_000));
        assert_eq!(config.openai.api_key, None);
        assert_eq!(config.gemini.location, "europe-west1");
    }

    #[test]
    fn test_values_are_read() {
        let config = OrchestratorConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4.1"),
            ("GOOGLE_CLOUD_PROJECT", "proj"),
            ("VERTEX_ACCESS_TOKEN", "ya29"),
            ("AI_TIMEOUT_MS", "1500"),
        ]))
        .unwrap();

        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai.model, "gpt-4.1");
        assert_eq!(config.gemini.project_id.as_deref(), Some("proj"));
        assert_eq!(config.gemini.access_token.as_deref(), Some("ya29"));
        assert_eq!(config.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_blank_key_is_unset() {
        let config =
            OrchestratorConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "   ")])).unwrap();
        assert_eq!(config.openai.api_key, None);
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(matches!(
            OrchestratorConfig::from_lookup(lookup(&[("AI_TIMEOUT_MS", "soon")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            OrchestratorConfig::from_lookup(lookup(&[("AI_TIMEOUT_MS", "0")])),
            Err(Error::Config(_))
        ));
    }
}
