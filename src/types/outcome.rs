use std::time::Duration;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::message::Turn;
use super::provider_id::{ProviderId, ProviderSelection};
use crate::ProviderError;

/// Everything one orchestration run needs.
///
/// Constructed once per submitted user message. `timeout` is applied
/// independently to every selected provider; when unset the orchestrator's
/// default is used.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub user_message: String,
    pub history: Vec<Turn>,
    pub providers: ProviderSelection,
    pub timeout: Option<Duration>,
}

impl RunRequest {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            history: Vec::new(),
            providers: ProviderSelection::all(),
            timeout: None,
        }
    }

    pub fn history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }

    pub fn providers(mut self, providers: impl Into<ProviderSelection>) -> Self {
        self.providers = providers.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout_ms(self, timeout_ms: u64) -> Self {
        self.timeout(Duration::from_millis(timeout_ms))
    }
}

/// The single final result of one provider for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderOutcome {
    pub provider: ProviderId,
    pub result: Result<String, ProviderError>,
}

impl ProviderOutcome {
    pub fn new(provider: ProviderId, result: Result<String, ProviderError>) -> Self {
        Self { provider, result }
    }

    pub fn content(&self) -> Option<&str> {
        self.result.as_deref().ok()
    }

    pub fn error(&self) -> Option<&ProviderError> {
        self.result.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

// Wire shape is `{provider, content, error}` with exactly one of the last two non-null.
impl Serialize for ProviderOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ProviderOutcome", 3)?;
        state.serialize_field("provider", &self.provider)?;
        state.serialize_field("content", &self.content())?;
        state.serialize_field("error", &self.error().map(|e| e.to_string()))?;
        state.end()
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub user_message: String,
    pub outcomes: Vec<ProviderOutcome>,
}

impl BatchResult {
    pub fn outcome(&self, provider: ProviderId) -> Option<&ProviderOutcome> {
        self.outcomes.iter().find(|o| o.provider == provider)
    }
}

impl Serialize for BatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BatchResult", 2)?;
        state.serialize_field(
            "userMessage",
            &serde_json::json!({ "content": self.user_message }),
        )?;
        state.serialize_field("responses", &self.outcomes)?;
        state.end()
    }
}

/// One entry of a run's delivery sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Echo of the submitted user message; always first.
    UserEcho { content: String },
    /// Incremental piece of one provider's answer (realtime mode only).
    Fragment { provider: ProviderId, text: String },
    /// Final outcome of one provider; always its last event.
    Completion(ProviderOutcome),
    /// Every selected provider has completed; always last.
    Done,
}
