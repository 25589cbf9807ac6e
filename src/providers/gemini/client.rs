use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::types::*;
use crate::provider::{FragmentSink, ProviderAdapter, MAX_OUTPUT_TOKENS, SYSTEM_INSTRUCTION};
use crate::providers::api_error_message;
use crate::sse_stream::SseStream;
use crate::{
    CompleteResponse, Error, GeminiConfig, Message, ProviderError, ProviderId, Response, Role,
    StreamEvent,
};

pub const GENERATIVE_LANGUAGE_URL: &str = "https://generativelanguage.googleapis.com";

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Authentication method for the Gemini provider.
#[derive(Clone)]
pub enum GeminiAuth {
    /// Generative Language API key (sent as `x-goog-api-key`).
    ApiKey(String),
    /// Vertex AI with a fixed access token (passed as Bearer header).
    AccessToken {
        project_id: String,
        location: String,
        token: String,
    },
    /// Vertex AI with Application Default Credentials.
    ApplicationDefault {
        project_id: String,
        location: String,
        provider: Arc<dyn gcp_auth::TokenProvider>,
    },
    /// No usable credentials.
    Missing,
}

impl fmt::Debug for GeminiAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeminiAuth::ApiKey(_) => f.write_str("ApiKey(..)"),
            GeminiAuth::AccessToken {
                project_id,
                location,
                ..
            } => write!(f, "AccessToken({project_id}, {location})"),
            GeminiAuth::ApplicationDefault {
                project_id,
                location,
                ..
            } => write!(f, "ApplicationDefault({project_id}, {location})"),
            GeminiAuth::Missing => f.write_str("Missing"),
        }
    }
}

/// Gemini provider implementation.
pub struct GeminiProvider {
    client: Client,
    auth: GeminiAuth,
    model: String,
    base_url: Option<String>,
}

impl GeminiProvider {
    /// Create a new Gemini provider with the given authentication.
    pub fn new(auth: GeminiAuth, model: impl Into<String>) -> Result<Self, Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            auth,
            model: model.into(),
            base_url: None,
        })
    }

    /// Override the endpoint host (for testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build the provider from configuration, resolving ADC when requested.
    ///
    /// ADC failures are not fatal: the adapter is built unconfigured and reports
    /// `NotConfigured` on every call.
    pub async fn from_config(config: &GeminiConfig) -> Result<Self, Error> {
        let auth = if let Some(api_key) = &config.api_key {
            GeminiAuth::ApiKey(api_key.clone())
        } else if let Some(project_id) = &config.project_id {
            match &config.access_token {
                Some(token) => GeminiAuth::AccessToken {
                    project_id: project_id.clone(),
                    location: config.location.clone(),
                    token: token.clone(),
                },
                None => match gcp_auth::provider().await {
                    Ok(provider) => GeminiAuth::ApplicationDefault {
                        project_id: project_id.clone(),
                        location: config.location.clone(),
                        provider,
                    },
                    Err(e) => {
                        tracing::warn!(
                            provider = %ProviderId::Gemini,
                            error = %e,
                            "application default credentials unavailable"
                        );
                        GeminiAuth::Missing
                    }
                },
            }
        } else {
            GeminiAuth::Missing
        };

        let provider = Self::new(auth, config.model.clone())?;
        Ok(match &config.base_url {
            Some(base_url) => provider.with_base_url(base_url.clone()),
            None => provider,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert normalized messages to Gemini format.
    fn convert_request(&self, messages: &[Message]) -> GeminiRequest {
        let contents = messages
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    Role::Assistant => "model",
                    Role::User | Role::System => "user",
                };
                GeminiContent::text(role, msg.content.clone())
            })
            .collect();

        GeminiRequest {
            contents,
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: Some(MAX_OUTPUT_TOKENS),
                thinking_config: Some(GeminiThinkingConfig { thinking_budget: 0 }),
            }),
            // System instructions are treated as user content
            system_instruction: Some(GeminiContent::text("user", SYSTEM_INSTRUCTION)),
        }
    }

    /// Get the API endpoint for the configured model.
    fn get_endpoint(&self, stream: bool) -> Result<String, Error> {
        let method = if stream {
            "streamGenerateContent"
        } else {
            "generateContent"
        };
        let sse_param = if stream { "?alt=sse" } else { "" };

        match &self.auth {
            GeminiAuth::ApiKey(_) => {
                let base_url = self.base_url.as_deref().unwrap_or(GENERATIVE_LANGUAGE_URL);
                Ok(format!(
                    "{}/v1beta/models/{}:{}{}",
                    base_url.trim_end_matches('/'),
                    self.model,
                    method,
                    sse_param
                ))
            }
            GeminiAuth::AccessToken {
                project_id,
                location,
                ..
            }
            | GeminiAuth::ApplicationDefault {
                project_id,
                location,
                ..
            } => {
                let base_url = match &self.base_url {
                    Some(base_url) => base_url.trim_end_matches('/').to_string(),
                    None => format!("https://{location}-aiplatform.googleapis.com"),
                };
                Ok(format!(
                    "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:{}{}",
                    base_url, project_id, location, self.model, method, sse_param
                ))
            }
            GeminiAuth::Missing => Err(Error::config("Gemini credentials are not set")),
        }
    }

    /// Add authentication based on the method.
    async fn authorize(&self, request_builder: RequestBuilder) -> Result<RequestBuilder, Error> {
        match &self.auth {
            GeminiAuth::ApiKey(key) => Ok(request_builder.header("x-goog-api-key", key)),
            GeminiAuth::AccessToken { token, .. } => {
                Ok(request_builder.header("Authorization", format!("Bearer {token}")))
            }
            GeminiAuth::ApplicationDefault { provider, .. } => {
                let token = provider
                    .token(&[CLOUD_PLATFORM_SCOPE])
                    .await
                    .map_err(|e| Error::auth(format!("Failed to get ADC token: {e}")))?;
                Ok(request_builder.header("Authorization", format!("Bearer {}", token.as_str())))
            }
            GeminiAuth::Missing => Err(Error::config("Gemini credentials are not set")),
        }
    }

    async fn send(&self, messages: &[Message], stream: bool) -> Result<reqwest::Response, Error> {
        let endpoint = self.get_endpoint(stream)?;
        let request_builder = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&self.convert_request(messages));

        let response = self.authorize(request_builder).await?.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(Error::provider(
                "Gemini",
                api_error_message(status, &error_text),
            ));
        }

        Ok(response)
    }

    /// Single-shot generation.
    pub async fn complete(&self, messages: &[Message]) -> Result<CompleteResponse, Error> {
        let body: GeminiResponse = self.send(messages, false).await?.json().await?;

        if let Some(reason) = body.block_reason() {
            return Err(Error::provider("Gemini", format!("prompt blocked: {reason}")));
        }

        Ok(CompleteResponse {
            content: body.text().trim().to_string(),
            finish_reason: body.finish_reason().unwrap_or(crate::FinishReason::Stop),
            usage: body.usage(),
        })
    }

    /// Streaming generation.
    pub async fn generate(&self, messages: &[Message]) -> Result<Response, Error> {
        let response = self.send(messages, true).await?;

        let event_stream = SseStream::new(response.bytes_stream())
            .map(|sse_result| match sse_result {
                Ok(sse_event) => {
                    let data = sse_event.data.trim();

                    // Skip [DONE] events and empty events
                    if data == "[DONE]" || data.is_empty() {
                        return vec![];
                    }

                    match serde_json::from_str::<GeminiResponse>(data) {
                        Ok(gemini_response) => Self::convert_response(gemini_response)
                            .into_iter()
                            .map(Ok)
                            .collect(),
                        Err(e) => vec![Err(Error::provider(
                            "Gemini",
                            format!("Failed to parse SSE event: {e}"),
                        ))],
                    }
                }
                Err(e) => vec![Err(e)],
            })
            .flat_map(futures_util::stream::iter);

        Ok(Response::from_stream(event_stream))
    }

    /// Convert one streamed response chunk into stream events.
    fn convert_response(response: GeminiResponse) -> Vec<StreamEvent> {
        if let Some(reason) = response.block_reason() {
            return vec![StreamEvent::Error {
                error: format!("prompt blocked: {reason}"),
            }];
        }

        let mut events = Vec::new();
        let text = response.text();
        if !text.is_empty() {
            events.push(StreamEvent::ContentDelta { delta: text });
        }

        // Only a chunk carrying a finish reason ends the stream
        if let Some(finish_reason) = response.finish_reason() {
            events.push(StreamEvent::Done {
                finish_reason,
                usage: response.usage(),
            });
        }

        events
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for GeminiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn is_configured(&self) -> bool {
        !matches!(self.auth, GeminiAuth::Missing)
    }

    async fn respond(&self, messages: &[Message]) -> Result<String, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::not_configured(self.id()));
        }

        self.complete(messages)
            .await
            .map(|complete| complete.content)
            .map_err(|e| ProviderError::from_error(self.id(), e))
    }

    async fn respond_streaming(
        &self,
        messages: &[Message],
        on_fragment: FragmentSink<'_>,
    ) -> Result<String, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::not_configured(self.id()));
        }

        let response = self
            .generate(messages)
            .await
            .map_err(|e| ProviderError::from_error(self.id(), e))?;
        response
            .for_each_fragment(|fragment| on_fragment(fragment))
            .await
            .map(|complete| complete.content)
            .map_err(|e| ProviderError::from_error(self.id(), e))
    }
}
