use super::types::{OpenAIInputMessage, ResponsesRequest, ResponsesResponse, ResponsesStreamEvent};
use crate::provider::{FragmentSink, ProviderAdapter, MAX_OUTPUT_TOKENS, SYSTEM_INSTRUCTION};
use crate::providers::api_error_message;
use crate::sse_stream::SseStreamExt;
use crate::{
    CompleteResponse, Error, FinishReason, Message, OpenAIConfig, ProviderError, ProviderId,
    Response, StreamEvent,
};
use futures_util::StreamExt;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI provider implementation.
pub struct OpenAIProvider {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider. A missing key yields an unconfigured adapter.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Result<Self, Error> {
        Self::new_with_base_url(api_key, model, DEFAULT_BASE_URL.to_string())
    }

    /// Create a new OpenAI provider with custom base URL.
    pub fn new_with_base_url(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: String,
    ) -> Result<Self, Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &OpenAIConfig) -> Result<Self, Error> {
        Self::new_with_base_url(
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.clone(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build a Responses API request with the system instruction first.
    fn convert_request(&self, messages: &[Message], stream: bool) -> ResponsesRequest {
        let input = std::iter::once(Message::system(SYSTEM_INSTRUCTION))
            .chain(messages.iter().cloned())
            .map(|msg| OpenAIInputMessage::Regular {
                role: msg.role.as_str().to_string(),
                content: msg.content,
            })
            .collect();

        ResponsesRequest {
            model: self.model.clone(),
            input,
            max_output_tokens: Some(MAX_OUTPUT_TOKENS),
            stream: Some(stream),
            store: Some(false),
        }
    }

    /// Convert an OpenAI streaming event to our StreamEvent, if it carries one.
    fn convert_stream_event(event: ResponsesStreamEvent) -> Option<StreamEvent> {
        match event.r#type.as_str() {
            "response.output_text.delta" => event
                .delta
                .filter(|delta| !delta.is_empty())
                .map(|delta| StreamEvent::ContentDelta { delta }),
            "response.completed" | "response.incomplete" => {
                let finish_reason = if event.r#type == "response.completed" {
                    FinishReason::Stop
                } else {
                    FinishReason::Length
                };
                let usage = event
                    .response
                    .and_then(|response| response.usage)
                    .unwrap_or_default();
                Some(StreamEvent::Done {
                    finish_reason,
                    usage,
                })
            }
            "response.failed" => {
                let error = event
                    .response
                    .and_then(|response| response.error)
                    .map(|details| details.message)
                    .unwrap_or_else(|| "response failed".to_string());
                Some(StreamEvent::Error { error })
            }
            "error" => Some(StreamEvent::Error {
                error: event.message.unwrap_or_else(|| "stream error".to_string()),
            }),
            _ => None,
        }
    }

    async fn send(&self, request: &ResponsesRequest) -> Result<reqwest::Response, Error> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::config("OPENAI_API_KEY is not set"))?;

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(Error::provider(
                "OpenAI",
                api_error_message(status, &error_text),
            ));
        }

        Ok(response)
    }

    /// Single-shot generation.
    pub async fn complete(&self, messages: &[Message]) -> Result<CompleteResponse, Error> {
        let request = self.convert_request(messages, false);
        let body: ResponsesResponse = self.send(&request).await?.json().await?;

        if let Some(error) = &body.error {
            return Err(Error::provider("OpenAI", error.message.clone()));
        }

        let finish_reason = match body.status.as_deref() {
            Some("incomplete") => FinishReason::Length,
            _ => FinishReason::Stop,
        };
        Ok(CompleteResponse {
            content: body.output_text().trim().to_string(),
            finish_reason,
            usage: body.usage.clone().unwrap_or_default(),
        })
    }

    /// Streaming generation.
    pub async fn generate(&self, messages: &[Message]) -> Result<Response, Error> {
        let request = self.convert_request(messages, true);
        let response = self.send(&request).await?;

        let event_stream = response
            .bytes_stream()
            .sse_events()
            .filter_map(|sse_result| async move {
                match sse_result {
                    Ok(sse_event) => {
                        if sse_event.is_done() {
                            return None;
                        }
                        // Skip unparseable events (comments, keep-alives)
                        serde_json::from_str::<ResponsesStreamEvent>(&sse_event.data)
                            .ok()
                            .and_then(OpenAIProvider::convert_stream_event)
                            .map(Ok)
                    }
                    Err(e) => Some(Err(e)),
                }
            });

        Ok(Response::from_stream(event_stream))
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for OpenAIProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
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
