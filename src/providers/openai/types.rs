use crate::types::Usage;
use serde::{Deserialize, Serialize};

/// OpenAI input message format for Responses API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum OpenAIInputMessage {
    #[serde(rename = "message")]
    Regular { role: String, content: String },
}

/// OpenAI Responses API request.
#[derive(Debug, Clone, Serialize)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: Vec<OpenAIInputMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<bool>,
}

/// OpenAI Responses API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub output: Vec<ResponseOutput>,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default)]
    pub error: Option<ErrorDetails>,
}

impl ResponsesResponse {
    /// Concatenated `output_text` parts of every message output item.
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.r#type == "message")
            .flat_map(|item| item.content.iter().flatten())
            .filter(|part| part.r#type == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

/// Output item in a Responses API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseOutput {
    pub r#type: String, // "message", "reasoning", ...
    #[serde(default)]
    pub content: Option<Vec<ResponseContent>>,
}

/// Content item in a Responses API output.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseContent {
    pub r#type: String, // "output_text", "refusal", ...
    #[serde(default)]
    pub text: Option<String>,
}

/// Error details from OpenAI API.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetails {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// OpenAI streaming Responses API event.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsesStreamEvent {
    pub r#type: String,
    #[serde(default)]
    pub delta: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub response: Option<ResponsesResponse>,
}
