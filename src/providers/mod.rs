//! Provider implementations for different LLM services.

pub mod gemini;
pub mod openai;

// Re-export commonly used provider types
pub use gemini::{GeminiAuth, GeminiProvider};
pub use openai::OpenAIProvider;

use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Readable reason for a non-success HTTP response.
///
/// Both OpenAI and Google wrap failures as `{"error": {"message": ...}}`; anything
/// else is reported verbatim.
pub(crate) fn api_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => format!("API error ({}): {}", status.as_u16(), parsed.error.message),
        Err(_) => format!("API error ({}): {}", status.as_u16(), body.trim()),
    }
}
