use super::{load_fixture, ProviderConfig, ProviderTestSetup, QUESTION};
use multiai_orchestrator::provider::SYSTEM_INSTRUCTION;
use multiai_orchestrator::{GeminiAuth, GeminiProvider, ProviderAdapter};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct GeminiTestSetup;

fn expected_payload() -> serde_json::Value {
    json!({
        "contents": [
            {
                "role": "user",
                "parts": [{"text": QUESTION}]
            }
        ],
        "system_instruction": {
            "parts": [{"text": SYSTEM_INSTRUCTION}]
        },
        "generation_config": {
            "max_output_tokens": 1024,
            "thinking_config": {"thinking_budget": 0}
        }
    })
}

#[async_trait::async_trait]
impl ProviderTestSetup for GeminiTestSetup {
    fn get_config() -> ProviderConfig {
        ProviderConfig {
            name: "Gemini",
            model: "gemini-3-flash-preview",
        }
    }

    fn create_adapter(base_url: &str) -> Box<dyn ProviderAdapter> {
        let provider = GeminiProvider::new(
            GeminiAuth::ApiKey("test-api-key".to_string()),
            Self::get_config().model,
        )
        .expect("Failed to create Gemini provider")
        .with_base_url(base_url);
        Box::new(provider)
    }

    async fn mount_streaming_mocks(mock_server: &MockServer) {
        Mock::given(method("POST"))
            .and(path(
                "/v1beta/models/gemini-3-flash-preview:streamGenerateContent",
            ))
            .and(query_param("alt", "sse"))
            .and(header("x-goog-api-key", "test-api-key"))
            .and(body_partial_json(expected_payload()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(load_fixture(
                        "tests/cross_provider/fixtures/gemini/streaming_response.sse",
                    ))
                    .insert_header("content-type", "text/event-stream"),
            )
            .expect(1)
            .mount(mock_server)
            .await;
    }

    async fn mount_truncated_stream_mocks(mock_server: &MockServer) {
        Mock::given(method("POST"))
            .and(path(
                "/v1beta/models/gemini-3-flash-preview:streamGenerateContent",
            ))
            .and(query_param("alt", "sse"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(load_fixture(
                        "tests/cross_provider/fixtures/gemini/truncated_response.sse",
                    ))
                    .insert_header("content-type", "text/event-stream"),
            )
            .expect(1)
            .mount(mock_server)
            .await;
    }

    async fn mount_single_shot_mocks(mock_server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-3-flash-preview:generateContent"))
            .and(body_partial_json(expected_payload()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(load_fixture(
                        "tests/cross_provider/fixtures/gemini/single_response.json",
                    ))
                    .insert_header("content-type", "application/json"),
            )
            .expect(1)
            .mount(mock_server)
            .await;
    }

    async fn mount_error_mocks(mock_server: &MockServer, status: u16, message: &str) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {
                    "code": status,
                    "message": message,
                    "status": "RESOURCE_EXHAUSTED"
                }
            })))
            .mount(mock_server)
            .await;
    }
}
