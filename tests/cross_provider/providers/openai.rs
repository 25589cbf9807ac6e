use super::{load_fixture, ProviderConfig, ProviderTestSetup, QUESTION};
use multiai_orchestrator::provider::SYSTEM_INSTRUCTION;
use multiai_orchestrator::{OpenAIProvider, ProviderAdapter};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct OpenAITestSetup;

fn expected_payload(stream: bool) -> serde_json::Value {
    json!({
        "model": "gpt-4o-mini",
        "input": [
            {
                "type": "message",
                "role": "system",
                "content": SYSTEM_INSTRUCTION
            },
            {
                "type": "message",
                "role": "user",
                "content": QUESTION
            }
        ],
        "max_output_tokens": 1024,
        "stream": stream,
        "store": false
    })
}

#[async_trait::async_trait]
impl ProviderTestSetup for OpenAITestSetup {
    fn get_config() -> ProviderConfig {
        ProviderConfig {
            name: "OpenAI",
            model: "gpt-4o-mini",
        }
    }

    fn create_adapter(base_url: &str) -> Box<dyn ProviderAdapter> {
        let provider = OpenAIProvider::new_with_base_url(
            Some("test-api-key".to_string()),
            Self::get_config().model,
            base_url.to_string(),
        )
        .expect("Failed to create OpenAI provider");
        Box::new(provider)
    }

    async fn mount_streaming_mocks(mock_server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(header("authorization", "Bearer test-api-key"))
            .and(body_partial_json(expected_payload(true)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(load_fixture(
                        "tests/cross_provider/fixtures/openai/streaming_response.sse",
                    ))
                    .insert_header("content-type", "text/event-stream")
                    .insert_header("cache-control", "no-cache"),
            )
            .expect(1)
            .mount(mock_server)
            .await;
    }

    async fn mount_truncated_stream_mocks(mock_server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(load_fixture(
                        "tests/cross_provider/fixtures/openai/truncated_response.sse",
                    ))
                    .insert_header("content-type", "text/event-stream"),
            )
            .expect(1)
            .mount(mock_server)
            .await;
    }

    async fn mount_single_shot_mocks(mock_server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(body_partial_json(expected_payload(false)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(load_fixture(
                        "tests/cross_provider/fixtures/openai/single_response.json",
                    ))
                    .insert_header("content-type", "application/json"),
            )
            .expect(1)
            .mount(mock_server)
            .await;
    }

    async fn mount_error_mocks(mock_server: &MockServer, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {
                    "message": message,
                    "type": "invalid_request_error",
                    "code": null
                }
            })))
            .mount(mock_server)
            .await;
    }
}
