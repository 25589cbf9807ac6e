pub mod gemini;
pub mod openai;

use multiai_orchestrator::ProviderAdapter;
use wiremock::MockServer;

/// Answer every fixture in this suite spells out.
pub const EXPECTED_ANSWER: &str = "Paris is the capital of France.";

pub const QUESTION: &str = "What is the capital of France?";

/// Load test fixture from file
pub fn load_fixture(filename: &str) -> String {
    std::fs::read_to_string(filename)
        .unwrap_or_else(|_| panic!("Failed to load test fixture: {filename}"))
}

/// Provider configuration for cross-provider testing
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub name: &'static str,
    pub model: &'static str,
}

/// Trait for provider-specific test setup
#[async_trait::async_trait]
pub trait ProviderTestSetup {
    /// Get the provider configuration
    fn get_config() -> ProviderConfig;

    /// Create the adapter pointed at the mock server
    fn create_adapter(base_url: &str) -> Box<dyn ProviderAdapter>;

    /// Mount a streaming answer, matched on the exact request the adapter must send
    async fn mount_streaming_mocks(mock_server: &MockServer);

    /// Mount a stream that closes after its first delta, without a terminal event
    async fn mount_truncated_stream_mocks(mock_server: &MockServer);

    /// Mount a single-shot answer
    async fn mount_single_shot_mocks(mock_server: &MockServer);

    /// Mount an upstream failure with the given status and JSON error message
    async fn mount_error_mocks(mock_server: &MockServer, status: u16, message: &str);
}
