use multiai_orchestrator::{
    Message, Orchestrator, ProviderAdapter, ProviderId, RunEvent, RunRequest,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

use super::providers::{
    gemini::GeminiTestSetup, openai::OpenAITestSetup, ProviderTestSetup, EXPECTED_ANSWER,
    QUESTION,
};

/// Run the streaming e2e test for a specific provider
async fn run_streaming_test<T: ProviderTestSetup>() {
    let config = T::get_config();
    println!("Testing {} streaming with model {}", config.name, config.model);

    let mock_server = MockServer::start().await;
    T::mount_streaming_mocks(&mock_server).await;
    let adapter = T::create_adapter(&mock_server.uri());
    assert!(adapter.is_configured());

    let mut fragments: Vec<String> = Vec::new();
    let mut on_fragment = |fragment: &str| fragments.push(fragment.to_string());
    let content = adapter
        .respond_streaming(&[Message::user(QUESTION)], &mut on_fragment)
        .await
        .expect("streaming call should succeed");

    // Trailing newline of the last delta is trimmed away
    assert_eq!(content, EXPECTED_ANSWER);
    assert!(fragments.len() > 1, "expected several fragments");
    assert_eq!(fragments.concat(), content);
}

/// Run the single-shot e2e test for a specific provider
async fn run_single_shot_test<T: ProviderTestSetup>() {
    let mock_server = MockServer::start().await;
    T::mount_single_shot_mocks(&mock_server).await;
    let adapter = T::create_adapter(&mock_server.uri());

    let content = adapter
        .respond(&[Message::user(QUESTION)])
        .await
        .expect("single-shot call should succeed");
    assert_eq!(content, EXPECTED_ANSWER);
}

/// Run the upstream failure test for a specific provider
async fn run_upstream_error_test<T: ProviderTestSetup>() {
    let config = T::get_config();
    let mock_server = MockServer::start().await;
    T::mount_error_mocks(&mock_server, 429, "Quota exceeded").await;
    let adapter = T::create_adapter(&mock_server.uri());

    let error = adapter
        .respond(&[Message::user(QUESTION)])
        .await
        .expect_err("429 should fail");
    assert_eq!(
        error.to_string(),
        format!("{} error: API error (429): Quota exceeded", config.name)
    );

    let mut fragments = 0usize;
    let mut on_fragment = |_: &str| fragments += 1;
    let error = adapter
        .respond_streaming(&[Message::user(QUESTION)], &mut on_fragment)
        .await
        .expect_err("429 should fail");
    assert_eq!(error.kind(), "upstream");
    assert_eq!(fragments, 0);
}

/// Run the truncated-stream test for a specific provider
async fn run_truncated_stream_test<T: ProviderTestSetup>() {
    let mock_server = MockServer::start().await;
    T::mount_truncated_stream_mocks(&mock_server).await;
    let adapter = T::create_adapter(&mock_server.uri());

    let mut fragments: Vec<String> = Vec::new();
    let mut on_fragment = |fragment: &str| fragments.push(fragment.to_string());
    let error = adapter
        .respond_streaming(&[Message::user(QUESTION)], &mut on_fragment)
        .await
        .expect_err("a stream without its terminal event is not an answer");

    assert_eq!(error.kind(), "upstream");
    assert!(error.to_string().contains("stream ended before completion"));
    assert_eq!(fragments, vec!["Paris is"]);
}

#[tokio::test]
async fn test_openai_streaming() {
    run_streaming_test::<OpenAITestSetup>().await;
}

#[tokio::test]
async fn test_gemini_streaming() {
    run_streaming_test::<GeminiTestSetup>().await;
}

#[tokio::test]
async fn test_openai_truncated_stream() {
    run_truncated_stream_test::<OpenAITestSetup>().await;
}

#[tokio::test]
async fn test_gemini_truncated_stream() {
    run_truncated_stream_test::<GeminiTestSetup>().await;
}

#[tokio::test]
async fn test_openai_single_shot() {
    run_single_shot_test::<OpenAITestSetup>().await;
}

#[tokio::test]
async fn test_gemini_single_shot() {
    run_single_shot_test::<GeminiTestSetup>().await;
}

#[tokio::test]
async fn test_openai_upstream_error() {
    run_upstream_error_test::<OpenAITestSetup>().await;
}

#[tokio::test]
async fn test_gemini_upstream_error() {
    run_upstream_error_test::<GeminiTestSetup>().await;
}

#[tokio::test]
async fn test_realtime_run_across_both_providers() {
    let openai_server = MockServer::start().await;
    let gemini_server = MockServer::start().await;
    OpenAITestSetup::mount_streaming_mocks(&openai_server).await;
    GeminiTestSetup::mount_streaming_mocks(&gemini_server).await;

    let mut orchestrator = Orchestrator::new(Duration::from_secs(10));
    orchestrator
        .register_arc(Arc::from(OpenAITestSetup::create_adapter(&openai_server.uri())))
        .register_arc(Arc::from(GeminiTestSetup::create_adapter(&gemini_server.uri())));

    let events = orchestrator
        .run_realtime(RunRequest::new(QUESTION))
        .expect("run should start")
        .collect_all()
        .await;

    assert_eq!(
        events.first(),
        Some(&RunEvent::UserEcho {
            content: QUESTION.to_string()
        })
    );
    assert_eq!(events.last(), Some(&RunEvent::Done));

    for provider in [ProviderId::OpenAi, ProviderId::Gemini] {
        let streamed: String = events
            .iter()
            .filter_map(|event| match event {
                RunEvent::Fragment { provider: p, text } if *p == provider => Some(text.as_str()),
                _ => None,
            })
            .collect();
        let completion = events
            .iter()
            .find_map(|event| match event {
                RunEvent::Completion(outcome) if outcome.provider == provider => Some(outcome),
                _ => None,
            })
            .expect("every provider completes");

        assert_eq!(completion.content(), Some(EXPECTED_ANSWER));
        assert_eq!(streamed, EXPECTED_ANSWER);
    }
}

#[tokio::test]
async fn test_batch_run_with_one_failing_provider() {
    let openai_server = MockServer::start().await;
    let gemini_server = MockServer::start().await;
    OpenAITestSetup::mount_error_mocks(&openai_server, 401, "Incorrect API key provided").await;
    GeminiTestSetup::mount_single_shot_mocks(&gemini_server).await;

    let mut orchestrator = Orchestrator::new(Duration::from_secs(10));
    orchestrator
        .register_arc(Arc::from(OpenAITestSetup::create_adapter(&openai_server.uri())))
        .register_arc(Arc::from(GeminiTestSetup::create_adapter(&gemini_server.uri())));

    let result = orchestrator
        .run_batch(RunRequest::new(QUESTION))
        .await
        .expect("batch should not fail");

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["userMessage"]["content"], QUESTION);
    assert_eq!(json["responses"][0]["provider"], "openai");
    assert_eq!(
        json["responses"][0]["error"],
        "OpenAI error: API error (401): Incorrect API key provided"
    );
    assert!(json["responses"][0]["content"].is_null());
    assert_eq!(json["responses"][1]["provider"], "gemini");
    assert_eq!(json["responses"][1]["content"], EXPECTED_ANSWER);
}
