//! Concurrent multi-provider response orchestration.
//!
//! This library sends one chat message, together with its conversation history, to
//! several LLM providers (OpenAI and Google Gemini) at once, guards each call with its
//! own deadline, and reports every provider's answer independently: all together
//! (batch), each as soon as it is complete, or fragment by fragment as it is generated.

pub mod accumulator;
pub mod conversation;
pub mod error;
pub mod factory;
pub mod history;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod relay;
pub mod response;
pub mod sse_stream;
pub mod timeout;
pub mod types;

// Re-export core types for easy usage
pub use accumulator::*;
pub use error::{Error, ProviderError};
pub use factory::ProviderFactory;
pub use history::{HistorySource, InMemoryHistory, HISTORY_LIMIT};
pub use orchestrator::{Orchestrator, RunEvents};
pub use provider::{FragmentSink, ProviderAdapter};
pub use providers::*;
pub use response::*;
pub use sse_stream::SseEvent;
pub use types::*;
