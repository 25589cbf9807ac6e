//! OpenAI Responses API adapter.

pub mod client;
pub mod types;

pub use client::OpenAIProvider;
