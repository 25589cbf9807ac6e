//! Google Gemini adapter (Generative Language API or Vertex AI).

pub mod client;
pub mod types;

pub use client::{GeminiAuth, GeminiProvider};
