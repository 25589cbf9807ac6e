//! Types for streaming responses.

use serde::{Deserialize, Serialize};

use super::message::FinishReason;

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

/// Events that can be emitted while a provider streams its answer.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A chunk of content was received.
    ContentDelta { delta: String },
    /// The stream has finished.
    Done {
        finish_reason: FinishReason,
        usage: Usage,
    },
    /// The provider reported a failure mid-stream.
    Error { error: String },
}
