//! Delta accumulation logic for streaming responses.

use crate::types::{FinishReason, StreamEvent, Usage};
use crate::{CompleteResponse, Error};

/// Accumulates streaming deltas into a complete, trimmed response.
///
/// Trimming happens on the fly so that the fragments handed back by
/// [`process_event`](Self::process_event) concatenate to exactly the final
/// content: whitespace before the first visible character is dropped, and
/// trailing whitespace is held back until more text arrives.
#[derive(Debug, Default)]
pub struct ResponseAccumulator {
    /// Trimmed text emitted so far.
    content: String,
    /// Whitespace withheld from the end of the last delta.
    pending: String,
    /// Final finish reason (if received).
    finish_reason: Option<FinishReason>,
    /// Final usage statistics (if received).
    usage: Option<Usage>,
}

impl ResponseAccumulator {
    /// Create a new response accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a stream event and update the accumulation.
    ///
    /// Returns the fragment that should be forwarded to listeners, if any.
    pub fn process_event(&mut self, event: StreamEvent) -> Result<Option<String>, Error> {
        match event {
            StreamEvent::ContentDelta { delta } => Ok(self.push_delta(&delta)),
            StreamEvent::Done {
                finish_reason,
                usage,
            } => {
                self.finish_reason = Some(finish_reason);
                self.usage = Some(usage);
                Ok(None)
            }
            StreamEvent::Error { error } => Err(Error::streaming(error)),
        }
    }

    fn push_delta(&mut self, delta: &str) -> Option<String> {
        let delta = if self.content.is_empty() {
            delta.trim_start()
        } else {
            delta
        };
        if delta.is_empty() {
            return None;
        }

        let body_len = delta.trim_end().len();
        if body_len == 0 {
            self.pending.push_str(delta);
            return None;
        }

        let mut fragment = std::mem::take(&mut self.pending);
        fragment.push_str(&delta[..body_len]);
        self.pending.push_str(&delta[body_len..]);
        self.content.push_str(&fragment);
        Some(fragment)
    }

    /// Get the current accumulated content.
    pub fn current_content(&self) -> &str {
        &self.content
    }

    /// Whether a terminal `Done` event has been seen.
    pub fn is_done(&self) -> bool {
        self.finish_reason.is_some()
    }

    /// Finalize and return the complete response.
    pub fn finalize(self) -> CompleteResponse {
        CompleteResponse {
            content: self.content,
            finish_reason: self.finish_reason.unwrap_or(FinishReason::Stop),
            usage: self.usage.unwrap_or_default(),
        }
    }
}
