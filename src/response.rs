//! Response handling for provider generations.

use crate::accumulator::ResponseAccumulator;
use crate::{Error, FinishReason, StreamEvent, Usage};
use futures_util::stream::Stream;
use futures_util::StreamExt;
use std::pin::Pin;

/// A complete response from a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteResponse {
    /// Trimmed answer text.
    pub content: String,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

/// A streamed provider response.
pub struct Response {
    stream: Pin<Box<dyn Stream<Item = Result<StreamEvent, Error>> + Send>>,
}

impl Response {
    /// Create a new response from a stream of events.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<StreamEvent, Error>> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream),
        }
    }

    /// Buffer the entire response by consuming the stream.
    pub async fn buffer(self) -> Result<CompleteResponse, Error> {
        self.for_each_fragment(|_| {}).await
    }

    /// Consume the stream, handing each trimmed fragment to `on_fragment` in order.
    ///
    /// Fails if the stream errors or ends before its terminal `Done` event.
    /// Fragments already delivered are not retracted in either case.
    pub async fn for_each_fragment<F>(mut self, mut on_fragment: F) -> Result<CompleteResponse, Error>
    where
        F: FnMut(&str),
    {
        let mut accumulator = ResponseAccumulator::new();

        while let Some(event_result) = self.stream.next().await {
            if let Some(fragment) = accumulator.process_event(event_result?)? {
                on_fragment(&fragment);
            }
            if accumulator.is_done() {
                break;
            }
        }

        // A stream that closes without its terminal event is a truncated answer
        if !accumulator.is_done() {
            return Err(Error::streaming("stream ended before completion"));
        }

        let complete = accumulator.finalize();
        tracing::debug!(
            finish_reason = ?complete.finish_reason,
            input_tokens = complete.usage.input_tokens,
            output_tokens = complete.usage.output_tokens,
            "provider stream finished"
        );
        Ok(complete)
    }
}
