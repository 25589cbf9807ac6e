//! Encoding of run events for a persistent `text/event-stream` connection.
//!
//! Event names are `user`, `fragment`, `completion` and `done`; every payload
//! is a JSON object.

use futures_util::stream::{Stream, StreamExt};
use serde_json::json;

use crate::sse_stream::SseEvent;
use crate::RunEvent;

pub const USER_EVENT: &str = "user";
pub const FRAGMENT_EVENT: &str = "fragment";
pub const COMPLETION_EVENT: &str = "completion";
pub const DONE_EVENT: &str = "done";

impl RunEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            RunEvent::UserEcho { .. } => USER_EVENT,
            RunEvent::Fragment { .. } => FRAGMENT_EVENT,
            RunEvent::Completion(_) => COMPLETION_EVENT,
            RunEvent::Done => DONE_EVENT,
        }
    }

    /// Convert this event into a typed SSE event with a JSON payload.
    pub fn to_sse(&self) -> Result<SseEvent, crate::Error> {
        let data = match self {
            RunEvent::UserEcho { content } => json!({ "content": content }),
            RunEvent::Fragment { provider, text } => {
                json!({ "provider": provider, "text": text })
            }
            RunEvent::Completion(outcome) => serde_json::to_value(outcome)?,
            RunEvent::Done => json!({}),
        };
        Ok(SseEvent::with_type(
            self.event_name().to_string(),
            serde_json::to_string(&data)?,
        ))
    }
}

/// Render a run's events as SSE frames. The stream ends after the `done` frame.
pub fn sse_frames<S>(events: S) -> impl Stream<Item = Result<String, crate::Error>>
where
    S: Stream<Item = RunEvent>,
{
    events
        .scan(false, |finished, event| {
            if *finished {
                return futures_util::future::ready(None);
            }
            *finished = matches!(event, RunEvent::Done);
            futures_util::future::ready(Some(event))
        })
        .map(|event| event.to_sse().map(|sse| sse.to_frame()))
}
