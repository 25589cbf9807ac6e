//! Stream adapter for parsing SSE (Server-Sent Events) from byte chunks.

use futures_util::{Stream, StreamExt};
use memchr::memmem;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use crate::Error;

/// A Server-Sent Events (SSE) event.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    /// Event type (optional).
    pub event_type: Option<String>,
    /// Event data.
    pub data: String,
    /// Event ID (optional).
    pub id: Option<String>,
    /// Retry delay in milliseconds (optional).
    pub retry: Option<u64>,
}

impl SseEvent {
    /// Create a new SSE event with just data.
    pub fn new(data: String) -> Self {
        Self {
            event_type: None,
            data,
            id: None,
            retry: None,
        }
    }

    /// Create a new SSE event with event type and data.
    pub fn with_type(event_type: String, data: String) -> Self {
        Self {
            event_type: Some(event_type),
            data,
            id: None,
            retry: None,
        }
    }

    /// Check if this is a "done" event (used by OpenAI to signal end of stream).
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }

    /// Render this event as a `text/event-stream` frame, terminated by a blank line.
    ///
    /// Multi-line data is split over several `data:` lines so that parsing the
    /// frame yields the original payload.
    pub fn to_frame(&self) -> String {
        let mut frame = String::new();
        if let Some(event_type) = &self.event_type {
            frame.push_str("event: ");
            frame.push_str(event_type);
            frame.push('\n');
        }
        if let Some(id) = &self.id {
            frame.push_str("id: ");
            frame.push_str(id);
            frame.push('\n');
        }
        if let Some(retry) = self.retry {
            frame.push_str(&format!("retry: {retry}\n"));
        }
        for line in self.data.split('\n') {
            frame.push_str("data: ");
            frame.push_str(line);
            frame.push('\n');
        }
        frame.push('\n');
        frame
    }
}

/// Largest amount of undelimited input kept while waiting for an event boundary.
const MAX_BUFFERED_BYTES: usize = 1_000_000;

/// Incremental `text/event-stream` decoder.
///
/// Bytes may arrive split anywhere, including inside a UTF-8 sequence or a
/// `\r\n` pair. Line endings are normalized to `\n` on the way in, so events
/// are always delimited by a blank line `\n\n`.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Last byte seen was `\r`; a following `\n` belongs to the same line break.
    after_cr: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, appending every event it completes to `out`.
    pub fn push(&mut self, chunk: &[u8], out: &mut VecDeque<SseEvent>) -> Result<(), Error> {
        for &byte in chunk {
            match byte {
                b'\r' => {
                    self.buffer.push(b'\n');
                    self.after_cr = true;
                }
                b'\n' if self.after_cr => self.after_cr = false,
                _ => {
                    self.buffer.push(byte);
                    self.after_cr = false;
                }
            }
        }

        let finder = memmem::Finder::new(b"\n\n");
        let mut consumed = 0;
        while let Some(pos) = finder.find(&self.buffer[consumed..]) {
            let block = &self.buffer[consumed..consumed + pos];
            let text = std::str::from_utf8(block)
                .map_err(|e| Error::streaming(format!("Invalid UTF-8 in SSE event: {e}")))?;
            out.extend(parse_block(text));
            consumed += pos + 2;
        }
        self.buffer.drain(..consumed);

        if self.buffer.len() > MAX_BUFFERED_BYTES {
            self.buffer.clear();
            return Err(Error::streaming("SSE buffer exceeded maximum size"));
        }
        Ok(())
    }

    /// Flush whatever is left once the input has ended. Servers sometimes omit
    /// the blank line after the last event.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let rest = std::mem::take(&mut self.buffer);
        std::str::from_utf8(&rest).ok().and_then(parse_block)
    }
}

/// Parse one blank-line-delimited block. Blocks without `data` are not events.
fn parse_block(block: &str) -> Option<SseEvent> {
    let mut event = SseEvent::new(String::new());
    let mut data: Option<String> = None;

    for line in block.lines().map(str::trim_end) {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => event.event_type = Some(value.to_string()),
            "id" => event.id = Some(value.to_string()),
            "retry" => event.retry = value.parse().ok(),
            "data" => match data.as_mut() {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(value);
                }
                None => data = Some(value.to_string()),
            },
            _ => {}
        }
    }

    event.data = data?;
    Some(event)
}

/// Stream of [`SseEvent`]s decoded from a byte stream such as
/// `reqwest::Response::bytes_stream()`.
pub struct SseStream<S> {
    inner: S,
    decoder: SseDecoder,
    ready: VecDeque<SseEvent>,
    ended: bool,
}

impl<S> SseStream<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            decoder: SseDecoder::new(),
            ready: VecDeque::new(),
            ended: false,
        }
    }
}

impl<S, E> Stream for SseStream<S>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Item = Result<SseEvent, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            if let Some(event) = this.ready.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }
            if this.ended {
                return Poll::Ready(None);
            }

            match ready!(this.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => {
                    if let Err(e) = this.decoder.push(&chunk, &mut this.ready) {
                        return Poll::Ready(Some(Err(e)));
                    }
                }
                Some(Err(e)) => {
                    return Poll::Ready(Some(Err(Error::streaming(format!(
                        "Stream error: {}",
                        e.into()
                    )))));
                }
                None => {
                    this.ended = true;
                    this.ready.extend(this.decoder.finish());
                }
            }
        }
    }
}

/// Extension trait to add SSE parsing to byte streams.
pub trait SseStreamExt: Stream {
    fn sse_events(self) -> SseStream<Self>
    where
        Self: Sized,
    {
        SseStream::new(self)
    }
}

impl<S: Stream> SseStreamExt for S {}
