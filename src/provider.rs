use crate::{Message, ProviderError, ProviderId};

/// Fixed instruction every adapter places ahead of the conversation.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant in a group chat. Reply concisely in the same language as the user.";

/// Answer length cap sent with every request.
pub const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Receives incremental answer text, in order, while a provider streams.
pub type FragmentSink<'a> = &'a mut (dyn FnMut(&str) + Send);

/// A named external answer service.
///
/// The orchestrator only ever talks to providers through this trait, so adding
/// a provider means adding an implementation, nothing more.
#[async_trait::async_trait]
pub trait ProviderAdapter: Send + Sync + 'static {
    fn id(&self) -> ProviderId;

    /// Whether usable credentials are present. Must not perform I/O.
    fn is_configured(&self) -> bool;

    /// Single-shot call returning the complete trimmed answer.
    async fn respond(&self, messages: &[Message]) -> Result<String, ProviderError>;

    /// Streaming call. `on_fragment` sees each increment in order; the returned
    /// text is their exact concatenation.
    async fn respond_streaming(
        &self,
        messages: &[Message],
        on_fragment: FragmentSink<'_>,
    ) -> Result<String, ProviderError>;
}
