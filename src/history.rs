//! Source of prior conversation turns.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::{Error, Turn};

/// Number of prior turns sent with each run.
pub const HISTORY_LIMIT: usize = 40;

/// Read access to stored conversations.
#[async_trait::async_trait]
pub trait HistorySource: Send + Sync {
    /// The most recent `limit` turns of `conversation_id`, oldest first.
    ///
    /// An unknown conversation has an empty history.
    async fn recent_turns(&self, conversation_id: &str, limit: usize) -> Result<Vec<Turn>, Error>;
}

/// Process-local conversation store for demos and tests.
///
/// Each conversation keeps at most `capacity` turns; older ones are dropped on
/// append. Conversations themselves are never evicted, so a long-lived service
/// should back [`HistorySource`] with real storage instead.
#[derive(Debug)]
pub struct InMemoryHistory {
    conversations: RwLock<HashMap<String, Vec<Turn>>>,
    capacity: usize,
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_LIMIT)
    }
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep up to `capacity` turns per conversation (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn append(&self, conversation_id: &str, turn: Turn) -> Result<(), Error> {
        let mut conversations = self
            .conversations
            .write()
            .map_err(|_| Error::config("history lock poisoned"))?;
        let turns = conversations.entry(conversation_id.to_string()).or_default();
        turns.push(turn);
        let excess = turns.len().saturating_sub(self.capacity);
        turns.drain(..excess);
        Ok(())
    }
}

#[async_trait::async_trait]
impl HistorySource for InMemoryHistory {
    async fn recent_turns(&self, conversation_id: &str, limit: usize) -> Result<Vec<Turn>, Error> {
        let conversations = self
            .conversations
            .read()
            .map_err(|_| Error::config("history lock poisoned"))?;
        let turns = conversations
            .get(conversation_id)
            .map(|turns| turns[turns.len().saturating_sub(limit)..].to_vec())
            .unwrap_or_default();
        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keeps_most_recent_turns_in_order() {
        let history = InMemoryHistory::new();
        for i in 0..45 {
            history.append("room", Turn::user(format!("m{i}"))).unwrap();
        }

        let turns = history.recent_turns("room", HISTORY_LIMIT).await.unwrap();
        assert_eq!(turns.len(), 40);
        assert_eq!(turns[0].content, "m5");
        assert_eq!(turns[39].content, "m44");
    }

    #[tokio::test]
    async fn test_append_drops_turns_beyond_capacity() {
        let history = InMemoryHistory::with_capacity(3);
        for i in 0..10 {
            history.append("room", Turn::user(format!("m{i}"))).unwrap();
        }

        // Asking for more than is kept returns only what survived
        let turns = history.recent_turns("room", HISTORY_LIMIT).await.unwrap();
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["m7", "m8", "m9"]);
        assert_eq!(history.conversations.read().unwrap()["room"].len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_conversation_is_empty() {
        let history = InMemoryHistory::new();
        history.append("room", Turn::assistant("gemini", "hi")).unwrap();
        assert!(history.recent_turns("other", 10).await.unwrap().is_empty());
        assert_eq!(history.recent_turns("room", 10).await.unwrap().len(), 1);
    }
}
