use crate::error::{MarketError, ValidationError};
use crate::model::{conversation_id, Message, NewMessage};
use crate::storage::{RecordStore, RecordsExt};

use super::MarketDb;

impl<S: RecordStore> MarketDb<S> {
    pub fn send_message(&self, data: NewMessage) -> Result<Message, MarketError> {
        if data.content.trim().is_empty() {
            return Err(ValidationError::single("content", "is required").into());
        }
        let stored = self.store.table::<Message>().insert(&data.into_message())?;
        tracing::info!(
            message_id = %stored.data.id,
            conversation_id = %stored.data.conversation_id,
            "Message sent"
        );
        Ok(stored.data)
    }

    /// Messages between two users, oldest first.
    pub fn get_conversation(&self, user_a: &str, user_b: &str) -> Result<Vec<Message>, MarketError> {
        let mut messages: Vec<Message> = self
            .store
            .table::<Message>()
            .by_index("conversation_id", &conversation_id(user_a, user_b))?
            .into_iter()
            .map(|v| v.data)
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }
}
