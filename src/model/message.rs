use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids;
use crate::Record;

/// A direct message between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[record(table = "messages")]
pub struct Message {
    pub id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    #[serde(default)]
    pub account_id: Option<String>,
    pub content: String,
    pub read: bool,
    #[record(index)]
    pub conversation_id: String,
    pub created_at: DateTime<Utc>,
}

/// Conversation id for a pair of users; symmetric in its arguments.
pub fn conversation_id(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}_{}", a, b)
    } else {
        format!("{}_{}", b, a)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub from_user_id: String,
    pub to_user_id: String,
    #[serde(default)]
    pub account_id: Option<String>,
    pub content: String,
}

impl NewMessage {
    pub(crate) fn into_message(self) -> Message {
        Message {
            id: ids::new_id(),
            conversation_id: conversation_id(&self.from_user_id, &self.to_user_id),
            from_user_id: self.from_user_id,
            to_user_id: self.to_user_id,
            account_id: self.account_id,
            content: self.content,
            read: false,
            created_at: ids::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_id_is_order_independent() {
        assert_eq!(conversation_id("u2", "u1"), "u1_u2");
        assert_eq!(conversation_id("u1", "u2"), "u1_u2");
    }
}
