//! Telegram update payload shapes.
//!
//! Only the fields Mirrorbot reads are modeled; everything else in the
//! Bot API update object is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// An inbound Telegram webhook update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<Message>,
}

/// A chat message carried by an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

/// The chat a message was sent in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    /// Chat type: "private", "group", "supergroup", or "channel".
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// The Telegram account that sent a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

impl Message {
    /// The sender's user id, falling back to the chat id when `from` is
    /// absent (e.g. channel posts).
    pub fn sender_id(&self) -> i64 {
        self.from.as_ref().map(|u| u.id).unwrap_or(self.chat.id)
    }

    /// A human-readable handle for the sender: `@username` when available,
    /// else the first name.
    pub fn sender_display(&self) -> Option<String> {
        let from = self.from.as_ref()?;
        if let Some(username) = &from.username {
            Some(format!("@{username}"))
        } else {
            from.first_name.clone()
        }
    }
}
