//! Inbound Telegram update payloads.
//!
//! Only the fields the webhook looks at are modelled. Unknown fields are
//! ignored and absent or `null` fields fall back to their zero value, so that
//! any syntactically valid update decodes.

use serde::{Deserialize, Deserializer};

/// Reads `null` the same way as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
    #[serde(default, deserialize_with = "null_as_default")]
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<Sender>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chat: Chat,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[allow(dead_code)]
pub struct Sender {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Chat {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub chat_type: String,
}

impl Update {
    pub fn decode(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    /// The message to reply to, if this update carries non-empty text.
    pub fn text_message(&self) -> Option<&Message> {
        self.message.as_ref().filter(|m| !m.text.is_empty())
    }
}
