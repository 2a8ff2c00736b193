use serde::{Deserialize, Serialize};

/// The speaker of a message. The system prompt travels out-of-band and tool
/// results ride in user messages, so only these two roles appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}
