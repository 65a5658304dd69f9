use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::Role;

/// Purpose tag on a thread entry.
///
/// The server is free to introduce further types (it already labels ongoing
/// chat `business_to_vendor` / `vendor_to_business`); anything unrecognized
/// is preserved verbatim in `Other` and rendered like general chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    General,
    VendorRequest,
    Resolution,
    Other(String),
}

impl MessageType {
    pub fn as_str(&self) -> &str {
        match self {
            MessageType::General => "general",
            MessageType::VendorRequest => "vendor_request",
            MessageType::Resolution => "resolution",
            MessageType::Other(raw) => raw,
        }
    }
}

impl From<String> for MessageType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "general" => MessageType::General,
            "vendor_request" => MessageType::VendorRequest,
            "resolution" => MessageType::Resolution,
            _ => MessageType::Other(raw),
        }
    }
}

impl From<MessageType> for String {
    fn from(kind: MessageType) -> Self {
        kind.as_str().to_owned()
    }
}

/// Sender or recipient of a message, with the role the view keys off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

/// One entry in a ticket's communication thread. Messages are never edited
/// or deleted; an absent `recipient` means thread-visible to all
/// participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub content: String,
    pub message_type: MessageType,
    pub created_at: DateTime<Utc>,
    pub sender: Participant,
    #[serde(default)]
    pub recipient: Option<Participant>,
}
