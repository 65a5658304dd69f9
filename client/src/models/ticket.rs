use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Stage of a ticket in its forward-only lifecycle.
///
/// Transitions are decided by the server alone; this client only ever
/// observes a status after a round trip and never requests a backward move.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TicketStatus {
    Open,
    BusinessAssigned,
    VendorContacted,
    VendorResponded,
    Resolved,
}

impl TicketStatus {
    /// Index in the lifecycle sequence. Later stages compare greater, which
    /// is what the staleness checks lean on.
    pub fn rank(self) -> u8 {
        match self {
            TicketStatus::Open => 0,
            TicketStatus::BusinessAssigned => 1,
            TicketStatus::VendorContacted => 2,
            TicketStatus::VendorResponded => 3,
            TicketStatus::Resolved => 4,
        }
    }

    /// Once resolved, no further chat input is offered for the ticket.
    pub fn is_terminal(self) -> bool {
        matches!(self, TicketStatus::Resolved)
    }
}

/// Participant reference as embedded in ticket payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
}

/// The unit of work tracked from creation to resolution.
///
/// `business` and `vendor` are set once by the workflow and never cleared;
/// `title`, `description`, `customer` and `created_at` are immutable after
/// creation as far as this client is concerned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub customer: UserRef,
    #[serde(default)]
    pub business: Option<UserRef>,
    #[serde(default)]
    pub vendor: Option<UserRef>,
}
