pub mod business;
pub mod customer;
pub mod vendor;

pub use business::{BusinessView, ResolutionForm, TicketAction, VendorContactForm};
pub use customer::{CustomerView, NewTicketForm};
pub use vendor::{Priority, VendorView};

use client::models::{Ticket, TicketStatus};

/// Draft state for the business/vendor chat input.
#[derive(Debug, Default, Clone)]
pub struct ChatComposer {
    pub draft: String,
}

impl ChatComposer {
    pub fn can_send(&self) -> bool {
        !self.draft.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.draft.clear();
    }
}

pub(crate) fn find_ticket(tickets: &[Ticket], id: Option<i64>) -> Option<&Ticket> {
    let id = id?;
    tickets.iter().find(|t| t.id == id)
}

/// Applies a status pushed in a notification payload, pending the refetch.
/// Only ever advances: the lifecycle is forward-only, so an older hint is a
/// stale frame and is dropped.
pub(crate) fn apply_status_hint(
    tickets: &mut [Ticket],
    ticket_id: i64,
    status: TicketStatus,
) -> bool {
    match tickets.iter_mut().find(|t| t.id == ticket_id) {
        Some(ticket) if status.rank() >= ticket.status.rank() => {
            ticket.status = status;
            true
        }
        Some(ticket) => {
            tracing::debug!(
                ticket_id,
                current = %ticket.status,
                pushed = %status,
                "ignoring backward status hint"
            );
            false
        }
        None => false,
    }
}
