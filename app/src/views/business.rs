use std::sync::Arc;

use client::models::{Message, Role, Ticket, TicketStatus, User};
use client::notify::Notification;
use client::store::TriageApi;

use crate::sync::{Latest, SeqCounter};
use crate::views::{ChatComposer, apply_status_hint, find_ticket};

/// The single affordance the business page offers for a ticket, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAction {
    Assign,
    ContactVendor,
    Resolve,
}

/// Form state for the contact-vendor modal. Submission stays blocked until
/// a vendor is chosen and the request text is non-blank.
#[derive(Debug, Default, Clone)]
pub struct VendorContactForm {
    pub vendor_id: Option<i64>,
    pub message: String,
}

impl VendorContactForm {
    pub fn can_submit(&self) -> bool {
        self.vendor_id.is_some() && !self.message.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.vendor_id = None;
        self.message.clear();
    }
}

/// Form state for the resolution modal.
#[derive(Debug, Default, Clone)]
pub struct ResolutionForm {
    pub resolution: String,
}

impl ResolutionForm {
    pub fn can_submit(&self) -> bool {
        !self.resolution.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.resolution.clear();
    }
}

/// State behind the business page: the full support queue, the user roster
/// (for vendor selection), the selected thread, and the three mutation
/// forms. Guards here are a UX convenience; the server re-validates every
/// request and its answer wins.
pub struct BusinessView {
    api: Arc<dyn TriageApi>,
    user_id: i64,
    tickets: Latest<Vec<Ticket>>,
    ticket_seq: SeqCounter,
    users: Latest<Vec<User>>,
    user_seq: SeqCounter,
    thread: Latest<Vec<Message>>,
    thread_seq: SeqCounter,
    selected: Option<i64>,
    pub contact_form: VendorContactForm,
    pub resolution_form: ResolutionForm,
    pub chat: ChatComposer,
}

impl BusinessView {
    pub fn new(api: Arc<dyn TriageApi>, user_id: i64) -> Self {
        Self {
            api,
            user_id,
            tickets: Latest::default(),
            ticket_seq: SeqCounter::default(),
            users: Latest::default(),
            user_seq: SeqCounter::default(),
            thread: Latest::default(),
            thread_seq: SeqCounter::default(),
            selected: None,
            contact_form: VendorContactForm::default(),
            resolution_form: ResolutionForm::default(),
            chat: ChatComposer::default(),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn tickets(&self) -> &[Ticket] {
        self.tickets.get()
    }

    pub fn thread(&self) -> &[Message] {
        self.thread.get()
    }

    pub fn selected_ticket(&self) -> Option<&Ticket> {
        find_ticket(self.tickets.get(), self.selected)
    }

    /// Vendor choices for the contact form.
    pub fn vendors(&self) -> Vec<&User> {
        self.users
            .get()
            .iter()
            .filter(|u| u.role == Role::Vendor)
            .collect()
    }

    fn is_mine(&self, ticket: &Ticket) -> bool {
        ticket.business.as_ref().is_some_and(|b| b.id == self.user_id)
    }

    /// Which action the page offers for `ticket` right now.
    pub fn available_action(&self, ticket: &Ticket) -> Option<TicketAction> {
        match ticket.status {
            TicketStatus::Open => Some(TicketAction::Assign),
            TicketStatus::BusinessAssigned if self.is_mine(ticket) => {
                Some(TicketAction::ContactVendor)
            }
            TicketStatus::VendorResponded if self.is_mine(ticket) => Some(TicketAction::Resolve),
            _ => None,
        }
    }

    /// Chat to the vendor is open only once a vendor is attached and until
    /// the ticket is resolved.
    pub fn chat_enabled(&self) -> bool {
        self.selected_ticket()
            .is_some_and(|t| t.vendor.is_some() && !t.status.is_terminal())
    }

    pub async fn refresh_tickets(&mut self) {
        let seq = self.ticket_seq.next();
        let tickets = self.api.list_tickets(self.user_id).await;
        if !self.tickets.apply(seq, tickets) {
            tracing::debug!(user_id = self.user_id, "discarded stale ticket list");
        }
    }

    pub async fn refresh_users(&mut self) {
        let seq = self.user_seq.next();
        let users = self.api.list_users().await;
        if !self.users.apply(seq, users) {
            tracing::debug!("discarded stale user roster");
        }
    }

    pub async fn select_ticket(&mut self, ticket_id: i64) {
        self.selected = Some(ticket_id);
        self.refresh_thread().await;
    }

    pub async fn refresh_thread(&mut self) {
        let Some(ticket_id) = self.selected else {
            return;
        };
        let seq = self.thread_seq.next();
        let messages = self.api.list_messages(ticket_id, self.user_id).await;
        if !self.thread.apply(seq, messages) {
            tracing::debug!(ticket_id, "discarded stale message thread");
        }
    }

    /// Claims an open ticket for this business user.
    pub async fn assign(&mut self, ticket_id: i64) -> bool {
        let permitted = find_ticket(self.tickets.get(), Some(ticket_id))
            .is_some_and(|t| self.available_action(t) == Some(TicketAction::Assign));
        if !permitted {
            return false;
        }
        match self.api.assign_ticket(ticket_id, self.user_id).await {
            Ok(()) => {
                self.refresh_tickets().await;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, ticket_id, "assign failed");
                false
            }
        }
    }

    /// Sends the initial request to the chosen vendor for the selected
    /// ticket. On success the form is cleared; on failure it is left
    /// untouched for a manual retry.
    pub async fn submit_contact_vendor(&mut self) -> bool {
        if !self.contact_form.can_submit() {
            return false;
        }
        let permitted = self
            .selected_ticket()
            .is_some_and(|t| self.available_action(t) == Some(TicketAction::ContactVendor));
        let (Some(ticket_id), Some(vendor_id), true) =
            (self.selected, self.contact_form.vendor_id, permitted)
        else {
            return false;
        };
        let message = self.contact_form.message.trim().to_owned();
        match self.api.contact_vendor(ticket_id, vendor_id, &message).await {
            Ok(()) => {
                self.contact_form.clear();
                self.refresh_tickets().await;
                self.refresh_thread().await;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, ticket_id, "contact vendor failed");
                false
            }
        }
    }

    /// Relays the final resolution to the customer and closes out the
    /// workflow for the selected ticket.
    pub async fn submit_resolution(&mut self) -> bool {
        if !self.resolution_form.can_submit() {
            return false;
        }
        let permitted = self
            .selected_ticket()
            .is_some_and(|t| self.available_action(t) == Some(TicketAction::Resolve));
        let (Some(ticket_id), true) = (self.selected, permitted) else {
            return false;
        };
        let resolution = self.resolution_form.resolution.trim().to_owned();
        match self.api.resolve_ticket(ticket_id, self.user_id, &resolution).await {
            Ok(()) => {
                self.resolution_form.clear();
                self.refresh_tickets().await;
                self.refresh_thread().await;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, ticket_id, "resolve failed");
                false
            }
        }
    }

    /// Posts an ongoing chat message to the vendor.
    pub async fn send_chat(&mut self) -> bool {
        if !self.chat.can_send() || !self.chat_enabled() {
            return false;
        }
        let Some(ticket_id) = self.selected else {
            return false;
        };
        let content = self.chat.draft.trim().to_owned();
        match self.api.send_message(ticket_id, self.user_id, &content).await {
            Ok(()) => {
                self.chat.clear();
                self.refresh_thread().await;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, ticket_id, "send message failed");
                false
            }
        }
    }

    pub async fn handle_notification(&mut self, event: &Notification) {
        match event {
            Notification::NewTicket { .. } => {
                self.refresh_tickets().await;
                self.refresh_thread().await;
            }
            Notification::VendorResponse {
                ticket_id, status, ..
            } => {
                if let Some(status) = status {
                    apply_status_hint(self.tickets.get_mut(), *ticket_id, *status);
                }
                self.refresh_tickets().await;
                self.refresh_thread().await;
            }
            Notification::NewMessage { ticket_id, .. } if self.selected == Some(*ticket_id) => {
                self.refresh_thread().await;
            }
            _ => {}
        }
    }
}
