use std::sync::Arc;

use client::models::{Message, Ticket};
use client::notify::Notification;
use client::store::TriageApi;

use crate::sync::{Latest, SeqCounter};
use crate::views::{apply_status_hint, find_ticket};

/// Form state for filing a new ticket.
#[derive(Debug, Default, Clone)]
pub struct NewTicketForm {
    pub title: String,
    pub description: String,
}

impl NewTicketForm {
    pub fn can_submit(&self) -> bool {
        !self.title.trim().is_empty() && !self.description.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.title.clear();
        self.description.clear();
    }
}

/// State behind the customer page: their own tickets, the selected thread
/// (resolution messages, as filtered by the server), and the new-ticket
/// form. Customers have no chat composer.
pub struct CustomerView {
    api: Arc<dyn TriageApi>,
    user_id: i64,
    tickets: Latest<Vec<Ticket>>,
    ticket_seq: SeqCounter,
    thread: Latest<Vec<Message>>,
    thread_seq: SeqCounter,
    selected: Option<i64>,
    pub form: NewTicketForm,
}

impl CustomerView {
    pub fn new(api: Arc<dyn TriageApi>, user_id: i64) -> Self {
        Self {
            api,
            user_id,
            tickets: Latest::default(),
            ticket_seq: SeqCounter::default(),
            thread: Latest::default(),
            thread_seq: SeqCounter::default(),
            selected: None,
            form: NewTicketForm::default(),
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

    pub async fn refresh_tickets(&mut self) {
        let seq = self.ticket_seq.next();
        let tickets = self.api.list_tickets(self.user_id).await;
        if !self.tickets.apply(seq, tickets) {
            tracing::debug!(user_id = self.user_id, "discarded stale ticket list");
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

    /// Files the ticket when the form passes its guard. A failed submission
    /// leaves the form untouched for a manual retry.
    pub async fn submit_ticket(&mut self) -> bool {
        if !self.form.can_submit() {
            return false;
        }
        let title = self.form.title.trim().to_owned();
        let description = self.form.description.trim().to_owned();
        match self.api.create_ticket(self.user_id, &title, &description).await {
            Ok(()) => {
                self.form.clear();
                self.refresh_tickets().await;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "create ticket failed");
                false
            }
        }
    }

    pub async fn handle_notification(&mut self, event: &Notification) {
        match event {
            Notification::TicketAssigned {
                ticket_id, status, ..
            } => {
                if let Some(status) = status {
                    apply_status_hint(self.tickets.get_mut(), *ticket_id, *status);
                }
                self.refresh_tickets().await;
            }
            Notification::TicketResolved {
                ticket_id, status, ..
            } => {
                if let Some(status) = status {
                    apply_status_hint(self.tickets.get_mut(), *ticket_id, *status);
                }
                self.refresh_tickets().await;
                if self.selected == Some(*ticket_id) {
                    self.refresh_thread().await;
                }
            }
            _ => {}
        }
    }
}
