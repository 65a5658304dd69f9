use std::sync::Arc;

use chrono::{DateTime, Utc};
use client::models::{Message, Ticket};
use client::notify::Notification;
use client::store::TriageApi;

use crate::sync::{Latest, SeqCounter};
use crate::views::{ChatComposer, apply_status_hint, find_ticket};

/// Urgency bucket derived from ticket age. Recomputed on every render from
/// the wall clock; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn for_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let hours = now.signed_duration_since(created_at).num_hours();
        if hours < 2 {
            Priority::Normal
        } else if hours < 6 {
            Priority::High
        } else {
            Priority::Urgent
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Normal => "Normal",
            Priority::High => "High Priority",
            Priority::Urgent => "Urgent",
        }
    }
}

/// State behind the vendor page: the requests routed to this vendor, the
/// selected thread, and the reply composer. The vendor never requests a
/// status change - the server decides whether a reply flips the ticket to
/// responded, and the view observes that on the next refresh.
pub struct VendorView {
    api: Arc<dyn TriageApi>,
    user_id: i64,
    tickets: Latest<Vec<Ticket>>,
    ticket_seq: SeqCounter,
    thread: Latest<Vec<Message>>,
    thread_seq: SeqCounter,
    selected: Option<i64>,
    pub chat: ChatComposer,
}

impl VendorView {
    pub fn new(api: Arc<dyn TriageApi>, user_id: i64) -> Self {
        Self {
            api,
            user_id,
            tickets: Latest::default(),
            ticket_seq: SeqCounter::default(),
            thread: Latest::default(),
            thread_seq: SeqCounter::default(),
            selected: None,
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

    pub fn priority_of(&self, ticket: &Ticket) -> Priority {
        Priority::for_age(ticket.created_at, Utc::now())
    }

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

    /// Posts a reply. The list refresh afterwards is what surfaces the
    /// server-side flip to `vendor_responded`, if it happened.
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
                self.refresh_tickets().await;
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
            Notification::VendorContacted {
                ticket_id, status, ..
            } => {
                if let Some(status) = status {
                    apply_status_hint(self.tickets.get_mut(), *ticket_id, *status);
                }
                self.refresh_tickets().await;
            }
            Notification::NewMessage { ticket_id, .. } if self.selected == Some(*ticket_id) => {
                self.refresh_thread().await;
            }
            _ => {}
        }
    }
}
