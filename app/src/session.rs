//! Couples one role view with one notification subscription.

use client::notify::{Notification, NotificationHub};
use tokio::sync::broadcast::error::RecvError;

use crate::views::{BusinessView, CustomerView, VendorView};

/// The role-specific view a session drives.
pub enum RoleView {
    Customer(CustomerView),
    Business(BusinessView),
    Vendor(VendorView),
}

impl RoleView {
    /// Initial fetches a freshly mounted view performs.
    pub async fn bootstrap(&mut self) {
        match self {
            RoleView::Customer(view) => view.refresh_tickets().await,
            RoleView::Business(view) => {
                view.refresh_tickets().await;
                view.refresh_users().await;
            }
            RoleView::Vendor(view) => view.refresh_tickets().await,
        }
    }

    pub async fn handle_notification(&mut self, event: &Notification) {
        match self {
            RoleView::Customer(view) => view.handle_notification(event).await,
            RoleView::Business(view) => view.handle_notification(event).await,
            RoleView::Vendor(view) => view.handle_notification(event).await,
        }
    }

    /// Full re-fetch, used after the event stream lagged and signals may
    /// have been missed.
    pub async fn resync(&mut self) {
        match self {
            RoleView::Customer(view) => {
                view.refresh_tickets().await;
                view.refresh_thread().await;
            }
            RoleView::Business(view) => {
                view.refresh_tickets().await;
                view.refresh_users().await;
                view.refresh_thread().await;
            }
            RoleView::Vendor(view) => {
                view.refresh_tickets().await;
                view.refresh_thread().await;
            }
        }
    }

    fn summary(&self) -> String {
        fn describe(tickets: &[client::models::Ticket]) -> String {
            let active = tickets.iter().filter(|t| !t.status.is_terminal()).count();
            format!("{} tickets ({active} active)", tickets.len())
        }
        match self {
            RoleView::Customer(view) => describe(view.tickets()),
            RoleView::Business(view) => describe(view.tickets()),
            RoleView::Vendor(view) => describe(view.tickets()),
        }
    }
}

pub struct Session {
    view: RoleView,
    hub: NotificationHub,
}

impl Session {
    pub fn new(view: RoleView, hub: NotificationHub) -> Self {
        Self { view, hub }
    }

    /// Runs until the notification channel closes. Connection loss is
    /// handled inside the hub; this loop only sees events and lag.
    pub async fn run(mut self) {
        let mut events = self.hub.subscribe();
        self.view.bootstrap().await;
        tracing::info!(state = %self.view.summary(), "session ready");

        loop {
            match events.recv().await {
                Ok(event) => {
                    self.view.handle_notification(&event).await;
                    tracing::info!(state = %self.view.summary(), "state refreshed");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notification stream lagged; resyncing");
                    self.view.resync().await;
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
