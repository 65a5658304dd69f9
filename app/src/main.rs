use std::sync::Arc;

use app::session::{RoleView, Session};
use app::views::{BusinessView, CustomerView, VendorView};
use client::models::Role;
use client::notify::NotificationHub;
use client::store::{TicketStore, TriageApi};
use common::{config, logger};

#[tokio::main]
async fn main() {
    // Load configuration and initialize logging
    let _log_guard = logger::init_logging(&config::log_file(), &config::log_level());

    let user_id: i64 = std::env::var("TRIAGE_USER_ID")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);

    let store = match TicketStore::new() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(error = %e, "invalid API configuration");
            std::process::exit(1);
        }
    };

    // The roster decides which view this session runs.
    let users = store.list_users().await;
    let Some(user) = users.iter().find(|u| u.id == user_id) else {
        tracing::error!(user_id, "user not found (is the API reachable?)");
        std::process::exit(1);
    };

    println!(
        "Starting {} as {} ({})",
        config::project_name(),
        user.username,
        user.role
    );

    let api: Arc<dyn TriageApi> = store;
    let view = match user.role {
        Role::Customer => RoleView::Customer(CustomerView::new(api, user_id)),
        Role::Business => RoleView::Business(BusinessView::new(api, user_id)),
        Role::Vendor => RoleView::Vendor(VendorView::new(api, user_id)),
    };

    let hub = NotificationHub::connect(user_id);
    let session = Session::new(view, hub);

    tokio::select! {
        _ = session.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }
}
