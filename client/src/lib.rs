//! Client-side plumbing for the support-ticket triage workflow.
//!
//! Three user roles (customer, business, vendor) share one server-authoritative
//! ticket lifecycle. This crate owns everything below the presentation layer:
//! the wire data model, the REST store client, the notification stream, and
//! the error taxonomy. The server is the single source of truth - nothing in
//! here mutates state optimistically or computes a status transition locally.

pub mod error;
pub mod models;
pub mod notify;
pub mod store;

pub use error::ClientError;
pub use notify::{Notification, NotificationHub};
pub use store::{TicketStore, TriageApi};
