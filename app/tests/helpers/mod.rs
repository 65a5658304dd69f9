//! In-process stand-in for the triage API, implementing the same workflow
//! semantics the real server enforces so the views can be driven end to end.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tokio::net::TcpListener;

use client::models::{
    Message, MessageType, Participant, Role, Ticket, TicketStatus, User, UserRef,
};

#[derive(Default)]
pub struct TriageState {
    pub users: Vec<User>,
    pub tickets: Vec<Ticket>,
    pub messages: Vec<(i64, Message)>, // (ticket_id, message)
    next_ticket_id: i64,
    next_message_id: i64,
}

impl TriageState {
    pub fn with_demo_users() -> Self {
        Self {
            users: vec![
                User {
                    id: 1,
                    username: "carol".into(),
                    role: Role::Customer,
                },
                User {
                    id: 2,
                    username: "acme".into(),
                    role: Role::Business,
                },
                User {
                    id: 3,
                    username: "widgetco".into(),
                    role: Role::Vendor,
                },
            ],
            ..Self::default()
        }
    }

    fn user(&self, id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn user_ref(&self, id: i64) -> Option<UserRef> {
        self.user(id).map(|u| UserRef {
            id: u.id,
            username: u.username.clone(),
        })
    }

    fn participant(&self, id: i64) -> Option<Participant> {
        self.user(id).map(|u| Participant {
            id: u.id,
            username: u.username.clone(),
            role: u.role,
        })
    }

    fn push_message(
        &mut self,
        ticket_id: i64,
        sender_id: i64,
        recipient_id: Option<i64>,
        content: &str,
        message_type: MessageType,
    ) {
        self.next_message_id += 1;
        let message = Message {
            id: self.next_message_id,
            content: content.to_owned(),
            message_type,
            created_at: Utc::now(),
            sender: self.participant(sender_id).unwrap(),
            recipient: recipient_id.and_then(|id| self.participant(id)),
        };
        self.messages.push((ticket_id, message));
    }
}

pub type Shared = Arc<Mutex<TriageState>>;

async fn get_users(State(state): State<Shared>) -> Json<Vec<User>> {
    Json(state.lock().unwrap().users.clone())
}

async fn get_tickets(State(state): State<Shared>, Path(user_id): Path<i64>) -> Json<Vec<Ticket>> {
    let state = state.lock().unwrap();
    let Some(user) = state.user(user_id) else {
        return Json(Vec::new());
    };
    let tickets = state
        .tickets
        .iter()
        .filter(|t| match user.role {
            Role::Customer => t.customer.id == user_id,
            Role::Business => true,
            Role::Vendor => t.vendor.as_ref().is_some_and(|v| v.id == user_id),
        })
        .cloned()
        .collect();
    Json(tickets)
}

#[derive(Deserialize)]
struct MessagesQuery {
    user_id: i64,
}

async fn get_messages(
    State(state): State<Shared>,
    Path(ticket_id): Path<i64>,
    Query(query): Query<MessagesQuery>,
) -> Json<Vec<Message>> {
    let state = state.lock().unwrap();
    let customer = state
        .user(query.user_id)
        .is_some_and(|u| u.role == Role::Customer);
    let messages = state
        .messages
        .iter()
        .filter(|(tid, _)| *tid == ticket_id)
        .map(|(_, m)| m.clone())
        .filter(|m| !customer || m.message_type == MessageType::Resolution)
        .collect();
    Json(messages)
}

#[derive(Deserialize)]
struct CreateTicketForm {
    title: String,
    description: String,
    customer_id: i64,
}

async fn create_ticket(
    State(state): State<Shared>,
    Form(form): Form<CreateTicketForm>,
) -> StatusCode {
    let mut state = state.lock().unwrap();
    let Some(customer) = state.user_ref(form.customer_id) else {
        return StatusCode::BAD_REQUEST;
    };
    state.next_ticket_id += 1;
    let ticket = Ticket {
        id: state.next_ticket_id,
        title: form.title,
        description: form.description,
        status: TicketStatus::Open,
        created_at: Utc::now(),
        customer,
        business: None,
        vendor: None,
    };
    state.tickets.push(ticket);
    StatusCode::OK
}

#[derive(Deserialize)]
struct AssignForm {
    business_id: i64,
}

async fn assign_ticket(
    State(state): State<Shared>,
    Path(ticket_id): Path<i64>,
    Form(form): Form<AssignForm>,
) -> StatusCode {
    let mut state = state.lock().unwrap();
    let Some(business) = state.user_ref(form.business_id) else {
        return StatusCode::BAD_REQUEST;
    };
    let Some(ticket) = state.tickets.iter_mut().find(|t| t.id == ticket_id) else {
        return StatusCode::BAD_REQUEST;
    };
    ticket.business = Some(business);
    ticket.status = TicketStatus::BusinessAssigned;
    StatusCode::OK
}

#[derive(Deserialize)]
struct ContactVendorForm {
    vendor_id: i64,
    message: String,
}

async fn contact_vendor(
    State(state): State<Shared>,
    Path(ticket_id): Path<i64>,
    Form(form): Form<ContactVendorForm>,
) -> StatusCode {
    let mut state = state.lock().unwrap();
    let Some(vendor) = state.user_ref(form.vendor_id) else {
        return StatusCode::BAD_REQUEST;
    };
    let Some(ticket) = state.tickets.iter_mut().find(|t| t.id == ticket_id) else {
        return StatusCode::BAD_REQUEST;
    };
    ticket.vendor = Some(vendor);
    ticket.status = TicketStatus::VendorContacted;
    let business_id = ticket.business.as_ref().map(|b| b.id).unwrap_or_default();
    state.push_message(
        ticket_id,
        business_id,
        Some(form.vendor_id),
        &form.message,
        MessageType::VendorRequest,
    );
    StatusCode::OK
}

#[derive(Deserialize)]
struct SendMessageForm {
    sender_id: i64,
    content: String,
}

async fn send_message(
    State(state): State<Shared>,
    Path(ticket_id): Path<i64>,
    Form(form): Form<SendMessageForm>,
) -> StatusCode {
    let mut state = state.lock().unwrap();
    let Some(sender) = state.user(form.sender_id).cloned() else {
        return StatusCode::BAD_REQUEST;
    };
    let Some(ticket) = state.tickets.iter_mut().find(|t| t.id == ticket_id) else {
        return StatusCode::BAD_REQUEST;
    };
    let (recipient, message_type) = match sender.role {
        Role::Business => (
            ticket.vendor.as_ref().map(|v| v.id),
            MessageType::Other("business_to_vendor".into()),
        ),
        Role::Vendor => {
            // The vendor's first reply after contact is what moves the
            // ticket forward; the client never requests this.
            if ticket.status == TicketStatus::VendorContacted {
                ticket.status = TicketStatus::VendorResponded;
            }
            (
                ticket.business.as_ref().map(|b| b.id),
                MessageType::Other("vendor_to_business".into()),
            )
        }
        Role::Customer => return StatusCode::BAD_REQUEST,
    };
    state.push_message(ticket_id, form.sender_id, recipient, &form.content, message_type);
    StatusCode::OK
}

#[derive(Deserialize)]
struct ResolveForm {
    business_id: i64,
    resolution: String,
}

async fn resolve_ticket(
    State(state): State<Shared>,
    Path(ticket_id): Path<i64>,
    Form(form): Form<ResolveForm>,
) -> StatusCode {
    let mut state = state.lock().unwrap();
    let Some(ticket) = state.tickets.iter_mut().find(|t| t.id == ticket_id) else {
        return StatusCode::BAD_REQUEST;
    };
    if ticket.business.as_ref().map(|b| b.id) != Some(form.business_id) {
        return StatusCode::BAD_REQUEST;
    }
    ticket.status = TicketStatus::Resolved;
    let customer_id = ticket.customer.id;
    state.push_message(
        ticket_id,
        form.business_id,
        Some(customer_id),
        &form.resolution,
        MessageType::Resolution,
    );
    StatusCode::OK
}

pub fn triage_router(state: Shared) -> Router {
    Router::new()
        .route("/users", get(get_users))
        .route("/tickets", post(create_ticket))
        .route("/tickets/{user_id}", get(get_tickets))
        .route("/tickets/{ticket_id}/messages", get(get_messages))
        .route("/tickets/{ticket_id}/assign", post(assign_ticket))
        .route("/tickets/{ticket_id}/contact-vendor", post(contact_vendor))
        .route("/tickets/{ticket_id}/send-message", post(send_message))
        .route("/tickets/{ticket_id}/resolve", post(resolve_ticket))
        .with_state(state)
}

/// Spawns the mock triage API on a random local port.
pub async fn spawn_triage_server(state: Shared) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, triage_router(state)).await.unwrap();
    });

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    addr
}
