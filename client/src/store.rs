//! HTTP client for the triage REST API.
//!
//! All mutation endpoints are fire-and-refetch rather than optimistic-update:
//! the server is the single source of truth, so a successful mutation is
//! followed by the owning view refreshing whatever it displays, and a failed
//! one needs no rollback because nothing was changed locally.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ClientError;
use crate::models::{Message, Ticket, User};

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Operations of the triage REST API as consumed by the role views.
///
/// Read operations never fail: any transport, decode, or application error
/// is logged and collapsed to an empty list so rendering always has
/// something to show. Mutations report failure so the caller can leave its
/// form state untouched for a manual retry.
#[async_trait]
pub trait TriageApi: Send + Sync {
    /// Tickets visible to `user_id`, in server order.
    async fn list_tickets(&self, user_id: i64) -> Vec<Ticket>;

    /// All provisioned users.
    async fn list_users(&self) -> Vec<User>;

    /// Thread for one ticket, filtered server-side by requester identity.
    async fn list_messages(&self, ticket_id: i64, user_id: i64) -> Vec<Message>;

    async fn create_ticket(
        &self,
        customer_id: i64,
        title: &str,
        description: &str,
    ) -> Result<(), ClientError>;

    async fn assign_ticket(&self, ticket_id: i64, business_id: i64) -> Result<(), ClientError>;

    async fn contact_vendor(
        &self,
        ticket_id: i64,
        vendor_id: i64,
        message: &str,
    ) -> Result<(), ClientError>;

    async fn send_message(
        &self,
        ticket_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<(), ClientError>;

    async fn resolve_ticket(
        &self,
        ticket_id: i64,
        business_id: i64,
        resolution: &str,
    ) -> Result<(), ClientError>;
}

pub struct TicketStore {
    http: Client,
    base: Url,
}

impl TicketStore {
    /// Builds a store against the configured `API_BASE_URL`.
    pub fn new() -> Result<Self, ClientError> {
        Self::build(
            &common::config::api_base_url(),
            Duration::from_secs(common::config::http_timeout_seconds()),
        )
    }

    /// Builds a store against an explicit origin, with the default timeout.
    pub fn with_base_url(base: &str) -> Result<Self, ClientError> {
        Self::build(base, DEFAULT_HTTP_TIMEOUT)
    }

    fn build(base: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base: Url::parse(base)?,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base.as_str().trim_end_matches('/'), path)
    }

    async fn fetch_list<T>(&self, url: String, what: &'static str) -> Vec<T>
    where
        T: DeserializeOwned,
    {
        match self.try_fetch_list(&url).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, what, url = %url, "read failed; falling back to empty list");
                Vec::new()
            }
        }
    }

    async fn try_fetch_list<T>(&self, url: &str) -> Result<Vec<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Rejected { status });
        }
        // Decode by hand so a non-sequence body surfaces as Decode, not a
        // partially consumed response.
        let body = resp.text().await?;
        Ok(serde_json::from_str::<Vec<T>>(&body)?)
    }

    async fn post_form(&self, path: &str, form: &[(&str, String)]) -> Result<(), ClientError> {
        let resp = self.http.post(self.endpoint(path)).form(form).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::Rejected { status })
        }
    }
}

#[async_trait]
impl TriageApi for TicketStore {
    async fn list_tickets(&self, user_id: i64) -> Vec<Ticket> {
        self.fetch_list(self.endpoint(&format!("tickets/{user_id}")), "tickets")
            .await
    }

    async fn list_users(&self) -> Vec<User> {
        self.fetch_list(self.endpoint("users"), "users").await
    }

    async fn list_messages(&self, ticket_id: i64, user_id: i64) -> Vec<Message> {
        self.fetch_list(
            self.endpoint(&format!("tickets/{ticket_id}/messages?user_id={user_id}")),
            "messages",
        )
        .await
    }

    async fn create_ticket(
        &self,
        customer_id: i64,
        title: &str,
        description: &str,
    ) -> Result<(), ClientError> {
        self.post_form(
            "tickets",
            &[
                ("title", title.to_owned()),
                ("description", description.to_owned()),
                ("customer_id", customer_id.to_string()),
            ],
        )
        .await
    }

    async fn assign_ticket(&self, ticket_id: i64, business_id: i64) -> Result<(), ClientError> {
        self.post_form(
            &format!("tickets/{ticket_id}/assign"),
            &[("business_id", business_id.to_string())],
        )
        .await
    }

    async fn contact_vendor(
        &self,
        ticket_id: i64,
        vendor_id: i64,
        message: &str,
    ) -> Result<(), ClientError> {
        self.post_form(
            &format!("tickets/{ticket_id}/contact-vendor"),
            &[
                ("vendor_id", vendor_id.to_string()),
                ("message", message.to_owned()),
            ],
        )
        .await
    }

    async fn send_message(
        &self,
        ticket_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<(), ClientError> {
        self.post_form(
            &format!("tickets/{ticket_id}/send-message"),
            &[
                ("sender_id", sender_id.to_string()),
                ("content", content.to_owned()),
            ],
        )
        .await
    }

    async fn resolve_ticket(
        &self,
        ticket_id: i64,
        business_id: i64,
        resolution: &str,
    ) -> Result<(), ClientError> {
        self.post_form(
            &format!("tickets/{ticket_id}/resolve"),
            &[
                ("business_id", business_id.to_string()),
                ("resolution", resolution.to_owned()),
            ],
        )
        .await
    }
}
