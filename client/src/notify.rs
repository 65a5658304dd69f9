//! Server-pushed notification stream.
//!
//! One managed connection per user session (`/ws/{userId}`). The connection
//! lives in a background task that fans parsed events out over a broadcast
//! channel and reconnects with capped exponential backoff, so views keep
//! their last known good state through an outage and pick up invalidation
//! signals again once the server is back. The client never sends a frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsFrame;

use crate::models::TicketStatus;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A push-delivered signal instructing the client to invalidate and refresh
/// cached state.
///
/// Payload fields beyond `ticket_id` are advisory. `status` is the pushed
/// new status when the server includes it; views may apply it immediately
/// but still refetch, since the server remains the only authority.
/// Unrecognized tags parse to `Unknown` and are dropped without error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    NewTicket {
        ticket_id: i64,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        customer: Option<String>,
        #[serde(default)]
        status: Option<TicketStatus>,
    },
    TicketAssigned {
        ticket_id: i64,
        #[serde(default)]
        business: Option<String>,
        #[serde(default)]
        status: Option<TicketStatus>,
    },
    VendorContacted {
        ticket_id: i64,
        #[serde(default)]
        vendor: Option<String>,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        status: Option<TicketStatus>,
    },
    VendorResponse {
        ticket_id: i64,
        #[serde(default)]
        status: Option<TicketStatus>,
    },
    NewMessage {
        ticket_id: i64,
        #[serde(default)]
        sender: Option<String>,
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        status: Option<TicketStatus>,
    },
    TicketResolved {
        ticket_id: i64,
        #[serde(default)]
        resolution: Option<String>,
        #[serde(default)]
        status: Option<TicketStatus>,
    },
    #[serde(other)]
    Unknown,
}

/// Reconnect pacing for the notification connection.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(500),
            max: Duration::from_secs(30),
        }
    }
}

impl Backoff {
    pub fn from_config() -> Self {
        Self {
            base: Duration::from_millis(common::config::ws_reconnect_base_ms()),
            max: Duration::from_millis(common::config::ws_reconnect_max_ms()),
        }
    }
}

/// Delay before reconnect attempt `attempt` (0-based): `base * 2^attempt`,
/// capped at `max`.
pub fn backoff_delay(attempt: u32, backoff: Backoff) -> Duration {
    let factor = 1u32 << attempt.min(16);
    backoff.base.saturating_mul(factor).min(backoff.max)
}

/// Managed notification subscription for one user session.
///
/// Reference-counted across views: each `subscribe()` hands out an
/// independent receiver, and once every receiver has been dropped the
/// connection task stops instead of reconnecting. `shutdown()` stops it
/// explicitly.
pub struct NotificationHub {
    events: broadcast::Sender<Notification>,
    stop: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl NotificationHub {
    /// Connects against the configured `WS_BASE_URL` for `user_id`.
    pub fn connect(user_id: i64) -> Self {
        Self::spawn(common::config::ws_base_url(), user_id, Backoff::from_config())
    }

    /// Connects against an explicit origin with default pacing.
    pub fn with_endpoint(ws_base: &str, user_id: i64) -> Self {
        Self::spawn(ws_base.to_owned(), user_id, Backoff::default())
    }

    /// Connects against an explicit origin with explicit pacing.
    pub fn with_backoff(ws_base: &str, user_id: i64, backoff: Backoff) -> Self {
        Self::spawn(ws_base.to_owned(), user_id, backoff)
    }

    fn spawn(ws_base: String, user_id: i64, backoff: Backoff) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let url = format!("{}/ws/{}", ws_base.trim_end_matches('/'), user_id);
        let task = tokio::spawn(run_connection(url, events.clone(), stop.clone(), backoff));
        Self { events, stop, task }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }

    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.task.abort();
    }
}

async fn run_connection(
    url: String,
    events: broadcast::Sender<Notification>,
    stop: Arc<AtomicBool>,
    backoff: Backoff,
) {
    let mut attempt: u32 = 0;
    let mut saw_subscriber = false;

    loop {
        if stop.load(Ordering::SeqCst) {
            return;
        }
        if events.receiver_count() > 0 {
            saw_subscriber = true;
        } else if saw_subscriber {
            tracing::debug!(url = %url, "all subscribers gone; closing notification stream");
            return;
        }

        match connect_async(url.as_str()).await {
            Ok((mut socket, _response)) => {
                tracing::info!(url = %url, "notification stream connected");
                attempt = 0;

                while let Some(frame) = socket.next().await {
                    if stop.load(Ordering::SeqCst) {
                        return;
                    }
                    match frame {
                        Ok(WsFrame::Text(text)) => {
                            match serde_json::from_str::<Notification>(text.as_str()) {
                                Ok(Notification::Unknown) => {
                                    tracing::debug!("ignoring unrecognized notification type");
                                }
                                Ok(event) => {
                                    // Send only fails when nobody is listening.
                                    let _ = events.send(event);
                                }
                                Err(e) => {
                                    tracing::warn!(error = %e, "dropping unparseable notification frame");
                                }
                            }
                        }
                        Ok(WsFrame::Close(_)) => break,
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!(error = %e, "notification stream error");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, url = %url, "notification connect failed");
            }
        }

        if stop.load(Ordering::SeqCst) {
            return;
        }
        let delay = backoff_delay(attempt, backoff);
        attempt = attempt.saturating_add(1);
        tokio::time::sleep(delay).await;
    }
}
