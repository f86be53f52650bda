//! Server-sent-event plumbing for order status updates.
//!
//! Connected clients register a session against their user id; when the engine accepts a status transition, the
//! matching sessions each receive one `orderStatusUpdated` frame. Delivery is at-most-once. Clients that miss a
//! frame (disconnects, full buffers) are expected to re-fetch their order list, so a lost frame costs latency,
//! never correctness.

use std::{
    collections::HashMap,
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use bytes::Bytes;
use foodflow_engine::{
    db_types::UserId,
    events::{EventHooks, OrderStatusChangedEvent},
};
use futures::Stream;
use log::*;
use serde_json::json;
use tokio::sync::mpsc;

/// How many undelivered frames a single session may buffer before new frames are dropped for it.
const SESSION_BUFFER_SIZE: usize = 16;

/// The registry of connected SSE sessions, keyed by user id. A user may hold several sessions at once (multiple
/// tabs or devices); every one of them receives every update for that user's orders.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<UserId, Vec<mpsc::Sender<Bytes>>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session for `user_id` and returns the stream of frames to hand to the HTTP response.
    pub fn subscribe(&self, user_id: UserId) -> EventStream {
        let (tx, rx) = mpsc::channel(SESSION_BUFFER_SIZE);
        let mut sessions = self.sessions.lock().unwrap();
        let entry = sessions.entry(user_id).or_default();
        entry.push(tx);
        debug!("📬️ User {user_id} subscribed to order updates. {} active session(s).", entry.len());
        EventStream { receiver: rx }
    }

    /// Pushes a status-change frame to every session belonging to the order's owner. Sessions whose client has
    /// gone away are pruned here.
    pub fn notify_status_changed(&self, event: &OrderStatusChangedEvent) {
        let frame = status_frame(event);
        let user_id = event.order.user_id;
        let mut sessions = self.sessions.lock().unwrap();
        let Some(senders) = sessions.get_mut(&user_id) else {
            trace!("📬️ No active sessions for user {user_id}. Dropping status update.");
            return;
        };
        senders.retain(|tx| match tx.try_send(frame.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("📬️ A session for user {user_id} is not keeping up. Dropping a status frame for it.");
                true
            },
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
        if senders.is_empty() {
            sessions.remove(&user_id);
        }
    }

    /// The number of live sessions for a user. Primarily for diagnostics.
    pub fn session_count(&self, user_id: UserId) -> usize {
        self.sessions.lock().unwrap().get(&user_id).map(Vec::len).unwrap_or_default()
    }
}

fn status_frame(event: &OrderStatusChangedEvent) -> Bytes {
    let data = json!({ "orderId": event.order.id, "status": event.new_status() }).to_string();
    Bytes::from(format!("event: orderStatusUpdated\ndata: {data}\n\n"))
}

/// A stream of SSE frames for one connected session. Dropping the stream (client disconnect) closes the channel
/// and the registry prunes the session on the next notification.
pub struct EventStream {
    receiver: mpsc::Receiver<Bytes>,
}

impl Stream for EventStream {
    type Item = Result<Bytes, actix_web::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx).map(|item| item.map(Ok))
    }
}

/// Builds the engine event hooks that feed the session registry.
pub fn status_event_hooks(registry: SessionRegistry) -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_status_changed(move |event| {
        let registry = registry.clone();
        Box::pin(async move {
            info!("📬️ Order {} moved from {} to {}", event.order.id, event.old_status, event.new_status());
            registry.notify_status_changed(&event);
        })
    });
    hooks
}
