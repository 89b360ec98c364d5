// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live class activity streaming for front-desk and member UIs.
//!
//! Events are informational: they describe committed changes and the
//! notifications sent for them. Clients read canonical state over HTTP.
//!
//! # Architecture
//!
//! - Events are broadcast to all connected clients
//! - No commands are executed over WebSocket connections
//! - Member notifications are delivered through this stream after commit

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studio_booking::{DispatchError, Notification, NotificationDispatcher, NotificationKind};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Maximum number of events to buffer in the broadcast channel.
/// If clients cannot keep up, older events will be dropped.
const EVENT_BUFFER_SIZE: usize = 100;

/// Live event types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A class was registered.
    ClassCreated {
        /// The class.
        class_id: i64,
    },
    /// A seat was booked.
    BookingConfirmed {
        /// The class.
        class_id: i64,
        /// The member.
        user_id: i64,
        /// The new booking.
        booking_id: i64,
    },
    /// A member joined a waitlist.
    Waitlisted {
        /// The class.
        class_id: i64,
        /// The member.
        user_id: i64,
        /// Their queue position.
        position: u32,
    },
    /// A booking was cancelled.
    BookingCancelled {
        /// The class.
        class_id: i64,
        /// The booking.
        booking_id: i64,
    },
    /// A member left a waitlist.
    LeftWaitlist {
        /// The class.
        class_id: i64,
        /// The removed entry.
        waitlist_id: i64,
    },
    /// A class's occupancy changed through promotion or a capacity change.
    ClassUpdated {
        /// The class.
        class_id: i64,
        /// Confirmed bookings.
        enrolled: u32,
        /// Seat count.
        capacity: u32,
    },
    /// A class was cancelled by the studio.
    ClassCancelled {
        /// The class.
        class_id: i64,
    },
    /// A member checked in.
    CheckedIn {
        /// The class.
        class_id: i64,
        /// The booking.
        booking_id: i64,
    },
    /// Lapsed subscriptions were expired.
    SubscriptionsExpired {
        /// How many.
        count: usize,
    },
    /// A message for one member.
    Notification {
        /// The recipient.
        user_id: i64,
        /// The class concerned.
        class_id: i64,
        /// What happened.
        kind: NotificationKind,
        /// Human-readable text.
        message: String,
    },
    /// Connection confirmation (sent on initial connect).
    Connected {
        /// Server timestamp (ISO 8601).
        timestamp: String,
    },
}

/// Broadcaster for live events.
///
/// A thin wrapper around `tokio::sync::broadcast`; it doubles as the
/// notification dispatcher for the engine.
#[derive(Clone)]
pub struct LiveEventBroadcaster {
    /// The broadcast channel sender.
    tx: broadcast::Sender<LiveEvent>,
}

impl LiveEventBroadcaster {
    /// Creates a new event broadcaster.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Broadcasts an event to all connected clients.
    ///
    /// If no clients are connected, the event is silently dropped.
    /// This is non-blocking and will not wait for clients to receive the event.
    pub fn broadcast(&self, event: &LiveEvent) {
        match self.tx.send(event.clone()) {
            Ok(count) => {
                debug!(?event, receivers = count, "Broadcast live event");
            }
            Err(_) => {
                // No receivers, which is fine
                debug!(?event, "No receivers for live event");
            }
        }
    }

    /// Subscribes to the event stream.
    ///
    /// Returns a receiver that will receive all future events.
    /// Events sent before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }
}

impl Default for LiveEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationDispatcher for LiveEventBroadcaster {
    fn notify(&self, notification: &Notification) -> Result<(), DispatchError> {
        info!(
            user_id = notification.user_id,
            class_id = notification.class_id,
            kind = %notification.kind,
            "Sending notification"
        );
        self.broadcast(&LiveEvent::Notification {
            user_id: notification.user_id,
            class_id: notification.class_id,
            kind: notification.kind,
            message: notification.payload.message.clone(),
        });
        Ok(())
    }
}

/// Upgrades `GET /live` to a WebSocket and streams live events to it.
pub async fn live_events_handler(
    ws: WebSocketUpgrade,
    AxumState(app_state): AxumState<crate::AppState>,
) -> Response {
    let broadcaster: Arc<LiveEventBroadcaster> = Arc::clone(&app_state.live);
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster))
}

/// Handles an individual WebSocket connection.
///
/// Sends a connection confirmation, then streams all live events until
/// the client disconnects or an error occurs.
async fn handle_socket(socket: WebSocket, broadcaster: Arc<LiveEventBroadcaster>) {
    info!("Client connected to live event stream");

    let (mut sender, mut receiver) = socket.split();
    let mut rx: broadcast::Receiver<LiveEvent> = broadcaster.subscribe();

    // Send connection confirmation
    let connected_event = LiveEvent::Connected {
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| String::from("unknown")),
    };

    if let Ok(json) = serde_json::to_string(&connected_event)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    // Task for sending events to the client
    let mut send_task = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        // Client disconnected
                        break;
                    }
                }
                Err(e) => {
                    error!(?e, "Failed to serialize live event");
                }
            }
        }
    });

    // Task for receiving messages from the client (though we don't expect any)
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    // We don't process commands over WebSocket
                    warn!("Received unexpected message from client, ignoring");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Ping/pong handled automatically by Axum
                }
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            debug!("Send task completed");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!("Receive task completed");
            send_task.abort();
        }
    }

    info!("Client disconnected from live event stream");
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use studio_booking::NotificationPayload;
    use time::macros::{date, time};

    fn create_test_notification() -> Notification {
        Notification {
            user_id: 7,
            class_id: 3,
            kind: NotificationKind::WaitlistPromotion,
            payload: NotificationPayload {
                class_name: String::from("Morning Reformer"),
                class_date: date!(2026 - 03 - 10),
                start_time: time!(09:00),
                message: String::from("A seat opened up"),
            },
        }
    }

    #[test]
    fn test_broadcaster_creation() {
        let broadcaster: LiveEventBroadcaster = LiveEventBroadcaster::new();
        assert_eq!(broadcaster.tx.receiver_count(), 0);
    }

    #[test]
    fn test_broadcast_no_receivers() {
        let broadcaster: LiveEventBroadcaster = LiveEventBroadcaster::new();
        broadcaster.broadcast(&LiveEvent::ClassCancelled { class_id: 1 });
    }

    #[test]
    fn test_multiple_receivers() {
        let broadcaster: LiveEventBroadcaster = LiveEventBroadcaster::new();
        let mut rx1: broadcast::Receiver<LiveEvent> = broadcaster.subscribe();
        let mut rx2: broadcast::Receiver<LiveEvent> = broadcaster.subscribe();

        broadcaster.broadcast(&LiveEvent::ClassCreated { class_id: 4 });

        assert_eq!(rx1.try_recv().unwrap(), LiveEvent::ClassCreated { class_id: 4 });
        assert_eq!(rx2.try_recv().unwrap(), LiveEvent::ClassCreated { class_id: 4 });
    }

    #[test]
    fn test_notification_is_streamed() {
        let broadcaster: LiveEventBroadcaster = LiveEventBroadcaster::new();
        let mut rx: broadcast::Receiver<LiveEvent> = broadcaster.subscribe();

        broadcaster.notify(&create_test_notification()).unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            LiveEvent::Notification {
                user_id: 7,
                class_id: 3,
                kind: NotificationKind::WaitlistPromotion,
                message: String::from("A seat opened up"),
            }
        );
    }

    #[test]
    fn test_notify_without_listeners_succeeds() {
        let broadcaster: LiveEventBroadcaster = LiveEventBroadcaster::new();

        assert!(broadcaster.notify(&create_test_notification()).is_ok());
    }

    #[test]
    fn test_event_wire_format() {
        let event: LiveEvent = LiveEvent::Waitlisted {
            class_id: 3,
            user_id: 7,
            position: 2,
        };

        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "waitlisted");
        assert_eq!(json["position"], 2);
    }
}
