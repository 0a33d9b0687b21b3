//! Local webhook listener: one route, `POST /`.
//!
//! The response is always `200` with an empty body. Dispatch runs on its own task, so the
//! webhook is acknowledged without waiting for handlers. Each dispatch works on the handlers
//! registered at the time the webhook arrived.

use std::sync::{Arc, RwLock};

use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Router};
use event_registry::EventRegistry;
use gbot_core::{parse_callback, Event};
use serde_json::Value;
use tracing::{error, warn};

/// Registry shared between the relay, which registers handlers, and the listener.
pub type SharedRegistry = Arc<RwLock<EventRegistry>>;

/// Takes a copy of the current handler set without holding the lock across handler calls.
pub(crate) fn snapshot(registry: &SharedRegistry) -> EventRegistry {
    registry
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Builds the listener's router over the shared registry.
pub fn create_router(registry: SharedRegistry) -> Router {
    Router::new()
        .route("/", post(receive_callback))
        .with_state(registry)
}

async fn receive_callback(
    State(registry): State<SharedRegistry>,
    body: Bytes,
) -> StatusCode {
    match serde_json::from_slice::<Value>(&body) {
        Ok(raw) => {
            let registry = snapshot(&registry);
            tokio::spawn(async move {
                dispatch_callback(&registry, raw).await;
            });
        }
        Err(e) => {
            warn!(error = %e, body_len = body.len(), "Webhook body is not JSON; ignored");
        }
    }
    StatusCode::OK
}

/// Emits `raw_callback` with the body as received, then, if it parses, `callback` followed by
/// the sender-specific event (`user_msg`, `system_msg` or `bot_msg`). An unrecognised sender
/// type gets only `callback`. A parse failure is logged and ends the dispatch.
pub async fn dispatch_callback(registry: &EventRegistry, raw: Value) {
    let parsed = parse_callback(&raw);
    registry.emit(&Event::RawCallback(raw)).await;

    let callback = match parsed {
        Ok(callback) => callback,
        Err(e) => {
            error!(error = %e, "Failed to parse webhook callback");
            return;
        }
    };

    let specific = Event::for_sender(&callback);
    registry.emit(&Event::Callback(callback)).await;
    if let Some(event) = specific {
        registry.emit(&event).await;
    }
}
