//! # Event registry
//!
//! Maps each [`EventKind`] to an ordered list of handlers. [`EventRegistry::emit`] runs the
//! handlers registered for the event's kind one after another in registration order. There is
//! no replay: a handler registered after an emission never sees it.

use std::collections::HashMap;
use std::sync::Arc;

use gbot_core::{Event, EventKind, Handler};
use tracing::{debug, error, info, instrument};

/// Registry of handlers keyed by event kind.
#[derive(Clone, Default)]
pub struct EventRegistry {
    handlers: HashMap<EventKind, Vec<Arc<dyn Handler>>>,
}

impl EventRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Appends a handler for `kind` (builder form).
    pub fn on(mut self, kind: EventKind, handler: Arc<dyn Handler>) -> Self {
        self.register(kind, handler);
        self
    }

    /// Appends a handler for `kind` in place.
    pub fn register(&mut self, kind: EventKind, handler: Arc<dyn Handler>) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    /// Number of handlers registered for `kind`.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map(Vec::len).unwrap_or(0)
    }

    /// Runs every handler registered for the event's kind, in order. A failing handler is
    /// logged and the remaining handlers still run. Returns how many handlers were invoked.
    #[instrument(skip(self, event), fields(kind = %event.kind()))]
    pub async fn emit(&self, event: &Event) -> usize {
        let kind = event.kind();
        let Some(handlers) = self.handlers.get(&kind) else {
            debug!("step: no handlers registered");
            return 0;
        };

        for handler in handlers {
            let handler_name = std::any::type_name_of_val(handler.as_ref());
            debug!(handler = %handler_name, "step: handler invoked");
            if let Err(e) = handler.handle(event).await {
                error!(handler = %handler_name, error = %e, "Handler failed");
            }
        }

        info!(handler_count = handlers.len(), "step: event emitted");
        handlers.len()
    }
}

// Unit/integration tests live in tests/event_registry_test.rs
