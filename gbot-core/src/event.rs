//! Events emitted by the relay and the [`Handler`] trait that consumes them.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{Callback, SenderType};

/// Tag used to subscribe to one kind of [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    RawCallback,
    Callback,
    UserMessage,
    SystemMessage,
    BotMessage,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Ready => "ready",
            EventKind::RawCallback => "raw_callback",
            EventKind::Callback => "callback",
            EventKind::UserMessage => "user_msg",
            EventKind::SystemMessage => "system_msg",
            EventKind::BotMessage => "bot_msg",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The local listener is bound.
    Ready,
    /// Webhook body exactly as received.
    RawCallback(Value),
    /// Every successfully parsed callback.
    Callback(Callback),
    UserMessage(Callback),
    SystemMessage(Callback),
    BotMessage(Callback),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Ready => EventKind::Ready,
            Event::RawCallback(_) => EventKind::RawCallback,
            Event::Callback(_) => EventKind::Callback,
            Event::UserMessage(_) => EventKind::UserMessage,
            Event::SystemMessage(_) => EventKind::SystemMessage,
            Event::BotMessage(_) => EventKind::BotMessage,
        }
    }

    /// Sender-specific event for a callback, chosen by exact match on `sender_type`.
    /// Returns `None` for an absent or unrecognised sender type.
    pub fn for_sender(callback: &Callback) -> Option<Event> {
        match callback.sender_type.as_ref()? {
            SenderType::User => Some(Event::UserMessage(callback.clone())),
            SenderType::System => Some(Event::SystemMessage(callback.clone())),
            SenderType::Bot => Some(Event::BotMessage(callback.clone())),
            SenderType::Other(_) => None,
        }
    }

    /// The typed callback carried by this event, if any.
    pub fn callback(&self) -> Option<&Callback> {
        match self {
            Event::Callback(c)
            | Event::UserMessage(c)
            | Event::SystemMessage(c)
            | Event::BotMessage(c) => Some(c),
            Event::Ready | Event::RawCallback(_) => None,
        }
    }
}

/// Consumer of events. Registered per [`EventKind`]; invoked once per matching emission.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, event: &Event) -> Result<()>;
}

/// [`Handler`] backed by an async closure. Build with [`handler_fn`].
pub struct FnHandler<F> {
    f: F,
}

/// Wraps an async closure `Fn(Event) -> impl Future<Output = Result<()>>` as a [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn handle(&self, event: &Event) -> Result<()> {
        (self.f)(event.clone()).await
    }
}
