//! # gbot-core
//!
//! Core types for the GroupMe bot library: the parsed data model ([`Group`], [`Member`],
//! [`Attachment`], [`Callback`]) and its shape parsers, relay [`Event`]s and the [`Handler`]
//! trait, the [`Bot`] trait, errors, and tracing initialization.

pub mod bot;
pub mod error;
pub mod event;
pub mod logger;
pub mod types;

pub use bot::Bot;
pub use error::{GbotError, ParseError, ProtocolError, Result};
pub use event::{handler_fn, Event, EventKind, FnHandler, Handler};
pub use logger::init_tracing;
pub use types::{
    parse_attachment, parse_callback, parse_group, parse_member, Attachment, Callback, Group,
    Member, SenderType,
};
