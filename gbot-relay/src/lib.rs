//! # gbot-relay
//!
//! Receives GroupMe webhooks without a publicly reachable server: a tunnel client pulls
//! webhook traffic from a public relay URL into a local listener, which parses each body and
//! republishes it as typed [`gbot_core::Event`]s. Also holds the bot's [`BotConfig`].

mod config;
mod listener;
mod relay;
mod sse;
mod tunnel;

pub use config::BotConfig;
pub use listener::{create_router, dispatch_callback, SharedRegistry};
pub use relay::EventRelay;
pub use tunnel::{SmeeTunnel, Tunnel};
