//! # GroupMe REST client
//!
//! Thin wrapper around [reqwest] for the GroupMe v3 API: list groups, post as a bot, delete,
//! like and unlike messages, and update the caller's nickname in a group.
//!
//! Every call is a single request. A status code other than the one the endpoint documents
//! is returned as [`gbot_core::ProtocolError`] carrying the expected and actual code; nothing
//! is retried.
//!
//! ```rust,no_run
//! use groupme_client::GroupMeClient;
//!
//! async fn example() -> gbot_core::Result<()> {
//!     let client = GroupMeClient::new("ACCESS_TOKEN".to_string(), "BOT_ID".to_string());
//!     for group in client.find_groups().await? {
//!         println!("{:?}", group.name);
//!     }
//!     client.send_message("hello").await?;
//!     Ok(())
//! }
//! ```

mod client;

pub use client::{GroupMeClient, GROUPME_API_BASE};

/// Masks an access token for safe logging: first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" so no part of the token leaks.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_char_boundary(7) || !token.is_char_boundary(len - 4) {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..7], &token[len - 4..])
    }
}
