//! Bot configuration: credentials, relay URL and local port.
//! Loaded from the environment (BOT_ID, ACCESS_TOKEN, RELAY_URL, PORT, optional LOG_FILE) or
//! built directly with [`BotConfig::new`].

use std::env;
use std::fmt;

use gbot_core::{GbotError, Result};
use groupme_client::{mask_token, GroupMeClient};

/// Everything a bot needs. No value is checked here: a malformed relay URL or an unusable port
/// only surfaces when the relay starts.
#[derive(Clone)]
pub struct BotConfig {
    pub bot_id: String,
    pub access_token: String,
    /// Public relay endpoint the platform's webhook points at.
    pub relay_url: String,
    /// Local port for the webhook listener.
    pub port: u16,
    pub log_file: Option<String>,
}

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|_| GbotError::Config(format!("{} not set", name)))
}

impl BotConfig {
    pub fn new(bot_id: String, access_token: String, relay_url: String, port: u16) -> Self {
        Self {
            bot_id,
            access_token,
            relay_url,
            port,
            log_file: None,
        }
    }

    /// Loads from environment variables. BOT_ID, ACCESS_TOKEN, RELAY_URL and PORT are required;
    /// LOG_FILE is optional.
    pub fn from_env() -> Result<Self> {
        let bot_id = required("BOT_ID")?;
        let access_token = required("ACCESS_TOKEN")?;
        let relay_url = required("RELAY_URL")?;
        let port_raw = required("PORT")?;
        let port = port_raw
            .parse::<u16>()
            .map_err(|_| GbotError::Config(format!("PORT is not a port number: {}", port_raw)))?;
        let log_file = env::var("LOG_FILE").ok();

        Ok(Self {
            bot_id,
            access_token,
            relay_url,
            port,
            log_file,
        })
    }

    pub fn with_log_file(mut self, log_file: String) -> Self {
        self.log_file = Some(log_file);
        self
    }

    /// REST client holding this config's credentials.
    pub fn client(&self) -> GroupMeClient {
        GroupMeClient::new(self.access_token.clone(), self.bot_id.clone())
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_id", &self.bot_id)
            .field("access_token", &mask_token(&self.access_token))
            .field("relay_url", &self.relay_url)
            .field("port", &self.port)
            .field("log_file", &self.log_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in ["BOT_ID", "ACCESS_TOKEN", "RELAY_URL", "PORT", "LOG_FILE"] {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_new_has_no_log_file() {
        let config = BotConfig::new(
            "bot".to_string(),
            "token".to_string(),
            "https://smee.io/abc".to_string(),
            3000,
        );
        assert_eq!(config.port, 3000);
        assert!(config.log_file.is_none());
        assert_eq!(config.client().bot_id(), "bot");
    }

    #[test]
    fn test_debug_masks_access_token() {
        let config = BotConfig::new(
            "bot".to_string(),
            "abcdefghijklmnopqrstuvwxyz".to_string(),
            "https://smee.io/abc".to_string(),
            3000,
        );
        let text = format!("{:?}", config);
        assert!(!text.contains("abcdefghijklmnopqrstuvwxyz"));
        assert!(text.contains("abcdefg***wxyz"));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        env::set_var("BOT_ID", "bot_1");
        env::set_var("ACCESS_TOKEN", "token_1");
        env::set_var("RELAY_URL", "https://smee.io/xyz");
        env::set_var("PORT", "8080");

        let config = BotConfig::from_env().unwrap();

        assert_eq!(config.bot_id, "bot_1");
        assert_eq!(config.access_token, "token_1");
        assert_eq!(config.relay_url, "https://smee.io/xyz");
        assert_eq!(config.port, 8080);
        assert!(config.log_file.is_none());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_variable() {
        clear_env();
        env::set_var("BOT_ID", "bot_1");

        let err = BotConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("ACCESS_TOKEN not set"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_bad_port() {
        clear_env();
        env::set_var("BOT_ID", "bot_1");
        env::set_var("ACCESS_TOKEN", "token_1");
        env::set_var("RELAY_URL", "https://smee.io/xyz");
        env::set_var("PORT", "eighty");

        let err = BotConfig::from_env().unwrap_err();
        assert!(matches!(err, GbotError::Config(_)));
        clear_env();
    }
}
