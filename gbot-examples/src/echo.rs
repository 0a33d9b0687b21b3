//! Echo bot: replies "Echo: <text>" to every user message until Ctrl-C.
//! Config from env / .env: BOT_ID, ACCESS_TOKEN, RELAY_URL, PORT, optional LOG_FILE.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use gbot_core::{handler_fn, init_tracing, Bot, Event, EventKind, Handler};
use gbot_relay::{BotConfig, EventRelay};
use tracing::{error, info};

struct EchoHandler {
    bot: Arc<dyn Bot>,
}

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(&self, event: &Event) -> gbot_core::Result<()> {
        let Some(callback) = event.callback() else {
            return Ok(());
        };
        let Some(text) = callback.text.as_deref() else {
            return Ok(());
        };

        info!(
            group_id = ?callback.group_id,
            sender_id = ?callback.sender_id,
            message_content = %text,
            "Echoing message"
        );
        match self.bot.send_message(&format!("Echo: {}", text)).await {
            Ok(_) => info!(group_id = ?callback.group_id, "Sent echo response"),
            Err(e) => error!(group_id = ?callback.group_id, error = %e, "Failed to send echo"),
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = BotConfig::from_env()?;
    init_tracing(config.log_file.as_deref())?;

    let bot: Arc<dyn Bot> = Arc::new(config.client());
    let mut relay = EventRelay::new(config.clone());
    relay
        .on(
            EventKind::Ready,
            Arc::new(handler_fn(|_event: Event| async {
                info!(start_time = %Local::now().format("%Y-%m-%d %H:%M:%S"), "Echo Bot ready");
                Ok::<(), gbot_core::GbotError>(())
            })),
        )
        .on(EventKind::UserMessage, Arc::new(EchoHandler { bot }));

    relay.start().await?;
    info!(port = config.port, relay_url = %config.relay_url, "Echo Bot started");

    tokio::signal::ctrl_c().await?;
    relay.shutdown().await?;
    info!("Echo Bot stopped");
    Ok(())
}
