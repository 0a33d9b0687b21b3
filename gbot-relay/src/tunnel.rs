//! Tunnel clients that bring webhook traffic from a public relay to the local listener.
//!
//! [`SmeeTunnel`] subscribes to a smee-style relay channel as a Server-Sent-Events stream. Each
//! data event is a JSON envelope holding the original request's headers as top-level string
//! fields plus its `body`; the body is re-posted as JSON to the local target together with the
//! forwardable headers. The stream is consumed until it ends; there is no reconnect.

use async_trait::async_trait;
use futures::StreamExt;
use gbot_core::{GbotError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, Url};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::sse::SseDecoder;

/// Envelope fields that describe the relay hop, not the original request.
const SKIPPED_FIELDS: &[&str] = &[
    "body",
    "query",
    "timestamp",
    "host",
    "content-length",
    "content-type",
    "connection",
];

/// Informational logging that `quiet` demotes to debug. Errors are never demoted.
macro_rules! progress {
    ($quiet:expr, $($arg:tt)+) => {
        if $quiet {
            debug!($($arg)+)
        } else {
            info!($($arg)+)
        }
    };
}

/// A connection from a public relay URL to a local HTTP target.
#[async_trait]
pub trait Tunnel: Send + Sync {
    /// Begins forwarding to `target` (e.g. `http://localhost:3000`). Returns once forwarding
    /// runs in the background.
    async fn start(&mut self, target: &str) -> Result<()>;
    /// Stops forwarding. Closing a tunnel that is not running is a no-op.
    async fn close(&mut self) -> Result<()>;
}

fn tunnel_error(e: impl std::fmt::Display) -> GbotError {
    GbotError::Tunnel(e.to_string())
}

/// Smee-style relay client.
pub struct SmeeTunnel {
    source: String,
    quiet: bool,
    client: Client,
    task: Option<JoinHandle<()>>,
}

#[derive(Clone)]
struct Forwarder {
    client: Client,
    source: Url,
    target: Url,
    quiet: bool,
}

impl SmeeTunnel {
    /// `source` is the relay channel URL. Nothing is validated until [`Tunnel::start`].
    pub fn new(source: String) -> Self {
        Self {
            source,
            quiet: false,
            client: Client::new(),
            task: None,
        }
    }

    /// When set, per-request and connection progress logs at debug instead of info.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    fn forwarder(&self, target: &str) -> Result<Forwarder> {
        let source = Url::parse(&self.source)
            .map_err(|e| GbotError::Tunnel(format!("invalid relay URL {}: {}", self.source, e)))?;
        let target = Url::parse(target)
            .map_err(|e| GbotError::Tunnel(format!("invalid target URL {}: {}", target, e)))?;
        Ok(Forwarder {
            client: self.client.clone(),
            source,
            target,
            quiet: self.quiet,
        })
    }

    /// Forwards in the current task until the relay stream ends.
    pub async fn run(&self, target: &str) -> Result<()> {
        self.forwarder(target)?.run().await
    }
}

#[async_trait]
impl Tunnel for SmeeTunnel {
    async fn start(&mut self, target: &str) -> Result<()> {
        if self.is_running() {
            return Err(GbotError::Tunnel("tunnel already started".to_string()));
        }
        let forwarder = self.forwarder(target)?;
        progress!(self.quiet, source = %self.source, target = %target, "step: tunnel starting");

        self.task = Some(tokio::spawn(async move {
            if let Err(e) = forwarder.run().await {
                error!(source = %forwarder.source, error = %e, "Tunnel stopped with error");
            }
        }));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
            progress!(self.quiet, source = %self.source, "step: tunnel closed");
        }
        Ok(())
    }
}

impl Forwarder {
    async fn run(&self) -> Result<()> {
        let response = self
            .client
            .get(self.source.clone())
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(tunnel_error)?;
        if !response.status().is_success() {
            return Err(GbotError::Tunnel(format!(
                "relay answered {} for {}",
                response.status(),
                self.source
            )));
        }
        progress!(self.quiet, source = %self.source, target = %self.target, "step: tunnel connected");

        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::default();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(tunnel_error)?;
            for event in decoder.push(&chunk) {
                match event.event.as_deref() {
                    Some("ready") | Some("ping") => {
                        debug!(event = ?event.event, "Relay control event");
                    }
                    _ => {
                        if let Err(e) = self.forward(&event.data).await {
                            error!(error = %e, "Failed to forward relay event");
                        }
                    }
                }
            }
        }

        progress!(self.quiet, source = %self.source, "step: tunnel stream ended");
        Ok(())
    }

    /// Re-posts one relay envelope to the target.
    async fn forward(&self, data: &str) -> Result<()> {
        let envelope: Value = serde_json::from_str(data)
            .map_err(|e| GbotError::Tunnel(format!("invalid relay payload: {}", e)))?;
        let Some(fields) = envelope.as_object() else {
            return Err(GbotError::Tunnel("relay payload is not an object".to_string()));
        };
        let Some(body) = fields.get("body") else {
            warn!("Relay payload has no body; skipped");
            return Ok(());
        };

        let mut headers = HeaderMap::new();
        for (key, value) in fields {
            if SKIPPED_FIELDS.contains(&key.to_ascii_lowercase().as_str()) {
                continue;
            }
            let Some(value) = value.as_str() else {
                continue;
            };
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }

        let response = self
            .client
            .post(self.target.clone())
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(tunnel_error)?;
        progress!(
            self.quiet,
            target = %self.target,
            status = response.status().as_u16(),
            "step: relay event forwarded"
        );
        Ok(())
    }
}
