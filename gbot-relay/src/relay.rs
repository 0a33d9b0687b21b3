//! [`EventRelay`]: owns the tunnel and the local listener and republishes webhooks as events.
//!
//! States: `Stopped` (initial) and `Listening`. [`EventRelay::start`] binds the listener, starts
//! the tunnel towards it, and emits `ready`; [`EventRelay::shutdown`] closes both and returns to
//! `Stopped`.

use std::net::SocketAddr;
use std::sync::Arc;

use gbot_core::{Event, EventKind, GbotError, Handler, Result};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::config::BotConfig;
use crate::listener::{create_router, snapshot, SharedRegistry};
use crate::tunnel::{SmeeTunnel, Tunnel};

struct Listening {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    server: JoinHandle<std::io::Result<()>>,
}

enum RelayState {
    Stopped,
    Listening(Listening),
}

/// Relay from a public webhook URL to typed events.
///
/// Handlers registered with [`EventRelay::on`] take effect immediately, also while listening.
/// Events emitted before a handler was registered are not replayed to it.
pub struct EventRelay {
    config: BotConfig,
    registry: SharedRegistry,
    tunnel: Option<Box<dyn Tunnel>>,
    state: RelayState,
}

impl EventRelay {
    /// Relay using the default [`SmeeTunnel`] on `config.relay_url`, created at start.
    pub fn new(config: BotConfig) -> Self {
        Self {
            config,
            registry: SharedRegistry::default(),
            tunnel: None,
            state: RelayState::Stopped,
        }
    }

    /// Relay using a caller-provided tunnel.
    pub fn with_tunnel(config: BotConfig, tunnel: Box<dyn Tunnel>) -> Self {
        Self {
            tunnel: Some(tunnel),
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Appends a handler for `kind`.
    pub fn on(&mut self, kind: EventKind, handler: Arc<dyn Handler>) -> &mut Self {
        self.registry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .register(kind, handler);
        self
    }

    pub fn is_listening(&self) -> bool {
        matches!(self.state, RelayState::Listening(_))
    }

    /// Address the listener is bound to while listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            RelayState::Listening(listening) => Some(listening.local_addr),
            RelayState::Stopped => None,
        }
    }

    /// Stopped → Listening. Binds `0.0.0.0:<port>`, starts the tunnel towards
    /// `http://localhost:<bound port>`, serves `POST /`, then emits `ready`.
    #[instrument(skip(self), fields(port = self.config.port))]
    pub async fn start(&mut self) -> Result<()> {
        if self.is_listening() {
            return Err(GbotError::Relay("relay is already listening".to_string()));
        }

        let listener = TcpListener::bind(("0.0.0.0", self.config.port)).await?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "step: listener bound");

        let target = format!("http://localhost:{}", local_addr.port());
        let relay_url = self.config.relay_url.clone();
        let tunnel = self
            .tunnel
            .get_or_insert_with(|| -> Box<dyn Tunnel> {
                Box::new(SmeeTunnel::new(relay_url).quiet(true))
            });
        tunnel.start(&target).await?;
        info!(relay_url = %self.config.relay_url, target = %target, "step: tunnel started");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = create_router(self.registry.clone());
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        self.state = RelayState::Listening(Listening {
            local_addr,
            shutdown_tx,
            server,
        });
        info!(addr = %local_addr, "Relay listening");

        snapshot(&self.registry).emit(&Event::Ready).await;
        Ok(())
    }

    /// Listening → Stopped: stops the listener, closes the tunnel. No-op when stopped.
    #[instrument(skip(self))]
    pub async fn shutdown(&mut self) -> Result<()> {
        let listening = match std::mem::replace(&mut self.state, RelayState::Stopped) {
            RelayState::Listening(listening) => listening,
            RelayState::Stopped => return Ok(()),
        };

        let _ = listening.shutdown_tx.send(());
        if let Some(tunnel) = self.tunnel.as_mut() {
            tunnel.close().await?;
        }

        match listening.server.await {
            Ok(Ok(())) => {
                info!(addr = %listening.local_addr, "Relay stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                error!(error = %e, "Listener stopped with error");
                Err(e.into())
            }
            Err(e) => Err(GbotError::Relay(format!("listener task failed: {}", e))),
        }
    }
}
