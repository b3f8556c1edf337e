//! # RSVP Relay Server
//!
//! Accepts guest replies over HTTP and forwards them to the event
//! administrators through a Telegram bot.
//!
//! ## Example
//! ```no_run
//! use rsvp_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(8080)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result, anyhow};
use axum::Router;
use axum_server::Handle;
use rsvp_domain::config::ApiConfig;
use rsvp_kernel::server::{ApiState, mark_started};
use rsvp_notify::{Messenger, Notifier};
use rsvp_telegram::{TelegramClient, UpdatePoller};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

const GRACE_PERIOD: Duration = Duration::from_secs(30);

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
    messenger: Option<Arc<dyn Messenger>>,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Delivers notifications through `messenger` instead of the Telegram bot.
    ///
    /// The update poller is not started in this mode.
    pub fn messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    warn!(
                        "SECURITY: SSL Private Key {} has insecure permissions (should be 600)",
                        ssl.key.display()
                    );
                }
            }
        }
        Ok(())
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Validates SSL files and the required settings
    /// 2. Creates the Telegram client (unless a messenger was injected)
    /// 3. Builds the notifier and registers it as a feature slice
    /// 4. Prepares the update poller
    ///
    /// # Errors
    /// Returns an error if:
    /// * SSL certificate/key files are missing
    /// * The bot token or the administrator allow-list is missing
    /// * Telegram is disabled and no messenger was injected
    pub async fn build(self) -> Result<Server> {
        // Both ring (reqwest) and aws-lc-rs (axum-server) are linked; pick one for the process.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        self.validate_ssl_config()?;

        let mut cfg = self.cfg;
        if self.messenger.is_some() {
            cfg.telegram.enabled = false;
        }
        rsvp_kernel::config::validate(&cfg).context("Critical: configuration is incomplete")?;

        let address = SocketAddr::new(cfg.server.address, cfg.server.port);
        info!(address = %address, "Initializing server");

        let client = if cfg.telegram.enabled {
            Some(TelegramClient::new(&cfg.telegram).context("Failed to create Telegram client")?)
        } else {
            None
        };

        let messenger: Arc<dyn Messenger> = match (self.messenger, &client) {
            (Some(messenger), _) => messenger,
            (None, Some(client)) => Arc::new(client.clone()),
            (None, None) => {
                return Err(anyhow!("telegram.enabled is false and no messenger was provided"));
            },
        };

        let notify_slice = rsvp_notify::init(&cfg, messenger).context("Notifier bootstrap failed")?;
        let telegram = cfg.telegram.clone();

        let state = ApiState::builder()
            .config(cfg)
            .register_slice(notify_slice)
            .build()
            .context("Failed to finalize API state registry")?;

        let poller = match client {
            Some(client) => {
                let notifier = state.try_get_slice::<Notifier>().context("Notify slice missing")?.clone();
                Some(UpdatePoller::new(client, notifier, &telegram))
            },
            None => None,
        };

        Ok(Server { state, poller })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
    poller: Option<UpdatePoller>,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Starts the poller and the HTTP(S) listener; runs until a shutdown signal.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address
    /// or if SSL/TLS setup fails.
    pub async fn run(self) -> Result<()> {
        mark_started();
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        info!(
            address = %address,
            ssl = cfg.server.ssl.is_some(),
            slices = ?self.state.slice_names().collect::<Vec<_>>(),
            "Starting server"
        );

        let app = router::init(self.state);

        let (stop_poller, poller_shutdown) = watch::channel(false);
        let poller = self.poller.map(|poller| tokio::spawn(poller.run(poller_shutdown)));

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            let _ = stop_poller.send(true);
            shutdown_handle.graceful_shutdown(Some(GRACE_PERIOD));
        });

        let served = serve(app, address, &cfg, handle).await;

        if let Some(task) = poller {
            if let Err(e) = task.await {
                warn!("Telegram poller ended abnormally: {e}");
            }
        }

        served?;
        info!("Server shutdown complete");
        Ok(())
    }

    /// Router with every slice mounted, for in-process use.
    #[must_use]
    pub fn router(&self) -> Router {
        router::init(self.state.clone())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

async fn serve(app: Router, address: SocketAddr, cfg: &ApiConfig, handle: Handle<SocketAddr>) -> Result<()> {
    if let Some(ssl_config) = &cfg.server.ssl {
        info!("Starting HTTPS server on https://{address}");

        let tls_config =
            axum_server::tls_rustls::RustlsConfig::from_pem_file(&ssl_config.cert, &ssl_config.key)
                .await
                .context("Failed to load SSL/TLS certificates")?;

        axum_server::bind_rustls(address, tls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("HTTPS server failed")
    } else {
        info!("Starting HTTP server on http://{address}");

        axum_server::bind(address)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("HTTP server failed")
    }
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
