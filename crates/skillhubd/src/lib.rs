//! skillhubd - Skills Hub daemon
//!
//! Forwards named skill calls to WordPress, Notion, GitHub, and Vercel.

pub mod dispatch;
pub mod providers;
pub mod registry;
pub mod server;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use dispatch::Dispatcher;
use eyre::WrapErr;
use providers::Providers;
use registry::SkillRegistry;
use server::AppState;
use skillhub_core::Config;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Interface to bind (default: all interfaces).
    pub host: IpAddr,
    /// HTTP port (default: 8000).
    pub port: u16,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
        }
    }
}

impl HubConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Hub state.
#[derive(Debug)]
pub struct Hub {
    config: HubConfig,
    state: Arc<AppState>,
    shutdown: CancellationToken,
}

impl Hub {
    /// Build the registry and provider clients from the loaded credentials.
    pub fn new(config: HubConfig, credentials: &Config) -> eyre::Result<Self> {
        let providers = Providers::new(credentials).wrap_err("failed to build HTTP client")?;
        let dispatcher = Dispatcher::new(SkillRegistry::new(), providers);

        let configured = credentials.configured_providers();
        for provider in skillhub_core::Provider::ALL {
            if !configured.contains(&provider) {
                warn!(provider = %provider, "credentials not configured; calls will be rejected upstream");
            }
        }

        Ok(Self {
            config,
            state: Arc::new(AppState { dispatcher }),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Serve HTTP until [`Hub::shutdown`] is called.
    pub async fn run(&self) -> eyre::Result<()> {
        let addr = self.config.addr();
        info!("skillhubd starting on {}", addr);
        info!(
            "{} skills registered",
            self.state.dispatcher.registry().len()
        );

        server::start_server(Arc::clone(&self.state), addr, self.shutdown.clone())
            .await
            .wrap_err_with(|| format!("HTTP server on {addr} failed"))?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Signal the hub to stop accepting requests.
    pub fn shutdown(&self) {
        info!("shutdown requested");
        self.shutdown.cancel();
    }
}
