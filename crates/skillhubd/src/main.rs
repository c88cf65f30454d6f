//! skillhubd - Skills Hub daemon
//!
//! Main entry point for the daemon binary.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use skillhub_core::config::default_env_file;
use skillhub_core::Config;
use skillhubd::{Hub, HubConfig};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "skillhubd", about = "Skills Hub: one endpoint for many APIs", version)]
struct Cli {
    /// Interface to bind
    #[arg(long, env = "SKILLHUB_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "SKILLHUB_PORT", default_value = "8000")]
    port: u16,

    /// Env file with provider credentials (default: ~/.config/skillhub/env if present)
    #[arg(long)]
    env_file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing.
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let env_file = cli
        .env_file
        .or_else(|| default_env_file().filter(|p| p.is_file()));
    let credentials = match Config::load(env_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(path) = &env_file {
        info!("loaded env file: {}", path.display());
    }

    let config = HubConfig {
        host: cli.host,
        port: cli.port,
    };

    // Run the async main.
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let exit_code = runtime.block_on(async {
        let hub = match Hub::new(config, &credentials) {
            Ok(hub) => hub,
            Err(e) => {
                error!("failed to initialize hub: {:#}", e);
                return 1;
            }
        };

        // Keep the same server future across the signal so in-flight
        // requests are drained rather than dropped.
        let run = hub.run();
        tokio::pin!(run);

        let result = tokio::select! {
            result = &mut run => result,
            () = shutdown_signal() => {
                hub.shutdown();
                run.await
            }
        };

        match result {
            Ok(()) => 0,
            Err(e) => {
                error!("hub error: {:#}", e);
                1
            }
        }
    });

    std::process::exit(exit_code);
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                error!("failed to register SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("received SIGINT, initiating graceful shutdown");
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, initiating graceful shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("received SIGINT, initiating graceful shutdown");
    }
}
