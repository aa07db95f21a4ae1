use anyhow::Result;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jeego::{
    config::Config,
    domoticz::DomoticzClient,
    gateway::Gateway,
    reader::LineSource,
    registry::NodeRegistry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent; env vars may be set externally)
    let _ = dotenvy::dotenv();

    // Initialise tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "Starting jeego"
    );

    // Load config
    let config = Config::from_env()?;

    // Latest state of every node heard from
    let registry = NodeRegistry::with_presets(config.nodes.clone());

    let domoticz = DomoticzClient::new(&config);
    if !domoticz.is_enabled() {
        info!("DOMOTICZ_HOST not set; Domoticz push disabled");
    }

    let source = LineSource::new(&config.input, config.serial_baud);
    let gateway = Gateway::new(registry, domoticz);

    tokio::select! {
        served = gateway.serve(source) => served?,
        _ = shutdown_signal() => {},
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
