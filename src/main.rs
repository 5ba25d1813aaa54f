use clap::Parser;

/// Timestamp echo service: WebSocket and HTTP endpoints that return a
/// client-supplied message with a server-side timestamp appended.
#[derive(Parser)]
#[command(name = "stamp", version)]
struct Args {
    /// Port to listen on. 0 binds an ephemeral port.
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting stamp echo service");

    let config = stamp_server::ServerConfig {
        port: args.port,
        ..Default::default()
    };

    let handle = stamp_server::start(config)
        .await
        .expect("Failed to start server");

    tracing::info!(port = handle.port, "Echo service ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl+c");

    tracing::info!("Shutting down");
}
