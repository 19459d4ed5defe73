//! Nalix server binary.
//!
//! ```bash
//! nalix-server --bind 0.0.0.0:7878
//! ```

use std::sync::Arc;

use clap::Parser;
use nalix_server::{Args, LoggingDispatcher, Server, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = ServerConfig::try_from(args)?;
    tracing::info!(bind = %config.bind, udp = config.enable_udp, "nalix server starting");

    let server = Server::bind(config).await?;
    tracing::info!(addr = %server.local_addr()?, "listening");

    server.run(Arc::new(LoggingDispatcher)).await?;

    Ok(())
}
