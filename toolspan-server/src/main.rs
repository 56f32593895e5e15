//! Toolspan collector binary
//!
//! Runs the collector daemon in the foreground. Clients normally start it
//! themselves through `toolspan -d`; this binary is handy for watching the
//! log output while a build runs.
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults (port 10808, 15s idle window)
//! toolspan-server
//!
//! # Custom port and a longer idle window
//! TOOLSPAN_PORT=3000 TOOLSPAN_IDLE_SECS=120 toolspan-server
//! ```

use toolspan_server::{run_daemon, CollectorConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toolspan_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CollectorConfig::from_env();
    run_daemon(config).await?;

    Ok(())
}
