//! Toolspan Server - the collector daemon
//!
//! Wrapped tool invocations report `start`/`stop` events here. The daemon
//! keeps them in memory and renders them on request. It is started lazily
//! by the first client and exits on its own once nobody has talked to it
//! for the idle window.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   CollectorServer                    │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │   Mutex<Collector>  (EventLog + LiveIndex)     │  │
//! │  └────────────────────────────────────────────────┘  │
//! │        ▲             ▲            ▲           ▲      │
//! │   POST /event   GET /chart   GET /trace  GET /status │
//! │        │                                             │
//! │        └── every request ──► IdleMonitor ──► exit    │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Lifecycle is `Starting → Serving → Terminated`. Losing the bind race to
//! another daemon is expected and reported as [`CollectorError::AlreadyRunning`].

pub mod config;
pub mod error;
pub mod idle;
pub mod routes;

pub use config::{CollectorConfig, CollectorConfigBuilder};
pub use error::{CollectorError, CollectorResult};
pub use idle::{IdleHandle, IdleMonitor, Shutdown};

use std::future::IntoFuture;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use tokio::net::TcpListener;
use toolspan_core::{Collector, CoreError};

/// Shared application state
pub struct AppState {
    /// Event log and live index, behind the one lock every operation takes
    pub collector: Mutex<Collector>,
    /// Activity and termination signals for the idle monitor
    pub idle: IdleHandle,
}

impl AppState {
    /// Create new app state around the given collector
    pub fn new(collector: Collector, idle: IdleHandle) -> Self {
        Self {
            collector: Mutex::new(collector),
            idle,
        }
    }

    /// Enter the critical section
    pub fn lock(&self) -> CollectorResult<MutexGuard<'_, Collector>> {
        self.collector
            .lock()
            .map_err(|_| CollectorError::Core(CoreError::StateLocked))
    }
}

/// Collector HTTP daemon
///
/// # Example
///
/// ```rust,ignore
/// use toolspan_server::{CollectorServer, CollectorConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let server = CollectorServer::new(CollectorConfig::default());
///     let reason = server.run().await.unwrap();
///     println!("stopped: {:?}", reason);
/// }
/// ```
pub struct CollectorServer {
    state: Arc<AppState>,
    monitor: IdleMonitor,
    config: CollectorConfig,
}

impl CollectorServer {
    /// Create a server with an empty collector whose timeline starts now
    pub fn new(config: CollectorConfig) -> Self {
        Self::with_collector(Collector::new(), config)
    }

    /// Create a server around an existing collector
    pub fn with_collector(collector: Collector, config: CollectorConfig) -> Self {
        let (monitor, idle) = IdleMonitor::new(config.idle_timeout);
        Self {
            state: Arc::new(AppState::new(collector, idle)),
            monitor,
            config,
        }
    }

    /// Shared state, for inspection outside the HTTP surface
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Build the Axum router with all routes
    pub fn router(&self) -> Router {
        routes::create_router(Arc::clone(&self.state))
    }

    /// Get the socket address for the server
    pub fn addr(&self) -> SocketAddr {
        self.config.addr()
    }

    /// Bind the listening endpoint
    ///
    /// `AddrInUse` means some other daemon won the race.
    pub async fn bind(&self) -> CollectorResult<TcpListener> {
        let addr = self.addr();
        TcpListener::bind(addr).await.map_err(|source| {
            if source.kind() == ErrorKind::AddrInUse {
                CollectorError::AlreadyRunning { addr }
            } else {
                CollectorError::Bind { addr, source }
            }
        })
    }

    /// Bind and serve until idle timeout or termination
    pub async fn run(self) -> CollectorResult<Shutdown> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener until idle timeout or termination
    pub async fn serve(self, listener: TcpListener) -> CollectorResult<Shutdown> {
        let app = self.router();
        let local = listener.local_addr().map_err(CollectorError::Serve)?;

        tracing::info!("Collector listening on http://{}", local);
        tracing::info!(
            idle_secs = self.monitor.timeout().as_secs_f64(),
            "Endpoints: GET /ping, POST /event, GET /status, GET /chart, GET /trace, GET /die"
        );

        tokio::select! {
            served = axum::serve(listener, app).into_future() => {
                served.map_err(CollectorError::Serve)?;
                Ok(Shutdown::Terminated)
            }
            reason = self.monitor.run() => Ok(reason),
        }
    }
}

/// Daemon entry point shared by the binaries
///
/// Losing the bind race is not an error: the winner serves every client.
pub async fn run_daemon(config: CollectorConfig) -> CollectorResult<()> {
    tracing::info!("Starting Toolspan collector v{}", env!("CARGO_PKG_VERSION"));

    match CollectorServer::new(config).run().await {
        Ok(reason) => {
            tracing::info!(?reason, "collector stopped");
            Ok(())
        }
        Err(CollectorError::AlreadyRunning { addr }) => {
            tracing::info!("another collector owns {}, exiting", addr);
            Ok(())
        }
        Err(err) => Err(err),
    }
}
