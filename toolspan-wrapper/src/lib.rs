//! Toolspan Wrapper - client side of the collector
//!
//! A build driver runs `toolspan <tool> <args...>` instead of the tool. For
//! each invocation the wrapper:
//!
//! 1. makes sure a collector daemon is reachable, launching one if needed
//! 2. reports `start` with a fresh random id
//! 3. runs the tool with inherited stdio
//! 4. reports `stop` with the same id and exits with the tool's status
//!
//! ## Example
//!
//! ```rust,ignore
//! use toolspan_wrapper::{run_wrapped, ClientConfig, Invocation};
//!
//! let invocation = Invocation::from_env(std::env::args().skip(1).collect())?;
//! let code = run_wrapped(&ClientConfig::from_env(), &invocation, false).await?;
//! std::process::exit(code);
//! ```

pub mod bootstrap;
pub mod client;
pub mod config;
pub mod error;
pub mod runner;

pub use bootstrap::{DaemonSpawner, Launcher, SelfSpawner};
pub use client::CollectorClient;
pub use config::{ClientConfig, ClientConfigBuilder, RetryPolicy};
pub use error::{WrapperError, WrapperResult};
pub use runner::{Invocation, ToolRunner, PKG_PATH_ENV};

/// Bootstrap a collector (re-executing this binary with `-d`) and run one
/// wrapped invocation, returning the tool's exit code
pub async fn run_wrapped(
    config: &ClientConfig,
    invocation: &Invocation,
    verbose: bool,
) -> WrapperResult<i32> {
    let client = CollectorClient::new(config)?;
    let spawner = SelfSpawner::current_exe().map_err(WrapperError::Spawn)?;

    Launcher::new(client.clone(), spawner, config.retry)
        .ensure_running()
        .await?;

    ToolRunner::new(client).verbose(verbose).run(invocation).await
}
