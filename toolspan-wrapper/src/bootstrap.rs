//! Bootstrap Launcher
//!
//! Makes sure a collector is reachable before a client reports anything.
//! There is no supervisor: whoever finds no daemon starts one. Racing
//! starters are settled by the listening port itself, since only one bind
//! can succeed and the losers exit quietly.
//!
//! ```text
//! ping ──ok──► done
//!   │
//!   └─fail──► spawn `toolspan -d` (detached) ──► back off ──► ping ...
//!                                   (at most `max_attempts` launches)
//! ```

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::client::CollectorClient;
use crate::config::RetryPolicy;
use crate::error::{WrapperError, WrapperResult};

/// Starts a collector process that outlives the caller
pub trait DaemonSpawner: Send + Sync {
    /// Start one daemon; must not wait for it
    fn spawn(&self) -> std::io::Result<()>;
}

/// Re-executes a program (by default the current executable) with `-d`
#[derive(Debug, Clone)]
pub struct SelfSpawner {
    program: PathBuf,
    args: Vec<OsString>,
}

impl SelfSpawner {
    pub fn new(program: impl Into<PathBuf>, args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Spawner for `<current exe> -d`
    pub fn current_exe() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?, vec![OsString::from("-d")]))
    }
}

impl DaemonSpawner for SelfSpawner {
    fn spawn(&self) -> std::io::Result<()> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group, so a ^C aimed at the build doesn't reach it
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command.spawn()?;
        tracing::debug!(pid = child.id(), program = %self.program.display(), "spawned collector");
        // Dropping the handle neither waits for nor kills the daemon.
        drop(child);
        Ok(())
    }
}

/// Probes for a collector and launches one when needed
pub struct Launcher<S> {
    client: CollectorClient,
    spawner: S,
    retry: RetryPolicy,
}

impl<S: DaemonSpawner> Launcher<S> {
    pub fn new(client: CollectorClient, spawner: S, retry: RetryPolicy) -> Self {
        Self {
            client,
            spawner,
            retry,
        }
    }

    pub fn client(&self) -> &CollectorClient {
        &self.client
    }

    /// Return once a collector answers `/ping`
    ///
    /// Yields the number of daemons this call launched. Fails with
    /// [`WrapperError::DaemonUnreachable`] once `max_attempts` launches
    /// have not produced a reachable collector.
    pub async fn ensure_running(&self) -> WrapperResult<u32> {
        let mut launched = 0;

        loop {
            match self.client.ping().await {
                Ok(()) => {
                    if launched > 0 {
                        tracing::debug!(launched, "collector reachable");
                    }
                    return Ok(launched);
                }
                Err(err) => {
                    tracing::debug!(attempt = launched, "collector not reachable: {}", err);
                }
            }

            if launched >= self.retry.max_attempts {
                return Err(WrapperError::DaemonUnreachable { attempts: launched });
            }

            self.spawner.spawn().map_err(WrapperError::Spawn)?;
            let delay = self.retry.delay_for(launched);
            launched += 1;

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}
