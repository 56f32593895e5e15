//! Idle-shutdown coordination
//!
//! A single [`IdleMonitor`] task races activity signals against a timer.
//! Request handlers hold an [`IdleHandle`] and signal every served request
//! with a non-blocking `try_send`; a full buffer already guarantees a
//! pending wake-up, so the signal is dropped rather than awaited.
//!
//! ```text
//! handler ──touch()──► [bounded mpsc] ──► IdleMonitor ──► Shutdown::IdleTimeout
//! /die ────terminate()──────► Notify ────────┘        └─► Shutdown::Terminated
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};

/// Capacity of the activity channel
const ACTIVITY_BUFFER: usize = 16;

/// Why the daemon stopped serving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// No request was served for the whole idle window
    IdleTimeout,
    /// An administrative termination was requested
    Terminated,
}

/// Cloneable handle used by request handlers
#[derive(Debug, Clone)]
pub struct IdleHandle {
    activity: mpsc::Sender<()>,
    terminate: Arc<Notify>,
}

impl IdleHandle {
    /// Record activity; never blocks
    pub fn touch(&self) {
        // Full or closed: either a wake-up is pending or nobody is listening.
        let _ = self.activity.try_send(());
    }

    /// Ask the monitor to stop the daemon
    pub fn terminate(&self) {
        self.terminate.notify_one();
    }
}

/// Waits for either an idle window to pass or a termination request
#[derive(Debug)]
pub struct IdleMonitor {
    timeout: Duration,
    activity: mpsc::Receiver<()>,
    terminate: Arc<Notify>,
}

impl IdleMonitor {
    /// Create a monitor and the handle that feeds it
    pub fn new(timeout: Duration) -> (Self, IdleHandle) {
        let (tx, rx) = mpsc::channel(ACTIVITY_BUFFER);
        let terminate = Arc::new(Notify::new());

        let monitor = Self {
            timeout,
            activity: rx,
            terminate: Arc::clone(&terminate),
        };
        let handle = IdleHandle {
            activity: tx,
            terminate,
        };

        (monitor, handle)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run until shutdown; every activity signal restarts the window
    pub async fn run(mut self) -> Shutdown {
        let mut open = true;

        loop {
            tokio::select! {
                biased;

                _ = self.terminate.notified() => {
                    tracing::info!("termination requested");
                    return Shutdown::Terminated;
                }
                signal = self.activity.recv(), if open => {
                    if signal.is_none() {
                        open = false;
                    }
                }
                _ = tokio::time::sleep(self.timeout) => {
                    tracing::info!(idle_secs = self.timeout.as_secs_f64(), "timed out");
                    return Shutdown::IdleTimeout;
                }
            }
        }
    }
}
