//! Error types for the Toolspan wrapper

use thiserror::Error;

/// Result type for wrapper operations
pub type WrapperResult<T> = Result<T, WrapperError>;

/// Errors that can occur on the client side
///
/// All of them are fatal to the invoking process.
#[derive(Error, Debug)]
pub enum WrapperError {
    /// No collector answered after every bootstrap attempt
    #[error("failed to start daemon: no collector reachable after {attempts} attempts")]
    DaemonUnreachable { attempts: u32 },

    /// Launching a background collector failed
    #[error("failed to spawn collector: {0}")]
    Spawn(#[source] std::io::Error),

    /// The build driver didn't export the package being built
    #[error("missing {0}; is the build driver exporting it?")]
    MissingPackagePath(&'static str),

    /// Nothing to run
    #[error("no tool command given")]
    MissingCommand,

    /// The wrapped tool could not be started
    #[error("failed to run {program}: {source}")]
    ToolSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The collector answered with an error status
    #[error("collector rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Transport error talking to the collector
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
