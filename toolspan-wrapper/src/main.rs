//! Toolspan wrapper binary
//!
//! Install as the build driver's tool-exec hook. Every wrapped tool run is
//! reported to a shared collector, which can then be asked for a chart of
//! concurrency over time or a trace viewable in `chrome://tracing`.
//!
//! ## Usage
//!
//! ```bash
//! # Wrap every compiler/linker invocation of a build
//! go build -toolexec=toolspan ./...
//!
//! # While the collector is still up (15s after the last report)
//! curl -s localhost:10808/chart
//! curl -s localhost:10808/trace > trace.json
//! ```

use std::process::ExitCode;

use clap::Parser;
use toolspan_server::{run_daemon, CollectorConfig};
use toolspan_wrapper::{run_wrapped, ClientConfig, Invocation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "toolspan")]
#[command(about = "Record concurrency and timing of build tool invocations")]
#[command(version)]
struct Args {
    /// Be verbose
    #[arg(short, long)]
    verbose: bool,

    /// Run as the collector daemon; started automatically, do not call directly
    #[arg(short, long)]
    daemon: bool,

    /// Tool to run, followed by its arguments
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required_unless_present = "daemon"
    )]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // stderr only: stdout belongs to the wrapped tool
    let default_filter = if args.daemon {
        "toolspan_server=info"
    } else if args.verbose {
        "toolspan_wrapper=debug"
    } else {
        "toolspan_wrapper=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if args.daemon {
        return match run_daemon(CollectorConfig::from_env()).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("collector failed: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let invocation = match Invocation::from_env(args.command.clone()) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{:?}\ntoolspan: {}", args.command, e);
            return ExitCode::FAILURE;
        }
    };

    match run_wrapped(&ClientConfig::from_env(), &invocation, args.verbose).await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("toolspan: {}", e);
            ExitCode::FAILURE
        }
    }
}
