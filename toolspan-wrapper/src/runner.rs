//! Wrapped tool execution
//!
//! Reports start, runs the tool with the caller's stdio, reports stop, and
//! hands back the tool's exit status unchanged. The stop is reported even
//! when the tool fails or can't be started. A stop the collector can't take
//! is logged and otherwise ignored.

use std::path::Path;
use std::process::ExitStatus;

use tokio::process::Command;
use toolspan_core::InvocationId;

use crate::client::CollectorClient;
use crate::error::{WrapperError, WrapperResult};

/// Environment variable naming the package being built
pub const PKG_PATH_ENV: &str = "TOOLEXEC_PKG_PATH";

/// One tool command to wrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program as given by the build driver (often an absolute path)
    pub program: String,
    pub args: Vec<String>,
    /// Unit of work being built
    pub pkg: String,
}

impl Invocation {
    /// Split `command` into program and arguments
    pub fn new(command: Vec<String>, pkg: impl Into<String>) -> WrapperResult<Self> {
        let mut command = command.into_iter();
        let program = command.next().ok_or(WrapperError::MissingCommand)?;
        Ok(Self {
            program,
            args: command.collect(),
            pkg: pkg.into(),
        })
    }

    /// Like [`Invocation::new`], with the package read from `TOOLEXEC_PKG_PATH`
    pub fn from_env(command: Vec<String>) -> WrapperResult<Self> {
        let pkg = package_path(std::env::var(PKG_PATH_ENV).ok())?;
        Self::new(command, pkg)
    }

    /// Short tool name: the program's file name
    pub fn tool_name(&self) -> String {
        Path::new(&self.program)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.clone())
    }
}

/// Validate the discovery value; absent or empty is a configuration error
pub fn package_path(value: Option<String>) -> WrapperResult<String> {
    match value {
        Some(pkg) if !pkg.is_empty() => Ok(pkg),
        _ => Err(WrapperError::MissingPackagePath(PKG_PATH_ENV)),
    }
}

/// Runs tools and reports their lifecycle
pub struct ToolRunner {
    client: CollectorClient,
    verbose: bool,
}

impl ToolRunner {
    pub fn new(client: CollectorClient) -> Self {
        Self {
            client,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run `invocation` to completion and return its exit code
    pub async fn run(&self, invocation: &Invocation) -> WrapperResult<i32> {
        let tool = invocation.tool_name();
        let start = self
            .client
            .notify_start(InvocationId::generate(), &tool, &invocation.pkg)
            .await?;

        if self.verbose {
            eprintln!("Running {} {:?}", invocation.program, invocation.args);
        }

        let outcome = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .await;

        // A missing stop must not fail the build; the tool's status wins.
        if let Err(err) = self.client.notify_stop(&start).await {
            tracing::warn!(id = %start.id, tool = %tool, "stop not reported: {}", err);
        }

        let status = outcome.map_err(|source| WrapperError::ToolSpawn {
            program: invocation.program.clone(),
            source,
        })?;
        tracing::debug!(id = %start.id, tool = %tool, ?status, "tool finished");

        Ok(exit_code(status))
    }
}

/// Exit code to forward; a tool killed by a signal maps to 1
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tool_name_is_basename() {
        let program = "/usr/lib/go/pkg/tool/linux_amd64/compile";
        let inv = Invocation::new(cmd(&[program, "-o", "x.a"]), "foo").unwrap();
        assert_eq!(inv.tool_name(), "compile");
        assert_eq!(inv.args, cmd(&["-o", "x.a"]));

        let bare = Invocation::new(cmd(&["asm"]), "foo").unwrap();
        assert_eq!(bare.tool_name(), "asm");
    }

    #[test]
    fn test_empty_command_is_rejected() {
        assert!(matches!(
            Invocation::new(Vec::new(), "foo"),
            Err(WrapperError::MissingCommand)
        ));
    }

    #[test]
    fn test_package_path_required() {
        assert_eq!(package_path(Some("net/http".to_string())).unwrap(), "net/http");
        assert!(matches!(
            package_path(None),
            Err(WrapperError::MissingPackagePath(PKG_PATH_ENV))
        ));
        assert!(package_path(Some(String::new())).is_err());
    }
}
