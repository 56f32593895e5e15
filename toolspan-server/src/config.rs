//! Collector configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Fixed port shared by the daemon and its clients
pub const DEFAULT_PORT: u16 = 10808;

/// Inactivity window after which the daemon exits
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(15);

/// Environment variable overriding the port (daemon and clients)
pub const PORT_ENV: &str = "TOOLSPAN_PORT";

/// Environment variable overriding the idle window, in seconds
pub const IDLE_SECS_ENV: &str = "TOOLSPAN_IDLE_SECS";

/// Collector daemon configuration
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Address to bind; loopback unless overridden
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Exit after this long without a served request
    pub idle_timeout: Duration,
}

impl CollectorConfig {
    /// Create a new configuration builder
    pub fn builder() -> CollectorConfigBuilder {
        CollectorConfigBuilder::default()
    }

    /// Defaults, overridden by `TOOLSPAN_PORT` / `TOOLSPAN_IDLE_SECS`
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut builder = Self::builder();
        if let Some(port) = env_parse::<u16>(PORT_ENV) {
            builder = builder.port(port);
        }
        if let Some(secs) = env_parse::<u64>(IDLE_SECS_ENV) {
            builder = builder.idle_timeout(Duration::from_secs(secs));
        }
        builder.build()
    }

    /// Socket address the daemon binds
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// Builder for CollectorConfig
#[derive(Debug, Default)]
pub struct CollectorConfigBuilder {
    host: Option<IpAddr>,
    port: Option<u16>,
    idle_timeout: Option<Duration>,
}

impl CollectorConfigBuilder {
    /// Set the bind address
    pub fn host(mut self, host: IpAddr) -> Self {
        self.host = Some(host);
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the idle window
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Build the configuration
    pub fn build(self) -> CollectorConfig {
        let defaults = CollectorConfig::default();
        CollectorConfig {
            host: self.host.unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            idle_timeout: self.idle_timeout.unwrap_or(defaults.idle_timeout),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CollectorConfig::default();
        assert_eq!(config.port, 10808);
        assert_eq!(config.idle_timeout, Duration::from_secs(15));
        assert!(config.host.is_loopback());
    }

    #[test]
    fn test_builder_overrides() {
        let config = CollectorConfig::builder()
            .port(9000)
            .idle_timeout(Duration::from_millis(250))
            .build();
        assert_eq!(config.addr(), "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.idle_timeout, Duration::from_millis(250));
    }
}
