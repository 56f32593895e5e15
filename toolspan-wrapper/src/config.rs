//! Configuration for the Toolspan wrapper

use std::time::Duration;

use toolspan_server::config::{DEFAULT_PORT, PORT_ENV};

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the collector, without trailing slash
    pub base_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Bootstrap retry policy
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Defaults, with the port overridden by `TOOLSPAN_PORT`
    pub fn from_env() -> Self {
        let mut builder = Self::builder();
        if let Some(port) = std::env::var(PORT_ENV).ok().and_then(|p| p.trim().parse().ok()) {
            builder = builder.port(port);
        }
        builder.build()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    port: Option<u16>,
    request_timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
}

impl ClientConfigBuilder {
    /// Talk to the collector on this loopback port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Talk to the collector at an explicit base URL (takes precedence over `port`)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        let base_url = self.base_url.unwrap_or_else(|| {
            format!("http://127.0.0.1:{}", self.port.unwrap_or(DEFAULT_PORT))
        });
        ClientConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(10)),
            retry: self.retry.unwrap_or_default(),
        }
    }
}

/// Bounded retry for the bootstrap liveness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Daemon launches attempted before giving up
    pub max_attempts: u32,

    /// Delay after the first launch; doubled after each further one
    pub initial_delay: Duration,

    /// Upper bound on a single delay
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// No delay between attempts
    pub fn tight(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after launch number `attempt` (zero-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_millis(25),
            max_delay: Duration::from_millis(400),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_fixed_port() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:10808");
        assert_eq!(config.retry.max_attempts, 10);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = ClientConfig::builder().base_url("http://localhost:9/").build();
        assert_eq!(config.base_url, "http://localhost:9");
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.delay_for(0), Duration::from_millis(25));
        assert_eq!(retry.delay_for(1), Duration::from_millis(50));
        assert_eq!(retry.delay_for(3), Duration::from_millis(200));
        assert_eq!(retry.delay_for(4), Duration::from_millis(400));
        assert_eq!(retry.delay_for(9), Duration::from_millis(400));
        assert_eq!(retry.delay_for(40), Duration::from_millis(400));
    }

    #[test]
    fn test_tight_policy_never_sleeps() {
        let retry = RetryPolicy::tight(3);
        assert_eq!(retry.delay_for(0), Duration::ZERO);
        assert_eq!(retry.delay_for(31), Duration::ZERO);
    }
}
