//! HTTP client for the collector daemon

use chrono::Utc;
use reqwest::Response;
use toolspan_core::{Event, InvocationId, TraceDocument};

use crate::config::ClientConfig;
use crate::error::{WrapperError, WrapperResult};

/// Client for one collector endpoint
#[derive(Debug, Clone)]
pub struct CollectorClient {
    http: reqwest::Client,
    base_url: String,
}

impl CollectorClient {
    /// Create a client from configuration
    pub fn new(config: &ClientConfig) -> WrapperResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Liveness probe
    pub async fn ping(&self) -> WrapperResult<()> {
        let response = self.http.get(self.url("/ping")).send().await?;
        check(response).await.map(|_| ())
    }

    /// Post one event as-is
    pub async fn report(&self, event: &Event) -> WrapperResult<()> {
        let response = self.http.post(self.url("/event")).json(event).send().await?;
        check(response).await?;
        tracing::debug!(id = %event.id, kind = %event.kind, "reported event");
        Ok(())
    }

    /// Report that an invocation is starting now
    ///
    /// Returns the start event so the caller can report the matching stop.
    pub async fn notify_start(
        &self,
        id: InvocationId,
        tool: &str,
        pkg: &str,
    ) -> WrapperResult<Event> {
        let event = Event::start(id, tool, pkg, Utc::now());
        self.report(&event).await?;
        Ok(event)
    }

    /// Report that the invocation begun by `start` has finished now
    pub async fn notify_stop(&self, start: &Event) -> WrapperResult<Event> {
        let event = start.stopped_at(Utc::now());
        self.report(&event).await?;
        Ok(event)
    }

    /// Diagnostic status text
    pub async fn status(&self) -> WrapperResult<String> {
        self.get_text("/status").await
    }

    /// Concurrency chart text
    pub async fn chart(&self) -> WrapperResult<String> {
        self.get_text("/chart").await
    }

    /// Trace document of closed invocations
    pub async fn trace(&self) -> WrapperResult<TraceDocument> {
        let response = self.http.get(self.url("/trace")).send().await?;
        let body = check(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Ask the daemon to exit
    ///
    /// The daemon may go away before answering, so a dropped connection
    /// counts as success.
    pub async fn terminate(&self) -> WrapperResult<()> {
        match self.http.get(self.url("/die")).send().await {
            Ok(response) => check(response).await.map(|_| ()),
            Err(err) => {
                tracing::debug!("no answer to terminate: {}", err);
                Ok(())
            }
        }
    }

    async fn get_text(&self, path: &str) -> WrapperResult<String> {
        let response = self.http.get(self.url(path)).send().await?;
        Ok(check(response).await?.text().await?)
    }
}

/// Turn an error status into [`WrapperError::Rejected`] with the body text
async fn check(response: Response) -> WrapperResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(WrapperError::Rejected {
        status: status.as_u16(),
        message: message.trim_end().to_string(),
    })
}
