use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::SheetPayload;
use tracing::{debug, info};
use url::Url;

#[async_trait]
pub trait CaseSink: Send + Sync {
    async fn deliver(&self, payload: &SheetPayload) -> Result<()>;
}

pub struct MissingCaseSink;

#[async_trait]
impl CaseSink for MissingCaseSink {
    async fn deliver(&self, _payload: &SheetPayload) -> Result<()> {
        Err(anyhow!("case submission webhook is not configured"))
    }
}

/// Posts filings to the sheet webhook.
///
/// Delivery is fire-and-forget: once the request has been dispatched the
/// response status and body are ignored. Only transport failures are errors.
pub struct WebhookSink {
    http: Client,
    endpoint: Url,
}

impl WebhookSink {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("invalid webhook url '{endpoint}'"))?;
        Ok(Self {
            http: Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CaseSink for WebhookSink {
    async fn deliver(&self, payload: &SheetPayload) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
            .with_context(|| format!("failed to reach webhook {}", self.endpoint))?;

        debug!(status = %response.status(), "intake: webhook responded");
        info!(
            "intake: filing dispatched host={}",
            self.endpoint.host_str().unwrap_or_default()
        );
        Ok(())
    }
}
