//! `reqwest`-backed transport scoped to one bot and one sensor.
//!
//! All Bot API methods are called as `GET {api_base}/bot{token}/{method}`
//! with query-string parameters. The sensor is a single JSON endpoint.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::types::{ChatId, InboundEvent, SensorReading, UpdateId};

use super::Transport;
use super::error::{Result, TransportError};
use super::keyboard::ReplyKeyboard;
use super::wire::{parse_sensor, parse_updates};

/// Default Bot API base address.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Extra time allowed on top of the server-side long-poll bound before the
/// client gives up on a `getUpdates` request.
const LONG_POLL_GRACE: Duration = Duration::from_secs(15);

/// Immutable connection settings for [`HttpTransport`].
#[derive(Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Bot credential token.
    pub bot_token: String,
    /// Address of the sensor's JSON endpoint.
    pub sensor_url: String,
    /// Bot API base address, without trailing slash.
    pub api_base: String,
}

impl TransportConfig {
    /// Creates a configuration against the default Bot API.
    pub fn new(bot_token: impl Into<String>, sensor_url: impl Into<String>) -> Self {
        TransportConfig {
            bot_token: bot_token.into(),
            sensor_url: sensor_url.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Points the transport at a different Bot API server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the URL for a Bot API method.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }
}

impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("sensor_url", &self.sensor_url)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

/// HTTP transport for the chat service and the sensor.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: Arc<TransportConfig>,
}

impl HttpTransport {
    /// Creates a transport with a default `reqwest` client.
    pub fn new(config: TransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a transport from a pre-configured client.
    pub fn with_client(client: reqwest::Client, config: TransportConfig) -> Self {
        HttpTransport {
            client,
            config: Arc::new(config),
        }
    }

    async fn send_message(&self, query: &[(&str, String)]) -> Result<()> {
        let response = self
            .client
            .get(self.config.method_url("sendMessage"))
            .query(query)
            .send()
            .await?;
        // The body is read to completion so the connection can be reused,
        // but its content is not inspected.
        let _ = response.bytes().await?;
        Ok(())
    }
}

impl Transport for HttpTransport {
    async fn fetch_events(
        &self,
        offset: UpdateId,
        limit: Option<u32>,
        timeout: Duration,
    ) -> Result<Vec<InboundEvent>> {
        let mut query: Vec<(&str, String)> = Vec::with_capacity(3);
        if !offset.is_zero() {
            query.push(("offset", offset.to_string()));
        }
        if let Some(limit) = limit.filter(|l| *l != 0) {
            query.push(("limit", limit.to_string()));
        }
        if !timeout.is_zero() {
            query.push(("timeout", timeout.as_secs().to_string()));
        }

        trace!(%offset, "Long-polling for updates");
        let body = self
            .client
            .get(self.config.method_url("getUpdates"))
            .query(&query)
            .timeout(timeout + LONG_POLL_GRACE)
            .send()
            .await?
            .text()
            .await?;

        let events = parse_updates(&body)?;
        debug!(count = events.len(), %offset, "Fetched updates");
        Ok(events)
    }

    async fn send_text(&self, chat: ChatId, text: &str) -> Result<()> {
        trace!(%chat, "Sending message");
        self.send_message(&[("chat_id", chat.to_string()), ("text", text.to_string())])
            .await
    }

    async fn send_keyboard(
        &self,
        chat: ChatId,
        prompt: &str,
        keyboard: &ReplyKeyboard,
    ) -> Result<()> {
        let markup = serde_json::to_string(keyboard).map_err(TransportError::Encode)?;
        trace!(%chat, "Sending keyboard");
        self.send_message(&[
            ("chat_id", chat.to_string()),
            ("reply_markup", markup),
            ("text", prompt.to_string()),
        ])
        .await
    }

    async fn read_sensor(&self) -> Result<SensorReading> {
        let body = self
            .client
            .get(&self.config.sensor_url)
            .send()
            .await?
            .text()
            .await?;
        let reading = parse_sensor(&body)?;
        trace!(co2 = reading.co2, "Read sensor");
        Ok(reading)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
