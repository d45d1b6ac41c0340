//! Remote calls to the chat service and the CO2 sensor.
//!
//! Everything the bot does over the network goes through the [`Transport`]
//! trait: long-polling for updates, sending replies, and reading the sensor.
//! [`HttpTransport`] is the production implementation; tests substitute an
//! in-memory one.
//!
//! No call is retried. A network failure or an unparseable response is
//! returned as a [`TransportError`] and is fatal to whichever task made the
//! call.

mod client;
mod error;
mod keyboard;
mod wire;

use std::future::Future;
use std::time::Duration;

use crate::types::{ChatId, InboundEvent, SensorReading, UpdateId};

pub use client::{HttpTransport, TransportConfig};
pub use error::{Result, TransportError};
pub use keyboard::ReplyKeyboard;
pub use wire::{parse_sensor, parse_updates};

/// Outbound calls to the chat service and the sensor.
///
/// Implementations hold no mutable state of their own, so a single instance
/// is shared (behind an `Arc`) by the update source, the dispatcher, and
/// every conversation worker.
pub trait Transport: Send + Sync + 'static {
    /// Long-polls for updates with `update_id >= offset`.
    ///
    /// Blocks server-side for up to `timeout` when no update is available.
    /// The returned events are in the order the service produced them. The
    /// offset floor is a hint; callers must not assume it is honored.
    fn fetch_events(
        &self,
        offset: UpdateId,
        limit: Option<u32>,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<InboundEvent>>> + Send;

    /// Sends a plain text message. The response body is discarded.
    fn send_text(&self, chat: ChatId, text: &str) -> impl Future<Output = Result<()>> + Send;

    /// Sends a message with a reply keyboard attached.
    fn send_keyboard(
        &self,
        chat: ChatId,
        prompt: &str,
        keyboard: &ReplyKeyboard,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Reads the current sensor values.
    fn read_sensor(&self) -> impl Future<Output = Result<SensorReading>> + Send;
}
