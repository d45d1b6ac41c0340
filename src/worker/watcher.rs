//! Per-conversation watch loop.
//!
//! Each monitored conversation gets a dedicated worker that reads the sensor
//! on a self-rescheduling timer and alerts the conversation when the CO2
//! value exceeds its threshold.
//!
//! # Event Loop
//!
//! Every iteration waits on three sources at once and handles exactly one:
//! - the cancellation token (worker replaced, stopped, or process shutdown)
//! - the next message in the inbox
//! - the check deadline
//!
//! A recognized sleep directive moves the deadline to now + the sleep
//! duration without reading the sensor. Unrecognized control text is ignored
//! and leaves the deadline where it was. When the deadline passes the sensor
//! is read (the read itself is raced against cancellation) and the deadline
//! is re-armed with either the recheck delay or, after an alert, the cooldown.
//!
//! The delay and threshold are owned by the worker task alone.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::commands::SleepDuration;
use crate::transport::{Transport, TransportError};
use crate::types::ChatId;

use super::message::WorkerMessage;
use super::schedule::WatchConfig;

/// Control text that terminates a worker, same as [`WorkerMessage::Stop`].
const STOP_CONTROL: &str = "stop";

/// Errors that end a worker task.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Reading the sensor or sending an alert failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type for worker operations.
pub type Result<T> = std::result::Result<T, WorkerError>;

/// Builds the alert sent when a reading exceeds the threshold.
pub fn alert_text(co2: i64) -> String {
    format!("Achtung! CO2 is {}!", co2)
}

/// The watcher for a single conversation.
pub struct ConversationWorker<T> {
    chat: ChatId,
    threshold: u32,
    config: WatchConfig,
    transport: Arc<T>,
    /// Delay the timer was last armed with.
    delay: Duration,
}

impl<T: Transport> ConversationWorker<T> {
    /// Creates a worker armed with the default recheck delay.
    pub fn new(chat: ChatId, threshold: u32, transport: Arc<T>, config: WatchConfig) -> Self {
        ConversationWorker {
            chat,
            threshold,
            config,
            transport,
            delay: config.recheck_delay,
        }
    }

    pub fn chat(&self) -> ChatId {
        self.chat
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// The delay the check timer is currently armed with.
    pub fn current_delay(&self) -> Duration {
        self.delay
    }

    /// Runs the watch loop until stopped.
    ///
    /// Returns `Ok` on `Stop`, cancellation, or when every sender is gone.
    /// A failed sensor read or alert send ends the loop with an error.
    #[instrument(skip(self, rx, cancel), fields(chat = %self.chat, threshold = self.threshold))]
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<WorkerMessage>,
        cancel: CancellationToken,
    ) -> Result<()> {
        info!(delay_secs = self.delay.as_secs(), "Worker watch loop started");

        let mut deadline = Instant::now() + self.delay;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Cancellation received, stopping worker");
                    break;
                }

                msg = rx.recv() => {
                    match msg {
                        Some(WorkerMessage::Stop) => {
                            info!("Stop message received");
                            break;
                        }
                        Some(WorkerMessage::Control(text)) if text == STOP_CONTROL => {
                            info!("Stop control received");
                            break;
                        }
                        Some(WorkerMessage::Control(text)) => {
                            if let Some(delay) = self.apply_control(&text) {
                                deadline = Instant::now() + delay;
                            }
                        }
                        None => {
                            info!("Message channel closed");
                            break;
                        }
                    }
                }

                _ = tokio::time::sleep_until(deadline) => {
                    match self.check_sensor(&cancel).await? {
                        Some(delay) => deadline = Instant::now() + delay,
                        None => {
                            info!("Cancelled during sensor read, stopping worker");
                            break;
                        }
                    }
                }
            }
        }

        info!("Worker watch loop stopped");
        Ok(())
    }

    /// Applies a control text, returning the new delay if it changed.
    fn apply_control(&mut self, text: &str) -> Option<Duration> {
        match SleepDuration::from_label(text) {
            Some(sleep) => {
                self.delay = sleep.duration();
                debug!(delay_secs = sleep.seconds(), "Sleeping");
                Some(self.delay)
            }
            None => {
                trace!(text, "Ignoring unrecognized control text");
                None
            }
        }
    }

    /// Reads the sensor and alerts if needed.
    ///
    /// Returns the delay until the next check, or `None` if cancelled while
    /// the read was in flight.
    async fn check_sensor(&mut self, cancel: &CancellationToken) -> Result<Option<Duration>> {
        let reading = tokio::select! {
            _ = cancel.cancelled() => return Ok(None),
            reading = self.transport.read_sensor() => reading?,
        };

        let alerted = reading.co2 > i64::from(self.threshold);
        if alerted {
            warn!(co2 = reading.co2, "CO2 above threshold, sending alert");
            self.transport
                .send_text(self.chat, &alert_text(reading.co2))
                .await?;
        } else {
            trace!(co2 = reading.co2, "CO2 within threshold");
        }

        self.delay = self.config.next_delay(alerted);
        Ok(Some(self.delay))
    }
}
