//! Routing of inbound chat messages.
//!
//! The bot consumes the ordered event sequence from the update source and,
//! per message, either replies directly (`/co2`, `/help`, `/sleep`) or calls
//! into the worker registry (`/stop`, sleep directives, a threshold reply).
//!
//! # Threshold Dialog
//!
//! `/start` asks for a threshold and marks the conversation as awaiting one.
//! The next non-command message from that conversation is parsed as the
//! threshold. An invalid value gets a retry prompt and the conversation keeps
//! waiting; a valid one starts the worker. Sending any command instead
//! abandons the dialog and handles the command normally.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace};

use crate::commands::{Command, SleepDuration, is_command, parse_command, parse_threshold};
use crate::transport::{ReplyKeyboard, Transport, TransportError};
use crate::types::{ChatId, ChatMessage, InboundEvent};
use crate::updates::{Subscription, UpdateSource};
use crate::worker::WorkerRegistry;

/// Prompt sent after `/start`.
pub const THRESHOLD_PROMPT: &str = "Enter maximum CO2 value";

/// Prompt sent with the sleep keyboard.
pub const SLEEP_PROMPT: &str = "Select sleep time";

/// Reply to `/help`.
pub const HELP_TEXT: &str = "Usage:\n\
    /start - Monitor the level of co2\n\
    /stop - Stop monitoring\n\
    /sleep - Disable for a while\n\
    /co2 - Show current CO2 value\n\
    /help - Show help";

/// Errors that end the bot loop.
#[derive(Debug, Error)]
pub enum BotError {
    /// A remote call failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The update source task panicked or was aborted.
    #[error("update source task failed: {0}")]
    UpdateSource(#[from] tokio::task::JoinError),
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, BotError>;

/// Builds the sleep menu keyboard.
pub fn sleep_keyboard() -> ReplyKeyboard {
    ReplyKeyboard::one_per_row(SleepDuration::ALL.iter().map(|d| d.label()))
}

/// Dispatches inbound events.
pub struct Bot<T> {
    transport: Arc<T>,
    registry: Arc<WorkerRegistry<T>>,
    /// Conversations whose next message is read as a threshold.
    awaiting_threshold: HashSet<ChatId>,
}

impl<T: Transport> Bot<T> {
    /// Creates a bot that replies through `transport` and manages workers
    /// through `registry`.
    pub fn new(transport: Arc<T>, registry: Arc<WorkerRegistry<T>>) -> Self {
        Bot {
            transport,
            registry,
            awaiting_threshold: HashSet::new(),
        }
    }

    /// Returns the worker registry.
    pub fn registry(&self) -> &Arc<WorkerRegistry<T>> {
        &self.registry
    }

    /// Checks if `chat` is in the middle of the threshold dialog.
    pub fn is_awaiting_threshold(&self, chat: ChatId) -> bool {
        self.awaiting_threshold.contains(&chat)
    }

    /// Handles one inbound event.
    ///
    /// Transport errors are returned; they are fatal to the bot loop.
    #[instrument(skip(self, event), fields(update_id = %event.update_id))]
    pub async fn handle_event(&mut self, event: InboundEvent) -> Result<()> {
        let Some(ChatMessage { chat_id: chat, text }) = event.message else {
            trace!("Ignoring update without a message");
            return Ok(());
        };

        if self.awaiting_threshold.contains(&chat) {
            if !is_command(&text) {
                return self.handle_threshold_reply(chat, &text).await;
            }
            debug!(%chat, "Command received during threshold dialog, abandoning dialog");
            self.awaiting_threshold.remove(&chat);
        }

        let Some(command) = parse_command(&text) else {
            trace!(%chat, "Ignoring unrecognized message");
            return Ok(());
        };

        self.handle_command(chat, command).await
    }

    async fn handle_command(&mut self, chat: ChatId, command: Command) -> Result<()> {
        debug!(%chat, ?command, "Handling command");

        match command {
            Command::Start => {
                self.transport.send_text(chat, THRESHOLD_PROMPT).await?;
                self.awaiting_threshold.insert(chat);
            }
            Command::Stop => {
                self.registry.stop(chat).await;
            }
            Command::Co2 => {
                let reading = self.transport.read_sensor().await?;
                self.transport
                    .send_text(chat, &format!("CO2 is {}", reading.co2))
                    .await?;
            }
            Command::SleepMenu => {
                self.transport
                    .send_keyboard(chat, SLEEP_PROMPT, &sleep_keyboard())
                    .await?;
            }
            Command::Sleep(text) => {
                self.registry.forward(chat, text).await;
            }
            Command::Help => {
                self.transport.send_text(chat, HELP_TEXT).await?;
            }
        }

        Ok(())
    }

    async fn handle_threshold_reply(&mut self, chat: ChatId, text: &str) -> Result<()> {
        match parse_threshold(text) {
            Ok(threshold) => {
                self.awaiting_threshold.remove(&chat);
                self.transport
                    .send_text(chat, &format!("Start watch CO2 less than {}", threshold))
                    .await?;
                self.registry.start(chat, threshold).await;
            }
            Err(e) => {
                debug!(%chat, error = ?e, "Invalid threshold reply");
                self.transport.send_text(chat, &e.to_string()).await?;
            }
        }
        Ok(())
    }

    /// Consumes the update source until shutdown or a fatal error.
    ///
    /// Events are handled strictly one at a time, in update order. On exit
    /// every worker is stopped. The error of whichever side failed first
    /// (event handling or the update source) is returned.
    #[instrument(skip_all)]
    pub async fn run(&mut self, source: UpdateSource<T>, shutdown: CancellationToken) -> Result<()> {
        info!("Bot event loop started");

        let source_shutdown = shutdown.child_token();
        let Subscription { mut events, task } = source.subscribe(source_shutdown.clone());

        let outcome = loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping bot");
                    break Ok(());
                }

                event = events.recv() => {
                    match event {
                        Some(event) => {
                            if let Err(e) = self.handle_event(event).await {
                                error!(error = %e, "Error handling event");
                                break Err(e);
                            }
                        }
                        None => {
                            info!("Update source ended");
                            break Ok(());
                        }
                    }
                }
            }
        };

        source_shutdown.cancel();
        drop(events);
        self.registry.shutdown_all().await;

        let source_result = task.await?;
        outcome?;
        source_result?;

        info!("Bot event loop stopped");
        Ok(())
    }
}
