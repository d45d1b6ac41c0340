//! Worker message types for async communication.
//!
//! This module defines the messages that can be sent to a conversation
//! worker. Workers receive these messages via an async channel and handle
//! them in their event loop, in send order.

/// Messages that can be sent to a conversation worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerMessage {
    /// Control text forwarded from the conversation.
    ///
    /// Recognized sleep directives change the recheck delay; anything else
    /// is ignored by the worker.
    Control(String),

    /// Terminate the watch loop.
    ///
    /// Sent when monitoring is stopped or the worker is being replaced.
    Stop,
}
