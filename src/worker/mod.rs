//! Per-conversation worker system.
//!
//! Each monitored conversation gets a dedicated worker task that reads the
//! sensor on a self-rescheduling timer and alerts when the threshold is
//! crossed. Workers for different conversations run concurrently and share
//! no mutable state.
//!
//! # Module Structure
//!
//! - [`registry`]: Conversation → worker map with start/stop/forward
//! - [`watcher`]: The watch loop itself
//! - [`message`]: Worker message types for async communication
//! - [`schedule`]: Recheck and cooldown delays

mod message;
mod registry;
mod schedule;
mod watcher;

#[cfg(test)]
mod tests;

pub use message::WorkerMessage;
pub use registry::WorkerRegistry;
pub use schedule::WatchConfig;
pub use watcher::{ConversationWorker, WorkerError, alert_text};
