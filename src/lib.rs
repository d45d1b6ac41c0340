//! CO2 Monitor Bot - A chat bot that watches a CO2 sensor on behalf of its conversations.
//!
//! The bot long-polls the chat service for messages, runs one sensor watcher
//! per monitored conversation, and alerts a conversation when the reading
//! exceeds the threshold it chose.

pub mod bot;
pub mod commands;
pub mod config;
pub mod server;
pub mod transport;
pub mod types;
pub mod updates;
pub mod worker;

#[cfg(test)]
mod test_utils;
