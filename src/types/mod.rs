//! Core domain types for the CO2 monitor bot.

pub mod event;
pub mod ids;

pub use event::{ChatMessage, InboundEvent, SensorReading};
pub use ids::{ChatId, UpdateId};
