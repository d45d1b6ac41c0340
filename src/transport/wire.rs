//! JSON wire formats of the chat service and the sensor.

use serde::Deserialize;

use crate::types::{ChatId, ChatMessage, InboundEvent, SensorReading, UpdateId};

use super::error::{Result, TransportError};

/// The `getUpdates` response envelope.
#[derive(Debug, Deserialize)]
struct UpdatesEnvelope {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    text: String,
    chat: Chat,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

impl From<Update> for InboundEvent {
    fn from(update: Update) -> Self {
        InboundEvent {
            update_id: UpdateId(update.update_id),
            message: update.message.map(|m| ChatMessage {
                chat_id: ChatId(m.chat.id),
                text: m.text,
            }),
        }
    }
}

/// Parses a `getUpdates` response body into events, preserving order.
///
/// Fails on malformed JSON and on `ok: false`.
pub fn parse_updates(body: &str) -> Result<Vec<InboundEvent>> {
    let envelope: UpdatesEnvelope =
        serde_json::from_str(body).map_err(|source| TransportError::Decode {
            what: "getUpdates",
            source,
        })?;

    if !envelope.ok {
        return Err(TransportError::rejected(
            envelope
                .description
                .unwrap_or_else(|| "no description".to_string()),
        ));
    }

    Ok(envelope.result.into_iter().map(InboundEvent::from).collect())
}

/// Parses a sensor response body.
pub fn parse_sensor(body: &str) -> Result<SensorReading> {
    serde_json::from_str(body).map_err(|source| TransportError::Decode {
        what: "sensor",
        source,
    })
}
