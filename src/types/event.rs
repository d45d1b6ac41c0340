//! Inbound events and sensor readings.

use serde::{Deserialize, Serialize};

use super::ids::{ChatId, UpdateId};

/// A chat message carried by an inbound update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The conversation the message was posted in.
    pub chat_id: ChatId,
    /// Message text. Empty for messages without text (stickers, photos, ...).
    pub text: String,
}

/// One entry of the remote update log.
///
/// Every update occupies a sequence number, even the ones that carry no chat
/// message (edits, callback queries, ...). Those still advance the polling
/// offset but have `message: None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub update_id: UpdateId,
    pub message: Option<ChatMessage>,
}

impl InboundEvent {
    /// Creates an event carrying a text message.
    pub fn text(update_id: impl Into<UpdateId>, chat_id: impl Into<ChatId>, text: impl Into<String>) -> Self {
        InboundEvent {
            update_id: update_id.into(),
            message: Some(ChatMessage {
                chat_id: chat_id.into(),
                text: text.into(),
            }),
        }
    }

    /// Creates an event without a chat message.
    pub fn empty(update_id: impl Into<UpdateId>) -> Self {
        InboundEvent {
            update_id: update_id.into(),
            message: None,
        }
    }
}

/// A reading from the CO2 sensor.
///
/// The sensor reports a handful of values; only `co2` drives alerting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(rename = "Pres", alias = "pres", default)]
    pub pressure: i64,
    #[serde(rename = "Ptemp", alias = "ptemp", default)]
    pub pressure_temp: f32,
    #[serde(rename = "Temp", alias = "temp", default)]
    pub temperature: i64,
    #[serde(rename = "Hum", alias = "hum", default)]
    pub humidity: i64,
    #[serde(rename = "CO2", alias = "co2")]
    pub co2: i64,
}

impl SensorReading {
    /// Creates a reading with only the CO2 value set.
    pub fn with_co2(co2: i64) -> Self {
        SensorReading {
            co2,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_reading_parses_device_payload() {
        let json = r#"{"Pres": 1013, "Ptemp": 21.5, "Temp": 22, "Hum": 40, "CO2": 812}"#;
        let reading: SensorReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.co2, 812);
        assert_eq!(reading.pressure, 1013);
        assert_eq!(reading.humidity, 40);
    }

    #[test]
    fn sensor_reading_accepts_lowercase_keys() {
        let reading: SensorReading = serde_json::from_str(r#"{"co2": 650, "temp": 19}"#).unwrap();
        assert_eq!(reading.co2, 650);
        assert_eq!(reading.temperature, 19);
    }

    #[test]
    fn sensor_reading_requires_co2() {
        let result: Result<SensorReading, _> = serde_json::from_str(r#"{"Temp": 22}"#);
        assert!(result.is_err());
    }

    #[test]
    fn text_event_constructor() {
        let event = InboundEvent::text(5, 42, "/co2");
        assert_eq!(event.update_id, UpdateId(5));
        let message = event.message.unwrap();
        assert_eq!(message.chat_id, ChatId(42));
        assert_eq!(message.text, "/co2");
    }
}
