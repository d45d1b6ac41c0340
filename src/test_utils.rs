//! Shared test utilities: an in-memory transport with scripted responses.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::transport::{ReplyKeyboard, Result, Transport, TransportError};
use crate::types::{ChatId, InboundEvent, SensorReading, UpdateId};

/// A message recorded by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { chat: ChatId, text: String },
    Keyboard { chat: ChatId, prompt: String, keyboard: ReplyKeyboard },
}

impl Sent {
    pub fn chat(&self) -> ChatId {
        match self {
            Sent::Text { chat, .. } | Sent::Keyboard { chat, .. } => *chat,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Sent::Text { text, .. } => text,
            Sent::Keyboard { prompt, .. } => prompt,
        }
    }
}

/// In-memory [`Transport`].
///
/// - `fetch_events` pops scripted batches in order; once they run out it
///   never returns (an idle long poll).
/// - `read_sensor` pops scripted readings; once they run out it keeps
///   returning the fallback reading.
/// - Sends are recorded and always succeed.
#[derive(Debug, Default)]
pub struct MockTransport {
    batches: Mutex<VecDeque<Result<Vec<InboundEvent>>>>,
    offsets: Mutex<Vec<UpdateId>>,
    limits: Mutex<Vec<Option<u32>>>,
    readings: Mutex<VecDeque<Result<SensorReading>>>,
    fallback_co2: Mutex<i64>,
    sensor_reads: Mutex<usize>,
    sensor_latency: Mutex<Duration>,
    sent: Mutex<Vec<Sent>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&self, events: Vec<InboundEvent>) {
        self.batches.lock().unwrap().push_back(Ok(events));
    }

    pub fn push_fetch_error(&self, err: TransportError) {
        self.batches.lock().unwrap().push_back(Err(err));
    }

    pub fn push_co2(&self, co2: i64) {
        self.readings
            .lock()
            .unwrap()
            .push_back(Ok(SensorReading::with_co2(co2)));
    }

    pub fn push_sensor_error(&self, err: TransportError) {
        self.readings.lock().unwrap().push_back(Err(err));
    }

    pub fn set_fallback_co2(&self, co2: i64) {
        *self.fallback_co2.lock().unwrap() = co2;
    }

    pub fn set_sensor_latency(&self, latency: Duration) {
        *self.sensor_latency.lock().unwrap() = latency;
    }

    /// Offsets passed to `fetch_events`, in call order.
    pub fn requested_offsets(&self) -> Vec<UpdateId> {
        self.offsets.lock().unwrap().clone()
    }

    /// Limits passed to `fetch_events`, in call order.
    pub fn requested_limits(&self) -> Vec<Option<u32>> {
        self.limits.lock().unwrap().clone()
    }

    pub fn sensor_reads(&self) -> usize {
        *self.sensor_reads.lock().unwrap()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts (or keyboard prompts) sent to one chat, in order.
    pub fn sent_to(&self, chat: ChatId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.chat() == chat)
            .map(|s| s.text().to_string())
            .collect()
    }
}

impl Transport for MockTransport {
    async fn fetch_events(
        &self,
        offset: UpdateId,
        limit: Option<u32>,
        _timeout: Duration,
    ) -> Result<Vec<InboundEvent>> {
        self.offsets.lock().unwrap().push(offset);
        self.limits.lock().unwrap().push(limit);
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => std::future::pending().await,
        }
    }

    async fn send_text(&self, chat: ChatId, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Text {
            chat,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_keyboard(
        &self,
        chat: ChatId,
        prompt: &str,
        keyboard: &ReplyKeyboard,
    ) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Keyboard {
            chat,
            prompt: prompt.to_string(),
            keyboard: keyboard.clone(),
        });
        Ok(())
    }

    async fn read_sensor(&self) -> Result<SensorReading> {
        *self.sensor_reads.lock().unwrap() += 1;
        let latency = *self.sensor_latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let next = self.readings.lock().unwrap().pop_front();
        match next {
            Some(reading) => reading,
            None => Ok(SensorReading::with_co2(*self.fallback_co2.lock().unwrap())),
        }
    }
}
