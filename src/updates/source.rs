//! Ordered, deduplicated stream of inbound updates.
//!
//! The remote update log is consumed by repeated long-polls. The source keeps
//! an offset cursor (the smallest update ID not yet handed out), asks the
//! transport for updates at or above it, and hands them to the consumer one at
//! a time in the order received.
//!
//! # Invariants
//!
//! - The cursor only increases. After an event is handed out the cursor is
//!   that event's ID + 1.
//! - An event whose ID is below the cursor is never handed out, even if the
//!   transport returns it again. The offset sent to the server is only a hint.
//! - A new fetch is only issued once the previous batch has been fully handed
//!   out, so at most one batch is buffered.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace};

use crate::transport::{Result, Transport};
use crate::types::{InboundEvent, UpdateId};

/// Default server-side long-poll bound.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(60);

/// Pulls inbound events from the remote update log.
pub struct UpdateSource<T> {
    transport: Arc<T>,
    cursor: UpdateId,
    batch: VecDeque<InboundEvent>,
    poll_timeout: Duration,
    limit: Option<u32>,
}

impl<T: Transport> UpdateSource<T> {
    /// Creates a source starting at offset 0.
    pub fn new(transport: Arc<T>) -> Self {
        UpdateSource {
            transport,
            cursor: UpdateId::default(),
            batch: VecDeque::new(),
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            limit: None,
        }
    }

    /// Sets the server-side long-poll bound.
    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    /// Caps the number of updates requested per poll.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns the current offset: the smallest update ID not yet handed out.
    pub fn cursor(&self) -> UpdateId {
        self.cursor
    }

    /// Returns the next event, polling the transport as often as needed.
    ///
    /// Never returns `Ok` without an event; an idle long poll simply loops.
    /// Transport errors are returned unchanged and leave the cursor where it
    /// was.
    pub async fn next_event(&mut self) -> Result<InboundEvent> {
        loop {
            while let Some(event) = self.batch.pop_front() {
                if event.update_id < self.cursor {
                    trace!(
                        update_id = %event.update_id,
                        cursor = %self.cursor,
                        "Dropping already-consumed update"
                    );
                    continue;
                }
                self.cursor = event.update_id.next();
                return Ok(event);
            }

            let batch = self
                .transport
                .fetch_events(self.cursor, self.limit, self.poll_timeout)
                .await?;
            self.batch.extend(batch);
        }
    }

    /// Moves the source onto its own task and returns the receiving end.
    ///
    /// Consumes the source, so a second subscription against the same
    /// offset cannot be created. The task only takes the next event (and so
    /// only long-polls again, acknowledging the previous offset to the
    /// server) once the consumer has received the previous one.
    pub fn subscribe(self, shutdown: CancellationToken) -> Subscription {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(self.pump(tx, shutdown));
        Subscription { events: rx, task }
    }

    #[instrument(skip_all)]
    async fn pump(mut self, tx: mpsc::Sender<InboundEvent>, shutdown: CancellationToken) -> Result<()> {
        info!("Update source started");

        loop {
            // With a single slot, a permit is only available once the
            // consumer has taken the previous event.
            let permit = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(cursor = %self.cursor, "Shutdown signal received, stopping update source");
                    return Ok(());
                }
                permit = tx.reserve() => match permit {
                    Ok(permit) => permit,
                    Err(_) => {
                        debug!(cursor = %self.cursor, "Event consumer went away, stopping update source");
                        return Ok(());
                    }
                },
            };

            let event = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(cursor = %self.cursor, "Shutdown signal received, stopping update source");
                    return Ok(());
                }
                event = self.next_event() => match event {
                    Ok(event) => event,
                    Err(e) => {
                        error!(error = %e, cursor = %self.cursor, "Fetching updates failed");
                        return Err(e);
                    }
                },
            };

            trace!(update_id = %event.update_id, "Handing out update");
            permit.send(event);
        }
    }
}

/// A running update source: the event receiver plus the task feeding it.
///
/// When the receiver yields `None` the task has ended; awaiting `task`
/// reports why.
#[derive(Debug)]
pub struct Subscription {
    pub events: mpsc::Receiver<InboundEvent>,
    pub task: JoinHandle<Result<()>>,
}
