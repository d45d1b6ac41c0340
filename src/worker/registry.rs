//! Registry of conversation workers.
//!
//! The registry maps each monitored conversation to its running worker and
//! guarantees there is at most one live worker per conversation.
//!
//! # Worker Lifecycle
//!
//! - `start` replaces any existing worker for the conversation: the old one
//!   is told to stop before the new one is registered.
//! - `stop` tells the worker to stop and forgets it immediately; it does not
//!   wait for the task to exit.
//! - `forward` delivers control text to a running worker and is a no-op when
//!   there is none.
//!
//! Every change to the map happens under the write lock, so `start`, `stop`
//! and the dead-worker cleanup in `forward` are mutually exclusive. `forward`
//! delivers after releasing the lock. Worker cancellation tokens are children
//! of the registry's shutdown token.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::transport::Transport;
use crate::types::ChatId;

use super::message::WorkerMessage;
use super::schedule::WatchConfig;
use super::watcher::ConversationWorker;

/// Channel buffer size for worker messages.
const WORKER_CHANNEL_BUFFER: usize = 100;

/// Handle to a running conversation worker.
struct WorkerHandle {
    /// Channel for sending messages to the worker.
    tx: mpsc::Sender<WorkerMessage>,

    /// Handle to the worker's async task.
    task: JoinHandle<()>,

    /// Cancellation token for this worker.
    cancel: CancellationToken,

    /// Threshold the worker was started with.
    threshold: u32,
}

impl WorkerHandle {
    /// Asks the worker to stop without waiting for it.
    ///
    /// Cancelling the token also interrupts an in-flight sensor read; the
    /// `Stop` message covers a worker that is between iterations.
    fn request_stop(&self) {
        self.cancel.cancel();
        let _ = self.tx.try_send(WorkerMessage::Stop);
    }

    /// A worker whose task ended (sensor or send failure) is dead even
    /// though its handle is still registered.
    fn is_live(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Maps conversations to their running workers.
pub struct WorkerRegistry<T> {
    transport: Arc<T>,

    config: WatchConfig,

    /// Active workers, keyed by conversation.
    workers: RwLock<HashMap<ChatId, WorkerHandle>>,

    /// Global shutdown token.
    shutdown: CancellationToken,
}

impl<T: Transport> WorkerRegistry<T> {
    /// Creates an empty registry.
    pub fn new(transport: Arc<T>, config: WatchConfig) -> Self {
        Self::new_with_shutdown(transport, config, CancellationToken::new())
    }

    /// Creates an empty registry whose workers stop when `shutdown` fires.
    pub fn new_with_shutdown(
        transport: Arc<T>,
        config: WatchConfig,
        shutdown: CancellationToken,
    ) -> Self {
        WorkerRegistry {
            transport,
            config,
            workers: RwLock::new(HashMap::new()),
            shutdown,
        }
    }

    /// Starts monitoring `chat` with `threshold`, replacing any existing worker.
    #[instrument(skip(self), fields(chat = %chat))]
    pub async fn start(&self, chat: ChatId, threshold: u32) {
        let mut workers = self.workers.write().await;
        workers.retain(|_, h| h.is_live());

        if let Some(old) = workers.remove(&chat) {
            debug!(old_threshold = old.threshold, "Replacing existing worker");
            old.request_stop();
        }

        let worker =
            ConversationWorker::new(chat, threshold, Arc::clone(&self.transport), self.config);

        // The handle and the task share one token so that stop() cancels the
        // task it removes.
        let (tx, rx) = mpsc::channel(WORKER_CHANNEL_BUFFER);
        let cancel = self.shutdown.child_token();
        let cancel_for_task = cancel.clone();

        let task = tokio::spawn(async move {
            if let Err(e) = worker.run(rx, cancel_for_task).await {
                error!(chat = %chat, error = %e, "Worker task failed");
            }
        });

        workers.insert(
            chat,
            WorkerHandle {
                tx,
                task,
                cancel,
                threshold,
            },
        );
        info!(threshold, "Worker started");
    }

    /// Stops monitoring `chat`.
    ///
    /// Returns true if a worker was registered. The worker is removed
    /// immediately; its task exits on its own shortly after.
    #[instrument(skip(self), fields(chat = %chat))]
    pub async fn stop(&self, chat: ChatId) -> bool {
        let mut workers = self.workers.write().await;

        match workers.remove(&chat) {
            Some(handle) => {
                handle.request_stop();
                info!("Worker stopped");
                true
            }
            None => {
                trace!("No worker to stop");
                false
            }
        }
    }

    /// Delivers control text to the worker for `chat`.
    ///
    /// Returns true if a running worker accepted the message. Text for a
    /// conversation without a worker is dropped. A worker whose task has
    /// already died is unregistered.
    ///
    /// The lock is only held to look up the sender. A worker with a full
    /// inbox makes this call wait, but never blocks other conversations.
    #[instrument(skip(self, text), fields(chat = %chat))]
    pub async fn forward(&self, chat: ChatId, text: impl Into<String>) -> bool {
        let tx = {
            let workers = self.workers.read().await;
            match workers.get(&chat) {
                Some(handle) => handle.tx.clone(),
                None => {
                    trace!("No worker, dropping control text");
                    return false;
                }
            }
        };

        if tx.send(WorkerMessage::Control(text.into())).await.is_ok() {
            return true;
        }

        // The worker may have been replaced while we waited; only forget the
        // handle that owns this channel.
        let mut workers = self.workers.write().await;
        if workers.get(&chat).is_some_and(|h| h.tx.same_channel(&tx)) {
            warn!("Worker inbox closed, unregistering dead worker");
            workers.remove(&chat);
        } else {
            debug!("Worker was replaced or stopped during forward");
        }
        false
    }

    /// Returns the number of live workers.
    pub async fn worker_count(&self) -> usize {
        self.workers
            .read()
            .await
            .values()
            .filter(|h| h.is_live())
            .count()
    }

    /// Checks if a live worker is registered for `chat`.
    pub async fn has_worker(&self, chat: ChatId) -> bool {
        self.workers
            .read()
            .await
            .get(&chat)
            .is_some_and(|h| h.is_live())
    }

    /// Returns the threshold of the live worker for `chat`.
    pub async fn threshold(&self, chat: ChatId) -> Option<u32> {
        self.workers
            .read()
            .await
            .get(&chat)
            .filter(|h| h.is_live())
            .map(|h| h.threshold)
    }

    /// Returns the monitored conversations with their thresholds, sorted.
    ///
    /// Workers whose task has ended are left out.
    pub async fn monitored(&self) -> Vec<(ChatId, u32)> {
        let workers = self.workers.read().await;
        let mut entries: Vec<(ChatId, u32)> = workers
            .iter()
            .filter(|(_, h)| h.is_live())
            .map(|(chat, h)| (*chat, h.threshold))
            .collect();
        entries.sort_unstable();
        entries
    }

    /// Stops every worker and cancels the shutdown token.
    pub async fn shutdown_all(&self) {
        info!("Shutting down all workers");
        self.shutdown.cancel();

        let mut workers = self.workers.write().await;
        for (chat, handle) in workers.drain() {
            trace!(chat = %chat, "Sending stop to worker");
            handle.request_stop();
        }
    }
}
