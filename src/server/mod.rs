//! Status HTTP server.
//!
//! An optional read-only surface next to the bot loop:
//!
//! - `GET /health` - Returns 200 if the server is running
//! - `GET /api/v1/workers` - Lists monitored conversations as JSON

use std::sync::Arc;

use crate::transport::Transport;
use crate::worker::WorkerRegistry;

pub mod workers;

pub use workers::{WorkerSummary, WorkersResponse, workers_handler};

/// Shared application state, passed to handlers via Axum's `State` extractor.
pub struct AppState<T> {
    registry: Arc<WorkerRegistry<T>>,
}

// Manual impl: `T` itself need not be `Clone`.
impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        AppState {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> AppState<T> {
    /// Creates an `AppState` over the bot's worker registry.
    pub fn new(registry: Arc<WorkerRegistry<T>>) -> Self {
        AppState { registry }
    }

    /// Returns the worker registry.
    pub fn registry(&self) -> &Arc<WorkerRegistry<T>> {
        &self.registry
    }
}

/// Liveness probe. Answers `OK` for as long as the runtime is serving requests.
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Builds the axum Router with all endpoints.
pub fn build_router<T: Transport>(app_state: AppState<T>) -> axum::Router {
    use axum::routing::get;

    axum::Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/workers", get(workers_handler::<T>))
        .with_state(app_state)
}
