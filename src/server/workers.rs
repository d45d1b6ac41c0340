//! Worker inspection endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::transport::Transport;

use super::AppState;

/// One monitored conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerSummary {
    pub chat_id: i64,
    pub threshold: u32,
}

/// Response body of `GET /api/v1/workers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkersResponse {
    pub workers: Vec<WorkerSummary>,
}

/// Lists the conversations currently being monitored, ordered by chat id.
pub async fn workers_handler<T: Transport>(
    State(app_state): State<AppState<T>>,
) -> Json<WorkersResponse> {
    let workers = app_state
        .registry()
        .monitored()
        .await
        .into_iter()
        .map(|(chat, threshold)| WorkerSummary {
            chat_id: chat.0,
            threshold,
        })
        .collect();

    Json(WorkersResponse { workers })
}
