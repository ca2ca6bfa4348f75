use crate::records::Message;
use crate::state;

use axum::Json;
use axum::extract::Path as AxumPath;
use axum::extract::State;
use serde::Serialize;

#[derive(Serialize)]
pub(crate) struct ThreadResponse {
    pub(crate) revision: u64,
    pub(crate) messages: Vec<Message>,
}

/// Backs the conversation view's 3-second poll. An id that matches no
/// complaint simply yields an empty thread; orphans are never rendered.
pub(crate) async fn thread_messages(
    State(state): State<state::AppState>,
    AxumPath(id): AxumPath<i64>,
) -> Json<ThreadResponse> {
    Json(ThreadResponse {
        revision: state.messages.revision(),
        messages: state.messages.thread(id),
    })
}
