use axum::{routing::get, Router};

use crate::{state::AppState, ws};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws/stocks", get(ws::stocks_socket))
        .with_state(state)
}
