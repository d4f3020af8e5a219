pub mod routes;
pub mod state;
mod ws;

use axum::Router;

pub use state::{AppState, StockEvent, StockQuote};

pub fn app(state: AppState) -> Router {
    routes::router(state)
}
