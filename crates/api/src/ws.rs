use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::{AppState, StockEvent};

pub async fn stocks_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| stream_events(socket, state))
}

async fn stream_events(mut socket: WebSocket, state: AppState) {
    // Subscribe first so nothing published after `connected` is missed.
    let mut events = state.subscribe_events();
    if send_event(&mut socket, &StockEvent::Connected).await.is_err() {
        return;
    }
    debug!("price subscriber connected");

    loop {
        tokio::select! {
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(error = %err, "price subscriber socket error");
                        break;
                    }
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if send_event(&mut socket, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "price subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    debug!("price subscriber disconnected");
}

async fn send_event(socket: &mut WebSocket, event: &StockEvent) -> Result<(), ()> {
    let payload = event_json(event)?;
    socket.send(Message::Text(payload)).await.map_err(|_| ())
}

fn event_json(event: &StockEvent) -> Result<String, ()> {
    serde_json::to_string(event).map_err(|err| {
        warn!(error = %err, "failed to encode stock event");
    })
}
