//! WebSocket handler: the bot-to-mini-app bridge.
//!
//! DESIGN
//! ======
//! On upgrade, creates a fresh `AssemblySession` and enters a `select!` loop:
//! - Incoming text messages → `AssemblySession::ingest` → frames to client
//! - Sweep tick → `AssemblySession::sweep_stalled` → stall frames to client
//!
//! The session is owned by the connection task, so each message runs to
//! completion before the next is read and no locking is needed.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with `session_id`
//! 2. Bot messages → ingest → progress / record / error frames
//! 3. Close → teardown (incomplete assemblies dropped)

use std::time::Instant;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::frame::{Data, Frame, Status};
use crate::services::assembly::AssemblySession;
use crate::state::AppState;

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4();
    let mut session = AssemblySession::new(session_id, &state.config);

    let welcome = Frame::request("session:connected", Data::new())
        .with_session_id(session_id)
        .with_data("session_id", session_id.to_string());
    if send_frame(&mut socket, &welcome).await.is_err() {
        return;
    }
    info!(%session_id, "ws: bridge connected");

    let mut sweep = tokio::time::interval(state.config.sweep_interval);
    sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    'conn: loop {
        let frames = tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => session.ingest(text.as_str(), Instant::now()),
                    Message::Close(_) => break,
                    _ => continue,
                }
            }
            _ = sweep.tick() => session.sweep_stalled(Instant::now()),
        };

        for frame in &frames {
            if send_frame(&mut socket, frame).await.is_err() {
                break 'conn;
            }
        }
    }

    let pending = session.pending();
    session.teardown();
    info!(%session_id, pending, "ws: bridge disconnected");
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    if frame.status == Status::Error {
        let code = frame
            .data
            .get("code")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        warn!(id = %frame.id, action = %frame.action, code, "ws: send frame status=Error");
    } else if frame.status.is_terminal() || frame.prefix() != "assembly" {
        info!(id = %frame.id, action = %frame.action, status = ?frame.status, "ws: send frame");
    } else {
        debug!(id = %frame.id, action = %frame.action, status = ?frame.status, "ws: send progress");
    }
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
