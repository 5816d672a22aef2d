use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use super::AppState;
use crate::channel::{Session, SessionId};
use crate::entity::is_blank;
use crate::sync::SyncService;

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// A peer silent for this long has missed a whole ping round and is dropped.
const PEER_TIMEOUT: Duration = Duration::from_secs(40);

/// When a session last heard anything from its peer.
#[derive(Debug)]
pub(crate) struct Liveness {
    start: Instant,
    last_seen_ms: AtomicU64,
}

impl Liveness {
    pub(crate) fn new() -> Self {
        Self {
            start: Instant::now(),
            last_seen_ms: AtomicU64::new(0),
        }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Record inbound traffic (any frame, pongs included).
    pub(crate) fn touch(&self) {
        self.last_seen_ms.store(self.now_ms(), Ordering::Relaxed);
    }

    pub(crate) fn idle(&self) -> Duration {
        let last = self.last_seen_ms.load(Ordering::Relaxed);
        Duration::from_millis(self.now_ms().saturating_sub(last))
    }

    pub(crate) fn is_stale(&self, limit: Duration) -> bool {
        self.idle() >= limit
    }
}

/// Frames a client may send on the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinBoard { board_id: String },
    LeaveBoard { board_id: String },
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.sync))
}

async fn handle_socket(socket: WebSocket, sync: SyncService) {
    let Session { id, mut events } = sync.connect().await;
    let (mut sender, mut receiver) = socket.split();
    let liveness = Arc::new(Liveness::new());
    let send_liveness = liveness.clone();

    let mut send_task = tokio::spawn(async move {
        let mut ping = tokio::time::interval(PING_INTERVAL);
        ping.tick().await;
        loop {
            tokio::select! {
                event = events.recv() => {
                    // The registry dropped our queue: we were disconnected.
                    let Some(event) = event else { break };
                    let json = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::warn!(session = %id, error = %e, "failed to encode event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    if send_liveness.is_stale(PEER_TIMEOUT) {
                        tracing::debug!(session = %id, idle = ?send_liveness.idle(), "peer stopped answering pings");
                        break;
                    }
                    if sender.send(Message::Ping(Default::default())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let recv_sync = sync.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            liveness.touch();
            match msg {
                Message::Text(text) => handle_client_text(&recv_sync, id, text.as_str()).await,
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    sync.on_disconnect(id).await;
}

/// Apply one text frame from a session. Unknown or malformed frames are
/// ignored.
pub(crate) async fn handle_client_text(sync: &SyncService, session: SessionId, text: &str) {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(%session, error = %e, "ignoring malformed frame");
            return;
        }
    };

    match message {
        ClientMessage::JoinBoard { board_id } if !is_blank(&board_id) => {
            sync.on_join(session, &board_id).await;
        }
        ClientMessage::LeaveBoard { board_id } if !is_blank(&board_id) => {
            sync.on_leave(session, &board_id).await;
        }
        other => tracing::debug!(%session, ?other, "ignoring frame without board_id"),
    }
}
