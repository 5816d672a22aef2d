use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use super::{BoardEvent, PublishReport, RoomState, SessionId};

/// Per-session outbound queue length used when none is configured.
pub const DEFAULT_SESSION_CAPACITY: usize = 64;

/// A connected push session: its id and the events queued for it.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub events: mpsc::Receiver<BoardEvent>,
}

/// Shared, lock-protected board membership.
///
/// Cloning is cheap; all clones see the same rooms.
#[derive(Debug, Clone)]
pub struct ChannelRegistry {
    state: Arc<Mutex<RoomState>>,
    capacity: usize,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY)
    }
}

impl ChannelRegistry {
    /// Create a registry whose sessions buffer up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(RoomState::new())),
            capacity: capacity.max(1),
        }
    }

    /// Register a new session with an empty membership set.
    pub async fn connect(&self) -> Session {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.capacity);
        self.state.lock().await.register(id, tx);
        Session { id, events: rx }
    }

    pub async fn join(&self, session: SessionId, board_id: &str) -> bool {
        self.state.lock().await.join(session, board_id)
    }

    pub async fn leave(&self, session: SessionId, board_id: &str) -> bool {
        self.state.lock().await.leave(session, board_id)
    }

    /// Drop the session from every room it joined.
    pub async fn disconnect(&self, session: SessionId) -> Vec<String> {
        self.state.lock().await.disconnect(session)
    }

    /// Deliver to the members present at the time of the call.
    pub async fn publish(&self, board_id: &str, event: BoardEvent) -> PublishReport {
        self.state.lock().await.publish(board_id, &event)
    }

    pub async fn members(&self, board_id: &str) -> Vec<SessionId> {
        self.state.lock().await.members(board_id)
    }

    pub async fn boards_of(&self, session: SessionId) -> Vec<String> {
        self.state.lock().await.boards_of(session)
    }

    pub async fn session_count(&self) -> usize {
        self.state.lock().await.session_count()
    }

    pub async fn board_count(&self) -> usize {
        self.state.lock().await.board_count()
    }
}
