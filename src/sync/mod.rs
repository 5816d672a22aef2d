//! Ties durable storage to live fan-out.
//!
//! A submit is written to the [`NoteStore`] first; only a committed note is
//! published to the board's room. The submitter's confirmation is the return
//! value, independent of how delivery to other sessions went.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::channel::{BoardEvent, ChannelRegistry, PublishReport, Session, SessionId};
use crate::entity::NoteView;
use crate::error::Result;
use crate::storage::NoteStore;

/// Process-wide state: one store, one membership registry.
#[derive(Clone)]
pub struct SyncService {
    store: Arc<Mutex<NoteStore>>,
    channels: ChannelRegistry,
}

impl SyncService {
    pub fn new(store: NoteStore, channels: ChannelRegistry) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            channels,
        }
    }

    pub fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }

    /// Store a note and push it to everyone viewing its board.
    ///
    /// Validation failures publish nothing. The store lock is held across the
    /// publish so push order on a board matches id order.
    pub async fn submit_note(&self, board_id: &str, content: &str) -> Result<NoteView> {
        let store = self.store.lock().await;
        let note = match store.append(board_id, content) {
            Ok(note) => note,
            Err(e) => {
                if !e.is_validation() {
                    tracing::error!(board_id, error = %e, "failed to store note");
                }
                return Err(e);
            }
        };

        let view = note.view();
        let PublishReport { delivered, dropped } = self
            .channels
            .publish(board_id, BoardEvent::NewThought(view.clone()))
            .await;
        drop(store);

        tracing::debug!(board_id, id = view.id, delivered, dropped, "note published");
        Ok(view)
    }

    /// Every note on the board as clients see it, oldest first.
    pub async fn snapshot(&self, board_id: &str) -> Result<Vec<NoteView>> {
        let notes = self.store.lock().await.list_by_board(board_id);
        match notes {
            Ok(notes) => Ok(notes.into_iter().map(NoteView::from).collect()),
            Err(e) => {
                tracing::error!(board_id, error = %e, "failed to list notes");
                Err(e)
            }
        }
    }

    /// Number of stored notes on a board.
    pub async fn note_count(&self, board_id: &str) -> Result<usize> {
        self.store.lock().await.count_by_board(board_id)
    }

    /// Open a push session with no board memberships.
    pub async fn connect(&self) -> Session {
        let session = self.channels.connect().await;
        tracing::debug!(session = %session.id, "session connected");
        session
    }

    pub async fn on_join(&self, session: SessionId, board_id: &str) {
        self.channels.join(session, board_id).await;
        tracing::info!(%session, board_id, "user joined board");
    }

    pub async fn on_leave(&self, session: SessionId, board_id: &str) {
        self.channels.leave(session, board_id).await;
        tracing::info!(%session, board_id, "user left board");
    }

    pub async fn on_disconnect(&self, session: SessionId) {
        let boards = self.channels.disconnect(session).await;
        tracing::info!(%session, boards = ?boards, "user disconnected");
    }
}
