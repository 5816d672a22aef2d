use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc::{self, error::TrySendError};

use super::{BoardEvent, SessionId};

/// Outcome of one publish call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Sessions whose queue accepted the event.
    pub delivered: usize,
    /// Sessions whose queue was full or already closed.
    pub dropped: usize,
}

#[derive(Debug)]
struct SessionEntry {
    outbox: mpsc::Sender<BoardEvent>,
    boards: HashSet<String>,
}

/// Membership bookkeeping for every board room.
///
/// Both directions are indexed so that a disconnect can leave every room
/// without scanning all boards.
#[derive(Debug, Default)]
pub struct RoomState {
    rooms: HashMap<String, HashSet<SessionId>>,
    sessions: HashMap<SessionId, SessionEntry>,
}

impl RoomState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session and the queue its events go to.
    pub fn register(&mut self, session: SessionId, outbox: mpsc::Sender<BoardEvent>) {
        self.sessions.insert(
            session,
            SessionEntry {
                outbox,
                boards: HashSet::new(),
            },
        );
    }

    /// Add a session to a board's room. Returns true if it was not already a
    /// member; unknown sessions are ignored.
    pub fn join(&mut self, session: SessionId, board_id: &str) -> bool {
        let Some(entry) = self.sessions.get_mut(&session) else {
            return false;
        };
        if !entry.boards.insert(board_id.to_string()) {
            return false;
        }
        self.rooms
            .entry(board_id.to_string())
            .or_default()
            .insert(session);
        true
    }

    /// Remove a session from a board's room. Returns true if it was a member.
    pub fn leave(&mut self, session: SessionId, board_id: &str) -> bool {
        let was_member = self
            .sessions
            .get_mut(&session)
            .is_some_and(|entry| entry.boards.remove(board_id));
        if was_member {
            self.remove_from_room(session, board_id);
        }
        was_member
    }

    /// Forget a session entirely. Returns the boards it was still joined to.
    pub fn disconnect(&mut self, session: SessionId) -> Vec<String> {
        let Some(entry) = self.sessions.remove(&session) else {
            return Vec::new();
        };
        let mut boards: Vec<String> = entry.boards.into_iter().collect();
        boards.sort();
        for board_id in &boards {
            self.remove_from_room(session, board_id);
        }
        boards
    }

    /// Hand `event` to every current member of `board_id` without waiting.
    ///
    /// Sessions whose queue has been closed are forgotten on the way.
    pub fn publish(&mut self, board_id: &str, event: &BoardEvent) -> PublishReport {
        let mut report = PublishReport::default();
        let Some(members) = self.rooms.get(board_id) else {
            return report;
        };

        let mut closed = Vec::new();
        for session in members {
            let Some(entry) = self.sessions.get(session) else {
                continue;
            };
            match entry.outbox.try_send(event.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::debug!(%session, board_id, "session queue full, dropping event");
                    report.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(%session, board_id, "session queue closed, dropping event");
                    report.dropped += 1;
                    closed.push(*session);
                }
            }
        }

        for session in closed {
            self.disconnect(session);
        }
        report
    }

    /// Current members of a board, in no particular order.
    pub fn members(&self, board_id: &str) -> Vec<SessionId> {
        self.rooms
            .get(board_id)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Boards a session is joined to, sorted.
    pub fn boards_of(&self, session: SessionId) -> Vec<String> {
        let mut boards: Vec<String> = self
            .sessions
            .get(&session)
            .map(|entry| entry.boards.iter().cloned().collect())
            .unwrap_or_default();
        boards.sort();
        boards
    }

    pub fn is_connected(&self, session: SessionId) -> bool {
        self.sessions.contains_key(&session)
    }

    /// Number of boards with at least one member.
    pub fn board_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn remove_from_room(&mut self, session: SessionId, board_id: &str) {
        if let Some(members) = self.rooms.get_mut(board_id) {
            members.remove(&session);
            if members.is_empty() {
                self.rooms.remove(board_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::NoteView;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    fn event(id: i64) -> BoardEvent {
        BoardEvent::NewThought(NoteView {
            id,
            content: format!("note {}", id),
            color: "#f8f8f8".to_string(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        })
    }

    fn session(state: &mut RoomState, capacity: usize) -> (SessionId, mpsc::Receiver<BoardEvent>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(capacity);
        state.register(id, tx);
        (id, rx)
    }

    #[test]
    fn test_join_is_idempotent() {
        let mut state = RoomState::new();
        let (s, _rx) = session(&mut state, 4);

        assert!(state.join(s, "team-x"));
        assert!(!state.join(s, "team-x"));
        assert_eq!(state.members("team-x"), vec![s]);
    }

    #[test]
    fn test_join_unknown_session_is_ignored() {
        let mut state = RoomState::new();
        assert!(!state.join(Uuid::new_v4(), "team-x"));
        assert_eq!(state.board_count(), 0);
    }

    #[test]
    fn test_leave_non_member_is_noop() {
        let mut state = RoomState::new();
        let (s, _rx) = session(&mut state, 4);
        assert!(!state.leave(s, "team-x"));
        assert!(!state.leave(Uuid::new_v4(), "team-x"));
    }

    #[test]
    fn test_leave_drops_empty_room() {
        let mut state = RoomState::new();
        let (s, _rx) = session(&mut state, 4);
        state.join(s, "team-x");
        assert_eq!(state.board_count(), 1);

        assert!(state.leave(s, "team-x"));
        assert_eq!(state.board_count(), 0);
        assert!(state.boards_of(s).is_empty());
        assert!(state.is_connected(s));
    }

    #[test]
    fn test_session_in_multiple_boards() {
        let mut state = RoomState::new();
        let (s, mut rx) = session(&mut state, 4);
        state.join(s, "a");
        state.join(s, "b");
        assert_eq!(state.boards_of(s), vec!["a", "b"]);

        state.publish("a", &event(1));
        state.publish("b", &event(2));
        assert_eq!(rx.try_recv().unwrap(), event(1));
        assert_eq!(rx.try_recv().unwrap(), event(2));
    }

    #[test]
    fn test_disconnect_leaves_every_board() {
        let mut state = RoomState::new();
        let (s, _rx) = session(&mut state, 4);
        let (other, _orx) = session(&mut state, 4);
        state.join(s, "a");
        state.join(s, "b");
        state.join(other, "b");

        assert_eq!(state.disconnect(s), vec!["a", "b"]);
        assert!(!state.is_connected(s));
        assert!(state.members("a").is_empty());
        assert_eq!(state.members("b"), vec![other]);
        assert_eq!(state.board_count(), 1);

        assert!(state.disconnect(s).is_empty());
    }

    #[test]
    fn test_publish_reaches_members_only() {
        let mut state = RoomState::new();
        let (member, mut member_rx) = session(&mut state, 4);
        let (outsider, mut outsider_rx) = session(&mut state, 4);
        state.join(member, "team-x");
        state.join(outsider, "team-y");

        let report = state.publish("team-x", &event(1));

        assert_eq!(report, PublishReport { delivered: 1, dropped: 0 });
        assert!(member_rx.try_recv().is_ok());
        assert!(outsider_rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_to_empty_board() {
        let mut state = RoomState::new();
        assert_eq!(state.publish("nobody", &event(1)), PublishReport::default());
    }

    #[test]
    fn test_full_queue_only_affects_that_session() {
        let mut state = RoomState::new();
        let (slow, _slow_rx) = session(&mut state, 1);
        let (fast, mut fast_rx) = session(&mut state, 8);
        state.join(slow, "b");
        state.join(fast, "b");

        let first = state.publish("b", &event(1));
        let second = state.publish("b", &event(2));

        assert_eq!(first, PublishReport { delivered: 2, dropped: 0 });
        assert_eq!(second, PublishReport { delivered: 1, dropped: 1 });
        assert!(fast_rx.try_recv().is_ok());
        assert!(fast_rx.try_recv().is_ok());
        assert!(state.is_connected(slow));
    }

    #[test]
    fn test_closed_queue_is_forgotten() {
        let mut state = RoomState::new();
        let (gone, rx) = session(&mut state, 4);
        state.join(gone, "b");
        drop(rx);

        let report = state.publish("b", &event(1));

        assert_eq!(report, PublishReport { delivered: 0, dropped: 1 });
        assert!(!state.is_connected(gone));
        assert_eq!(state.board_count(), 0);
    }
}
