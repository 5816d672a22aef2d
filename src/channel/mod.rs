//! Board rooms: which sessions are listening to which board, and fan-out of
//! events to them.
//!
//! Each session owns a bounded outbound queue. Publishing never waits on a
//! session: a full or closed queue is a dropped delivery for that session
//! only, and the session re-syncs from a snapshot later.

mod registry;
mod room;

pub use registry::{ChannelRegistry, Session, DEFAULT_SESSION_CAPACITY};
pub use room::{PublishReport, RoomState};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::NoteView;

/// Identifier of one connected push session.
pub type SessionId = Uuid;

/// Events pushed from the server to board members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum BoardEvent {
    NewThought(NoteView),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_new_thought_wire_shape() {
        let event = BoardEvent::NewThought(NoteView {
            id: 3,
            content: "hi".to_string(),
            color: "#e8e8e8".to_string(),
            timestamp: Utc::now(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "new_thought");
        assert_eq!(json["data"]["id"], 3);
        assert_eq!(json["data"]["content"], "hi");
        assert!(json["data"].get("board_id").is_none());
    }
}
