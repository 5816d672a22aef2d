// src/entity/note.rs
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Subtle background colours a note may be given at creation.
pub const PALETTE: [&str; 5] = ["#f8f8f8", "#f0f0f0", "#e8e8e8", "#f5f5f5", "#efefef"];

/// Column default for `color`; always overwritten on insert.
pub const DEFAULT_COLOR: &str = "#FFE4B5";

/// Pick a palette colour uniformly at random.
pub fn random_color() -> &'static str {
    PALETTE
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(PALETTE[0])
}

pub fn is_palette_color(color: &str) -> bool {
    PALETTE.contains(&color)
}

/// A stored note. Immutable once the store hands it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub board_id: String,
    pub content: String,
    pub color: String,
    pub timestamp: DateTime<Utc>,
}

impl Note {
    /// The client-facing projection; `board_id` is withheld.
    pub fn view(&self) -> NoteView {
        NoteView {
            id: self.id,
            content: self.content.clone(),
            color: self.color.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// What clients see of a note, both in HTTP responses and push events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteView {
    pub id: i64,
    pub content: String,
    pub color: String,
    pub timestamp: DateTime<Utc>,
}

impl From<Note> for NoteView {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            content: note.content,
            color: note.color,
            timestamp: note.timestamp,
        }
    }
}
