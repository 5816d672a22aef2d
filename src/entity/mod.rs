mod note;

pub use note::{is_palette_color, random_color, Note, NoteView, DEFAULT_COLOR, PALETTE};

/// Whitespace-only board ids count as absent. Accepted values are stored
/// verbatim, untrimmed.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
