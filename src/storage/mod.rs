mod note_store;

pub use note_store::{format_timestamp, parse_timestamp, NoteStore, DEFAULT_DB, TIMESTAMP_FORMAT};
