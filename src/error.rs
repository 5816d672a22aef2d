use thiserror::Error;

/// Message returned to clients when a submit is missing either field.
pub const MISSING_FIELDS: &str = "Missing board_id or content";

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoardError {
    /// The validation error for a submit without `board_id` or `content`.
    pub fn missing_fields() -> Self {
        BoardError::Validation(MISSING_FIELDS.to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, BoardError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
