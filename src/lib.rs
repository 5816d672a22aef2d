pub mod channel;
pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod lang;
pub mod logging;
pub mod server;
pub mod storage;
pub mod sync;

pub use channel::{BoardEvent, ChannelRegistry, SessionId};
pub use config::Config;
pub use entity::{Note, NoteView};
pub use error::{BoardError, Result};
pub use storage::NoteStore;
pub use sync::SyncService;
