//! HTTP and WebSocket surface.
//!
//! # Endpoints
//!
//! - `GET /` - landing page
//! - `GET /{board_id}` - board page with the current snapshot
//! - `POST /add_thought` - submit `{board_id, content}`
//! - `GET /get_thoughts/{board_id}` - snapshot as JSON
//! - `GET /ws` - push channel (`join_board`, `leave_board`, `new_thought`)
//! - `GET /static/board.js` - board page client
//! - `GET /health` - liveness

mod api;
mod pages;
mod ws;

pub use ws::ClientMessage;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::Result;
use crate::sync::SyncService;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub sync: SyncService,
}

impl AppState {
    pub fn new(sync: SyncService) -> Self {
        Self { sync }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::landing))
        .route("/health", get(api::health))
        .route("/add_thought", post(api::add_thought))
        .route("/get_thoughts/{board_id}", get(api::get_thoughts))
        .route("/ws", get(ws::ws_handler))
        .route("/static/board.js", get(pages::board_script))
        .route("/{board_id}", get(pages::board))
        .with_state(state)
}

/// Bind to the configured address and serve until `shutdown` fires.
pub async fn serve(config: &Config, sync: SyncService, shutdown: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    serve_on(listener, sync, shutdown).await
}

/// Serve on an already bound listener.
pub async fn serve_on(
    listener: TcpListener,
    sync: SyncService,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "thoughtboard listening");

    axum::serve(listener, create_router(AppState::new(sync)))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}
