use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::channel::ChannelRegistry;
use crate::config::{Config, Overrides};
use crate::error::Result;
use crate::server;
use crate::storage::NoteStore;
use crate::sync::SyncService;

fn load_config(config_path: Option<&Path>, overrides: Overrides) -> Result<Config> {
    let mut config = Config::load_from(config_path)?;
    config.apply_overrides(overrides);
    config.validate()?;
    Ok(config)
}

fn database_only(database: Option<PathBuf>) -> Overrides {
    Overrides {
        database,
        ..Overrides::default()
    }
}

pub fn handle_serve(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
    database: Option<PathBuf>,
    dev: bool,
) -> Result<()> {
    let config = load_config(
        config_path,
        Overrides {
            host,
            port,
            database,
        },
    )?;
    config.require_secret(dev)?;

    let store = NoteStore::open(&config.storage.database_path)?;
    tracing::info!(path = %config.storage.database_path.display(), "note store ready");
    let sync = SyncService::new(
        store,
        ChannelRegistry::new(config.server.session_queue_capacity),
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let shutdown = CancellationToken::new();
        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
            }
            signal_token.cancel();
        });

        server::serve(&config, sync, shutdown).await
    })
}

pub fn handle_init(config_path: Option<&Path>, database: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path, database_only(database))?;
    NoteStore::open(&config.storage.database_path)?;

    println!(
        "Initialized note store at {}",
        config.storage.database_path.display()
    );
    Ok(())
}

pub fn handle_post(
    config_path: Option<&Path>,
    board_id: String,
    content: String,
    database: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path, database_only(database))?;
    let store = NoteStore::open(&config.storage.database_path)?;

    let note = store.append(&board_id, &content)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note.view())?);
    } else {
        println!("Added note {} to {} ({})", note.id, note.board_id, note.color);
    }
    Ok(())
}

pub fn handle_list(
    config_path: Option<&Path>,
    board_id: String,
    database: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path, database_only(database))?;
    let store = NoteStore::open(&config.storage.database_path)?;

    let views: Vec<_> = store
        .list_by_board(&board_id)?
        .iter()
        .map(|n| n.view())
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("No notes on {}", board_id);
        return Ok(());
    }
    for view in views {
        println!(
            "{:>4}  {}  {}",
            view.id,
            view.timestamp.format("%Y-%m-%d %H:%M:%S"),
            view.content
        );
    }
    Ok(())
}
