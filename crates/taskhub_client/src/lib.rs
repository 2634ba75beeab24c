use anyhow::Context as _;
use std::sync::Arc;
use taskhub_api::ClientEvent;
use taskhub_backend::{HttpUserApi, SqliteSelectionStore};
use tokio::sync::broadcast;

mod cache;
pub mod engine;

pub use cache::{QueryCache, QueryKey, QuerySnapshot};
pub use engine::{Engine, EngineHandle};

/// Wires the real collaborators together from environment configuration and
/// starts the client engine. Must be called from within a tokio runtime.
pub fn start_client(
    initial_url: &str,
) -> anyhow::Result<(EngineHandle, broadcast::Sender<ClientEvent>)> {
    let store = SqliteSelectionStore::open_default().context("failed to open selection store")?;
    let api = HttpUserApi::from_env().context("failed to configure backend api")?;
    let cache = QueryCache::new();
    Ok(Engine::start(
        Arc::new(store),
        Arc::new(api),
        cache,
        initial_url,
    ))
}
