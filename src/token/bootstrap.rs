use crate::app_config::AppConfig;
use crate::flight::Status;
use crate::map_control::{MapEvent, SimulatedMap};
use crate::token::{TokenPrompt, TokenStore, TokenStoreError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::watch::Sender as WatchSender;
use tracing::{debug, info, instrument, warn};

/// Returns the stored token, the token from the generated configuration or, when neither exists,
/// a token entered by the user, which is then stored.
#[instrument(skip_all)]
pub async fn resolve_token(
    store: &dyn TokenStore,
    configured_token: Option<&str>,
    prompt: &mut dyn TokenPrompt,
    status_tx: &WatchSender<Status>,
) -> Result<String, BootstrapError> {
    if let Some(token) = store.get().await? {
        debug!("🔑 Using the stored access token");
        return Ok(token);
    }

    if let Some(token) = configured_token {
        debug!("🔑 Using the configured access token");
        return Ok(token.to_string());
    }

    status_tx.send_replace(Status::WaitingForToken);
    ask_and_store(store, prompt, None).await
}

/// Loads the map, asking for a new token for as long as the map rejects it.
#[instrument(skip_all)]
pub async fn load_map(
    config: &AppConfig,
    store: &dyn TokenStore,
    prompt: &mut dyn TokenPrompt,
    status_tx: &WatchSender<Status>,
    events_tx: UnboundedSender<MapEvent>,
    events_rx: &mut UnboundedReceiver<MapEvent>,
) -> Result<Arc<SimulatedMap>, BootstrapError> {
    let mut token = resolve_token(store, config.mapbox().access_token(), prompt, status_tx).await?;

    loop {
        status_tx.send_replace(Status::WaitingForMap);
        let map = SimulatedMap::load(&token, config.map(), events_tx.clone()).await;

        loop {
            match events_rx.recv().await {
                Some(MapEvent::Loaded) => {
                    info!("🗺️ Map is ready");
                    return Ok(map);
                }
                Some(event) if event.is_token_error() => {
                    warn!("⚠️ The map rejected the access token");
                    status_tx.send_replace(Status::InvalidToken);
                    break;
                }
                Some(MapEvent::Error(message)) => return Err(BootstrapError::Map(message)),
                Some(event) => debug!(?event, "🗺️ Ignoring map event while loading"),
                None => return Err(BootstrapError::MapEventsClosed),
            }
        }

        let previous = store.get().await?;
        token = ask_and_store(store, prompt, previous.as_deref()).await?;
    }
}

async fn ask_and_store(store: &dyn TokenStore, prompt: &mut dyn TokenPrompt, hint: Option<&str>) -> Result<String, BootstrapError> {
    let token = prompt.ask(hint).await.ok_or(BootstrapError::NoToken)?;
    store.set(&token).await?;
    info!("🔑 Saved the access token");
    Ok(token)
}

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("no access token was entered")]
    NoToken,
    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
    #[error("the map failed to load: {0}")]
    Map(String),
    #[error("the map event channel closed unexpectedly")]
    MapEventsClosed,
}
