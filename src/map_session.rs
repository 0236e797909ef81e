use crate::app_config::AppConfig;
use crate::flight::{SequencerCommand, Status};
use crate::map_control::{MapEvent, SimulatedMap};
use crate::position::PositionInfo;
use crate::token::TokenStore;
use std::sync::Arc;
use tokio::sync::mpsc::{Receiver, Sender, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch::Sender as WatchSender;
use tracing::{debug, error, info, instrument, warn};

/// Follows the map after start-up: logs camera moves, flags rejected tokens and reloads the map
/// with every newly entered token. A reloaded map is handed to the sequencer once it has loaded.
#[derive(Debug)]
pub struct MapSession {
    config: Arc<AppConfig>,
    store: Arc<dyn TokenStore>,
    events_tx: UnboundedSender<MapEvent>,
    sequencer_tx: Sender<SequencerCommand>,
    status_tx: WatchSender<Status>,
    loading: Option<Arc<SimulatedMap>>,
}

impl MapSession {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn TokenStore>,
        events_tx: UnboundedSender<MapEvent>,
        sequencer_tx: Sender<SequencerCommand>,
        status_tx: WatchSender<Status>,
    ) -> Self {
        MapSession {
            config,
            store,
            events_tx,
            sequencer_tx,
            status_tx,
            loading: None,
        }
    }

    #[instrument(skip_all)]
    pub async fn listen(mut self, mut events_rx: UnboundedReceiver<MapEvent>, mut token_rx: Receiver<String>) {
        loop {
            tokio::select! {
                biased;
                event = events_rx.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
                token = token_rx.recv() => match token {
                    Some(token) => self.reload(token).await,
                    None => break,
                },
            }
        }

        debug!("🗺️ Map session ended");
    }

    async fn handle_event(&mut self, event: MapEvent) {
        match event {
            MapEvent::Moved { center, zoom } => debug!("📍 {}", PositionInfo::new(center, zoom)),
            MapEvent::Loaded => {
                let Some(map) = self.loading.take() else {
                    debug!("🗺️ Map loaded");
                    return;
                };

                info!("🗺️ Reloaded map with the new access token");
                if self.sequencer_tx.send(SequencerCommand::AttachMap(map)).await.is_err() {
                    warn!("⚠️ The sequencer is gone, unable to attach the reloaded map");
                }
            }
            ref token_error if token_error.is_token_error() => {
                warn!("⚠️ The map rejected the access token");
                self.loading = None;
                self.status_tx.send_replace(Status::InvalidToken);
            }
            MapEvent::Error(message) => error!("❌ Map error: {}", message),
        }
    }

    async fn reload(&mut self, token: String) {
        if let Err(e) = self.store.set(&token).await {
            warn!("⚠️ Unable to store the access token: {}", e);
        }

        self.status_tx.send_replace(Status::WaitingForMap);
        self.loading = Some(SimulatedMap::load(&token, self.config.map(), self.events_tx.clone()).await);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use crate::domain::GeoLocation;
    use crate::token::MemoryTokenStore;
    use test_log::test;
    use tokio::sync::{mpsc, watch};
    use tokio::task::JoinHandle;

    struct Harness {
        store: Arc<MemoryTokenStore>,
        events_tx: UnboundedSender<MapEvent>,
        token_tx: Sender<String>,
        sequencer_rx: Receiver<SequencerCommand>,
        status_rx: watch::Receiver<Status>,
        handle: JoinHandle<()>,
    }

    fn start_session() -> Harness {
        let store = Arc::new(MemoryTokenStore::with_token("pk.old"));
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (token_tx, token_rx) = mpsc::channel(8);
        let (sequencer_tx, sequencer_rx) = mpsc::channel(8);
        let (status_tx, status_rx) = watch::channel(Status::MapLoaded);

        let session = MapSession::new(
            Arc::new(AppConfigBuilder::new().build()),
            store.clone(),
            events_tx.clone(),
            sequencer_tx,
            status_tx,
        );
        let handle = tokio::spawn(session.listen(events_rx, token_rx));

        Harness {
            store,
            events_tx,
            token_tx,
            sequencer_rx,
            status_rx,
            handle,
        }
    }

    #[test(tokio::test)]
    async fn a_token_error_after_loading_flags_the_token_as_invalid() {
        let mut harness = start_session();

        harness
            .events_tx
            .send(MapEvent::Moved {
                center: GeoLocation::new(130.2163, 33.5946),
                zoom: 15.0,
            })
            .unwrap();
        harness.events_tx.send(MapEvent::Error("Invalid access token".to_string())).unwrap();

        harness.status_rx.changed().await.unwrap();
        assert_eq!(*harness.status_rx.borrow_and_update(), Status::InvalidToken);

        drop(harness.token_tx);
        harness.handle.await.unwrap();
    }

    #[test(tokio::test)]
    async fn a_new_token_is_stored_and_the_reloaded_map_is_attached() {
        let mut harness = start_session();
        harness.events_tx.send(MapEvent::Error("Invalid access token".to_string())).unwrap();
        harness.status_rx.changed().await.unwrap();

        harness.token_tx.send("pk.new".to_string()).await.unwrap();

        let command = harness.sequencer_rx.recv().await;
        assert!(matches!(command, Some(SequencerCommand::AttachMap(_))));
        assert_eq!(harness.store.get().await.unwrap(), Some("pk.new".to_string()));

        drop(harness.token_tx);
        harness.handle.await.unwrap();
    }

    #[test(tokio::test)]
    async fn a_rejected_new_token_is_flagged_again_and_nothing_is_attached() {
        let mut harness = start_session();

        harness.token_tx.send("not-a-token".to_string()).await.unwrap();
        loop {
            harness.status_rx.changed().await.unwrap();
            if *harness.status_rx.borrow_and_update() == Status::InvalidToken {
                break;
            }
        }

        drop(harness.token_tx);
        harness.handle.await.unwrap();
        assert!(harness.sequencer_rx.try_recv().is_err());
        assert_eq!(harness.store.get().await.unwrap(), Some("not-a-token".to_string()));
    }

    #[test(tokio::test)]
    async fn other_errors_leave_the_status_untouched() {
        let harness = start_session();

        harness.events_tx.send(MapEvent::Error("style not found".to_string())).unwrap();
        drop(harness.token_tx);
        harness.handle.await.unwrap();

        assert_eq!(*harness.status_rx.borrow(), Status::MapLoaded);
    }
}
