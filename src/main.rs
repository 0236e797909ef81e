use crate::app_config::{AppConfig, GENERATED_CONFIG_FILE};
use crate::controls::Controls;
use crate::domain::CAMPUS_ROUTE;
use crate::flight::{FlightSequencer, SequencerCommand, Status};
use crate::map_control::MapEvent;
use crate::map_session::MapSession;
use crate::status_listener::status_listener;
use crate::token::{FileTokenStore, LinePrompt, TokenStore};
use std::path::Path;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::{mpsc, watch};
use tokio::task;
use tracing::info;

mod app_config;
mod controls;
mod domain;
mod extensions;
mod flight;
mod geo_location_deserializer;
mod map_control;
mod map_session;
mod position;
mod setup;
mod status_listener;
mod token;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    if std::env::args().nth(1).as_deref() == Some("setup") {
        setup::generate(Path::new(".env"), Path::new(GENERATED_CONFIG_FILE)).await?;
        return Ok(());
    }

    let config = Arc::new(AppConfig::load()?);
    info!("✅  Loaded configuration");

    let (status_tx, status_rx) = watch::channel(Status::WaitingForToken);
    let controls_status_rx = status_tx.subscribe();
    task::spawn(async move {
        status_listener(status_rx).await;
    });

    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.token().store_path()));
    let mut prompt = LinePrompt::new(BufReader::new(tokio::io::stdin()));
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<MapEvent>();

    let map = token::load_map(&config, store.as_ref(), &mut prompt, &status_tx, events_tx.clone(), &mut events_rx).await?;
    info!("✅  Loaded map");

    let (tx, rx) = mpsc::channel::<SequencerCommand>(config.flight().command_buffer_size());
    let (token_tx, token_rx) = mpsc::channel::<String>(1);

    let session = MapSession::new(config.clone(), store.clone(), events_tx, tx.clone(), status_tx.clone());
    task::spawn(async move {
        session.listen(events_rx, token_rx).await;
    });

    let sequencer = FlightSequencer::new(&CAMPUS_ROUTE, &config, status_tx);
    let sequencer_handle = task::spawn(async move {
        sequencer.run(rx).await;
    });

    tx.send(SequencerCommand::AttachMap(map)).await?;
    info!("✅  Initialized flight sequencer");
    info!("🔥 {} is up and running", env!("CARGO_PKG_NAME"));

    Controls::new(store, tx, token_tx, controls_status_rx).listen(prompt).await;
    sequencer_handle.await?;

    Ok(())
}
