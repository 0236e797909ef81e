use crate::flight::Status;
use tokio::sync::watch::Receiver;
use tracing::{info, instrument};

#[instrument(skip_all)]
pub async fn status_listener(mut rx: Receiver<Status>) {
    while rx.changed().await.is_ok() {
        let status = rx.borrow_and_update().clone();
        info!("📣 {}", status);
    }
}
