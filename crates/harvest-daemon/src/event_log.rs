// crates/harvest-daemon/src/event_log.rs
//
// Subscriber that writes every committed event to the log.

use tokio::sync::broadcast::{self, error::RecvError};

use harvest_core::events::EventRecord;

/// Log committed events until the channel closes.
pub async fn run_event_logger(mut rx: broadcast::Receiver<EventRecord>) {
    loop {
        match rx.recv().await {
            Ok(record) => {
                tracing::info!(
                    height = record.height,
                    index = record.index,
                    tx_id = %record.tx_id,
                    event = record.event.name(),
                    "Committed event"
                );
                tracing::debug!("{:?}", record.event);
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Event logger lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
