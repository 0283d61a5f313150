pub mod dispatcher;

pub use dispatcher::IngestDispatcher;

use tokio::sync::watch;

use crate::registry::StatusStore;
use crate::transport::MessageSource;

/// Delivery loop: pull messages from the transport handle and feed the
/// dispatcher until the source ends or the stop signal flips. A message
/// already pulled is always dispatched before the loop exits; decode
/// failures are logged and ingestion continues.
pub async fn run_ingest<S, M>(
    dispatcher: &IngestDispatcher<S>,
    mut source: M,
    mut stop_rx: watch::Receiver<bool>,
) where
    S: StatusStore,
    M: MessageSource,
{
    loop {
        tokio::select! {
            msg = source.recv() => {
                match msg {
                    Some(msg) => {
                        if let Err(err) = dispatcher.dispatch(&msg) {
                            log::warn!("dropped message on topic {}: {}", msg.topic, err);
                        }
                    }
                    None => break,
                }
            }
            _ = stop_rx.changed() => {
                if *stop_rx.borrow() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{InMemoryRegistry, StatusStore};
    use crate::transport::{ChannelSource, TransportMessage};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_loop_drains_source_then_ends() {
        let store = Arc::new(InMemoryRegistry::new());
        let dispatcher = IngestDispatcher::new(store.clone(), "machine_status");
        let (tx, source) = ChannelSource::pair(8);
        let (_stop_tx, stop_rx) = watch::channel(false);

        tx.send(TransportMessage::new(
            "machine_status/m-1",
            r#"{"machine_id":"m-1"}"#.as_bytes().to_vec(),
        ))
        .await
        .unwrap();
        tx.send(TransportMessage::new(
            "machine_status/m-1",
            "{broken".as_bytes().to_vec(),
        ))
        .await
        .unwrap();
        drop(tx);

        run_ingest(&dispatcher, source, stop_rx).await;

        assert_eq!(store.get_all().unwrap().len(), 1);
        assert_eq!(dispatcher.decode_error_count(), 1);
    }

    #[tokio::test]
    async fn test_loop_stops_on_signal() {
        let store = Arc::new(InMemoryRegistry::new());
        let dispatcher = Arc::new(IngestDispatcher::new(store, "machine_status"));
        let (_tx, source) = ChannelSource::pair(1);
        let (stop_tx, stop_rx) = watch::channel(false);

        let loop_dispatcher = dispatcher.clone();
        let task = tokio::spawn(async move {
            run_ingest(&loop_dispatcher, source, stop_rx).await;
        });

        stop_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("ingest loop did not stop")
            .unwrap();
    }
}
