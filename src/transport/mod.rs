use async_trait::async_trait;
use tokio::sync::mpsc;

/// One inbound pub/sub message: topic string plus raw payload bytes.
/// Broker concerns (delivery, reconnection, QoS) stay with the transport
/// collaborator that produces these.
#[derive(Debug, Clone)]
pub struct TransportMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl TransportMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// A connected transport handle. `None` means the transport has ended and
/// ingestion should stop.
#[async_trait]
pub trait MessageSource: Send {
    async fn recv(&mut self) -> Option<TransportMessage>;
}

/// In-process source backed by a tokio channel. Used by tests and by
/// embedders that bridge their own broker client into the engine.
pub struct ChannelSource {
    rx: mpsc::Receiver<TransportMessage>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<TransportMessage>) -> Self {
        Self { rx }
    }

    pub fn pair(capacity: usize) -> (mpsc::Sender<TransportMessage>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }
}

#[async_trait]
impl MessageSource for ChannelSource {
    async fn recv(&mut self) -> Option<TransportMessage> {
        self.rx.recv().await
    }
}
