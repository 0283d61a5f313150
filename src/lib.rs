pub mod config;
pub mod error;
pub mod ingest;
pub mod monitor;
pub mod reader;
pub mod registry;
pub mod transport;
pub mod types;

pub use config::Config;
pub use error::IngestError;
pub use ingest::IngestDispatcher;
pub use monitor::LivenessMonitor;
pub use reader::SnapshotReader;
pub use registry::{InMemoryRegistry, StatusStore};
pub use transport::{ChannelSource, MessageSource, TransportMessage};
pub use types::*;
