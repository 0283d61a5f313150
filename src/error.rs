use thiserror::Error;

/// Classified ingestion failures. Decode failures drop the message without
/// touching the registry; the dispatcher counts them.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("report payload has no usable machine_id")]
    MissingMachineId,

    #[error("unrecognized status value {0:?}")]
    InvalidStatus(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl IngestError {
    /// True for failures of the message itself, as opposed to a failure
    /// applying an already-decoded mutation.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            IngestError::Payload(_) | IngestError::MissingMachineId | IngestError::InvalidStatus(_)
        )
    }
}
