//! Error types shared by the pipeline and its collaborators

use thiserror::Error;

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by pipeline stages and collaborator contracts.
///
/// Stage errors carry full detail for the logger; only the status code
/// and the caller-authored message already placed on the response ever
/// reach the wire.
#[derive(Debug, Error)]
pub enum Error {
    /// Request body could not be read or parsed into the resource type
    #[error("decode failed: {0}")]
    Decode(String),

    /// Input rejected by the resource validator
    #[error("validation failed: {0}")]
    Validation(String),

    /// Storage backend reported a failed operation
    #[error("storage operation failed: {0}")]
    Storage(String),

    /// Event broker rejected a publish
    #[error("broker publish failed: {0}")]
    Broker(String),

    /// Response body could not be serialized to the wire format
    #[error("encode failed: {0}")]
    Encode(String),

    /// Metrics sink rejected a recording
    #[error("metrics sink failed: {0}")]
    Metrics(String),

    /// An action token outside the supported set
    #[error(
        "unknown action `{0}`, expected one of insertOne, insertMany, update, \
         upsert, findOne, findMany or remove"
    )]
    UnknownAction(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(Box<figment::Error>),

    /// NATS error
    #[cfg(feature = "events")]
    #[error("NATS error: {0}")]
    Nats(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_action_names_the_supported_set() {
        let err = Error::UnknownAction("createOne".to_string());
        let message = err.to_string();
        assert!(message.contains("createOne"));
        assert!(message.contains("insertOne"));
        assert!(message.contains("remove"));
    }

    #[test]
    fn stage_errors_keep_their_detail() {
        let err = Error::Storage("connection reset".to_string());
        assert_eq!(err.to_string(), "storage operation failed: connection reset");
    }
}
