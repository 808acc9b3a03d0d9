use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history record under `{key}` is unreadable")]
    Deserialization {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("history record under `{key}` has unexpected type")]
    UnexpectedValue { key: &'static str },
    #[error("failed to encode history")]
    Serialization(#[source] serde_json::Error),
    #[error("durable storage failed for `{key}`")]
    Storage {
        key: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
