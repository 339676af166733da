// Error taxonomy shared by the collector and the dashboard client

use std::time::Duration;
use thiserror::Error;

use crate::models::Section;

/// A metric source failed. The sampler still publishes a tick, with placeholders.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("collection timed out after {0:?}")]
    Timeout(Duration),
    #[error("{source_name} unavailable: {message}")]
    Unavailable {
        source_name: &'static str,
        message: String,
    },
    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),
    #[error("collector task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CollectionError {
    pub fn unavailable(source_name: &'static str, message: impl Into<String>) -> Self {
        CollectionError::Unavailable {
            source_name,
            message: message.into(),
        }
    }
}

/// A widget could not be rendered from the snapshot it was given.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("section {0:?} failed to collect on the server")]
    Degraded(Section),
    #[error("missing field `{0}`")]
    Missing(&'static str),
    #[error("malformed field `{field}`: {source}")]
    Malformed {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
