//! Error types for the detection pipeline.

use thiserror::Error;

/// Errors produced by the detection pipeline.
#[derive(Error, Debug)]
pub enum DetectError {
    /// The aggregator was called with zero chunk results. The chunker
    /// always produces at least one chunk, so this signals a caller bug.
    #[error("no chunk results to aggregate")]
    EmptyAggregation,

    /// A backend failed to bring its model up.
    #[error("backend '{backend}' failed to load: {message}")]
    BackendLoad {
        backend: &'static str,
        message: String,
    },

    /// A backend failed while classifying a single chunk.
    #[error("backend '{backend}' inference failed: {message}")]
    BackendInference {
        backend: &'static str,
        message: String,
    },

    /// A request named a backend that fills neither slot.
    #[error("unknown backend: '{name}'")]
    UnknownBackend { name: String },
}

impl DetectError {
    /// Build a load error for the named backend.
    pub fn load(backend: &'static str, message: impl Into<String>) -> Self {
        Self::BackendLoad {
            backend,
            message: message.into(),
        }
    }

    /// Build an inference error for the named backend.
    pub fn inference(backend: &'static str, message: impl Into<String>) -> Self {
        Self::BackendInference {
            backend,
            message: message.into(),
        }
    }
}
