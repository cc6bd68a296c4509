//! Inference backends for AI-text classification.
//!
//! Two model servers sit behind one capability contract: load once at
//! startup, then classify one chunk at a time. Each backend normalizes its
//! server's native response shape into the uniform [`Detection`] result,
//! so nothing downstream branches on backend identity.

mod gigacheck;
mod rubert;

pub use gigacheck::GigacheckBackend;
pub use rubert::RubertBackend;

use async_trait::async_trait;

use crate::error::DetectError;
use crate::types::Detection;

/// Contract every inference backend implements.
///
/// Any implementation can fill the guaranteed or the preferred
/// orchestration slot interchangeably.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Stable name of this backend, used in logs, configuration and
    /// `model_used`.
    fn name(&self) -> &'static str;

    /// Verify the model server is reachable and its model is resident.
    ///
    /// Must be called before the first [`Backend::detect_chunk`].
    /// Idempotent, so callers may probe again after a failure.
    async fn load(&self) -> Result<(), DetectError>;

    /// Classify a single chunk.
    ///
    /// Span offsets in the result are character positions local to the
    /// chunk; the aggregator remaps them to document positions.
    async fn detect_chunk(&self, text: &str) -> Result<Detection, DetectError>;
}
