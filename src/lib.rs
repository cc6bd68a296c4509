//! Detector Service Library
//!
//! A production-ready AI-text detection service. Documents are split into
//! model-sized chunks at paragraph and sentence boundaries, classified one
//! chunk at a time by an inference backend, and the per-chunk verdicts are
//! merged into a single document-level result. Two backends fill a
//! guaranteed and a preferred slot with try-preferred-then-fallback
//! orchestration between them.

pub mod aggregate;
pub mod api;
pub mod backends;
pub mod chunker;
pub mod error;
pub mod service;
pub mod types;

pub use aggregate::aggregate;
pub use backends::{Backend, GigacheckBackend, RubertBackend};
pub use chunker::{split_text, TextChunker};
pub use error::DetectError;
pub use service::DetectionService;
pub use types::{AiSpan, Detection, DetectorConfig, Label};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::aggregate::aggregate;
    pub use crate::backends::{Backend, GigacheckBackend, RubertBackend};
    pub use crate::chunker::{split_text, TextChunker};
    pub use crate::error::DetectError;
    pub use crate::service::DetectionService;
    pub use crate::types::*;
}

/// Default lower bound on words per chunk; the chunker flushes its buffer once reached
pub const DEFAULT_MIN_CHUNK_WORDS: usize = 200;

/// Default upper bound on words per chunk
pub const DEFAULT_MAX_CHUNK_WORDS: usize = 500;

/// Separator between paragraphs within a chunk and, implicitly, between
/// consecutive chunks when a document is reassembled. The aggregator's span
/// offset arithmetic advances by chunk length plus the length of this
/// separator, so chunker and aggregator must use the same constant.
pub const CHUNK_SEPARATOR: &str = "\n\n";
