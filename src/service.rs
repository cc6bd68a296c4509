//! Detection orchestration across two backend slots.
//!
//! The guaranteed backend must load at startup and is the fallback of last
//! resort; the preferred backend is best-effort. Each request runs the
//! full chunk, classify, aggregate pipeline on exactly one backend at a
//! time, retrying once on the guaranteed backend when the preferred
//! pipeline fails anywhere.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::aggregate::aggregate;
use crate::backends::Backend;
use crate::chunker::TextChunker;
use crate::error::DetectError;
use crate::types::Detection;

/// Orchestrates chunking, per-chunk inference and aggregation over a
/// guaranteed and an optional preferred backend.
pub struct DetectionService {
    chunker: TextChunker,
    guaranteed: Arc<dyn Backend>,
    preferred: Option<Arc<dyn Backend>>,
    /// Whether the preferred backend loaded and should be tried first
    preferred_usable: AtomicBool,
}

impl DetectionService {
    /// Create a service over the given backend slots.
    pub fn new(
        chunker: TextChunker,
        guaranteed: Arc<dyn Backend>,
        preferred: Option<Arc<dyn Backend>>,
    ) -> Self {
        Self {
            chunker,
            guaranteed,
            preferred,
            preferred_usable: AtomicBool::new(false),
        }
    }

    /// Name of the backend filling the guaranteed slot.
    pub fn guaranteed_name(&self) -> &'static str {
        self.guaranteed.name()
    }

    /// Name of the backend filling the preferred slot, if one is configured.
    pub fn preferred_name(&self) -> Option<&'static str> {
        self.preferred.as_ref().map(|b| b.name())
    }

    /// Whether the preferred backend loaded and is being tried first.
    pub fn preferred_usable(&self) -> bool {
        self.preferred_usable.load(Ordering::SeqCst)
    }

    /// Load both backends.
    ///
    /// A guaranteed backend that cannot load is fatal and the error
    /// propagates. The preferred backend is best-effort: its load failure
    /// is logged and the service runs on the guaranteed backend alone.
    pub async fn load(&self) -> Result<(), DetectError> {
        self.guaranteed.load().await?;
        info!(backend = self.guaranteed.name(), "Guaranteed backend loaded");

        if let Some(preferred) = &self.preferred {
            match preferred.load().await {
                Ok(()) => {
                    self.preferred_usable.store(true, Ordering::SeqCst);
                    info!(backend = preferred.name(), "Preferred backend loaded");
                }
                Err(e) => {
                    warn!(
                        backend = preferred.name(),
                        error = %e,
                        "Preferred backend failed to load, continuing without it"
                    );
                }
            }
        }

        Ok(())
    }

    /// Classify a document.
    ///
    /// Runs the pipeline on the preferred backend first when it is usable,
    /// falling back to the guaranteed backend on any failure. Only the
    /// guaranteed backend's error ever reaches the caller.
    pub async fn detect(&self, text: &str) -> Result<Detection, DetectError> {
        if let Some(preferred) = &self.preferred {
            if self.preferred_usable.load(Ordering::SeqCst) {
                match self.run_pipeline(preferred.as_ref(), text).await {
                    Ok(result) => return Ok(result),
                    Err(e) => {
                        warn!(
                            backend = preferred.name(),
                            fallback = self.guaranteed.name(),
                            error = %e,
                            "Preferred pipeline failed, falling back"
                        );
                    }
                }
            }
        }

        self.run_pipeline(self.guaranteed.as_ref(), text).await
    }

    /// Classify a document on the named backend only, with no fallback.
    pub async fn detect_with(
        &self,
        backend_name: &str,
        text: &str,
    ) -> Result<Detection, DetectError> {
        let backend = self.slot(backend_name).ok_or_else(|| {
            DetectError::UnknownBackend {
                name: backend_name.to_string(),
            }
        })?;

        self.run_pipeline(backend, text).await
    }

    /// Find the backend filling the named slot.
    fn slot(&self, name: &str) -> Option<&dyn Backend> {
        if self.guaranteed.name() == name {
            return Some(self.guaranteed.as_ref());
        }
        match &self.preferred {
            Some(p) if p.name() == name => Some(p.as_ref()),
            _ => None,
        }
    }

    /// Run the full pipeline on one backend: split the document, classify
    /// every chunk in order, aggregate the chunk results.
    async fn run_pipeline(
        &self,
        backend: &dyn Backend,
        text: &str,
    ) -> Result<Detection, DetectError> {
        let chunks = self.chunker.split(text);
        info!(
            backend = backend.name(),
            total_chunks = chunks.len(),
            "Document chunked"
        );

        let mut results = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            results.push(backend.detect_chunk(chunk).await?);
        }

        aggregate(&results, &chunks)
    }
}
