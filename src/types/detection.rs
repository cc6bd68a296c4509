//! Detection result types shared by backends, aggregation and the API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Verdict on the origin of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "HUMAN")]
    Human,
    #[serde(rename = "AI")]
    Ai,
}

impl Label {
    /// Parse a model-reported label, tolerating case differences between
    /// backends.
    pub fn parse(raw: &str) -> Option<Label> {
        match raw.to_ascii_uppercase().as_str() {
            "HUMAN" => Some(Label::Human),
            "AI" => Some(Label::Ai),
            _ => None,
        }
    }

    /// Whether this label is the AI verdict.
    pub fn is_ai(&self) -> bool {
        matches!(self, Label::Ai)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Human => write!(f, "HUMAN"),
            Label::Ai => write!(f, "AI"),
        }
    }
}

/// A character interval attributed to AI generation.
///
/// Offsets count characters, not bytes. They are chunk-local when produced
/// by a backend and document-global after aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiSpan {
    /// Start offset, inclusive
    pub start: usize,
    /// End offset, exclusive
    pub end: usize,
    /// Per-span AI score in [0, 1]
    pub score: f64,
}

impl AiSpan {
    /// Create a new span.
    pub fn new(start: usize, end: usize, score: f64) -> Self {
        Self { start, end, score }
    }

    /// Shift both offsets forward, mapping chunk-local positions to
    /// document-global ones.
    pub fn offset_by(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            ..self
        }
    }
}

/// Uniform detection result for a single chunk or a whole document.
///
/// Probability, certainty and span scores are fractions in [0, 1] no matter
/// which backend produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Predicted origin of the text
    pub label: Label,
    /// Probability that the text is AI-generated
    pub ai_probability: f64,
    /// Confidence in the predicted label
    pub certainty: f64,
    /// Character intervals attributed to AI; empty for backends without
    /// span output
    pub ai_spans: Vec<AiSpan>,
    /// Name of the backend that produced this result
    pub model_used: String,
}

impl Detection {
    /// Create a new detection result.
    pub fn new(
        label: Label,
        ai_probability: f64,
        certainty: f64,
        ai_spans: Vec<AiSpan>,
        model_used: impl Into<String>,
    ) -> Self {
        Self {
            label,
            ai_probability,
            certainty,
            ai_spans,
            model_used: model_used.into(),
        }
    }
}
