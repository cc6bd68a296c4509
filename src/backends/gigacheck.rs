//! GigaCheck interval-detection backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::Backend;
use crate::error::DetectError;
use crate::types::{AiSpan, Detection, Label};

/// Name reported in logs, configuration and `model_used`
const BACKEND_NAME: &str = "gigacheck";

/// Index of the AI class in the server's probability vector
const AI_CLASS: usize = 0;
/// Index of the human class in the server's probability vector
const HUMAN_CLASS: usize = 1;

/// Client for a GigaCheck detection server.
///
/// Richer than the plain classifier: alongside the label it returns a
/// two-class probability vector (index 0 is the AI class) and a list of
/// character intervals it attributes to AI generation. The decision
/// threshold is forwarded with every request.
pub struct GigacheckBackend {
    client: Client,
    base_url: String,
    threshold: f64,
}

/// Request payload for the predict endpoint.
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
    threshold: f64,
}

/// Native response shape of the GigaCheck server.
#[derive(Debug, Deserialize)]
struct GigacheckPrediction {
    label: String,
    #[serde(default)]
    class_probs: Option<Vec<f64>>,
    #[serde(default)]
    intervals: Vec<GigacheckInterval>,
}

/// One AI-attributed character interval as the server reports it.
#[derive(Debug, Deserialize)]
struct GigacheckInterval {
    start: usize,
    end: usize,
    score: f64,
}

impl GigacheckBackend {
    /// Create a backend client for the given server base URL and decision
    /// threshold.
    pub fn new(base_url: &str, threshold: f64, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            threshold,
        }
    }
}

#[async_trait]
impl Backend for GigacheckBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn load(&self) -> Result<(), DetectError> {
        let url = format!("{}/health", self.base_url);
        debug!(backend = BACKEND_NAME, url = %url, "Probing model server");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DetectError::load(BACKEND_NAME, e.to_string()))?;

        if !response.status().is_success() {
            return Err(DetectError::load(
                BACKEND_NAME,
                format!("health check returned {}", response.status()),
            ));
        }

        info!(backend = BACKEND_NAME, "Model server ready");
        Ok(())
    }

    async fn detect_chunk(&self, text: &str) -> Result<Detection, DetectError> {
        // The interval model chokes on hard line breaks. Replacing each
        // newline with one space preserves every character offset the
        // server reports, so spans stay valid for the original chunk.
        let flattened = text.replace('\n', " ");

        let url = format!("{}/predict", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&PredictRequest {
                text: &flattened,
                threshold: self.threshold,
            })
            .send()
            .await
            .map_err(|e| DetectError::inference(BACKEND_NAME, e.to_string()))?;

        if !response.status().is_success() {
            return Err(DetectError::inference(
                BACKEND_NAME,
                format!("predict returned {}", response.status()),
            ));
        }

        let prediction: GigacheckPrediction = response
            .json()
            .await
            .map_err(|e| DetectError::inference(BACKEND_NAME, e.to_string()))?;

        normalize(prediction)
    }
}

/// Normalize the server's native shape into the uniform result.
///
/// Certainty is the probability of whichever class was predicted. Missing
/// probabilities get the synthesized 1.0/0.0 treatment; degenerate
/// intervals (where start is not before end) are dropped with a warning.
fn normalize(prediction: GigacheckPrediction) -> Result<Detection, DetectError> {
    let label = Label::parse(&prediction.label).ok_or_else(|| {
        DetectError::inference(
            BACKEND_NAME,
            format!("unrecognized label {:?}", prediction.label),
        )
    })?;

    let (ai_probability, certainty) = match &prediction.class_probs {
        Some(probs) if probs.len() > HUMAN_CLASS => {
            let predicted = if label.is_ai() { AI_CLASS } else { HUMAN_CLASS };
            (probs[AI_CLASS], probs[predicted])
        }
        _ => (if label.is_ai() { 1.0 } else { 0.0 }, 1.0),
    };

    let mut ai_spans = Vec::with_capacity(prediction.intervals.len());
    for interval in prediction.intervals {
        if interval.start >= interval.end {
            warn!(
                backend = BACKEND_NAME,
                start = interval.start,
                end = interval.end,
                "Dropping degenerate interval"
            );
            continue;
        }
        ai_spans.push(AiSpan::new(interval.start, interval.end, interval.score));
    }

    Ok(Detection::new(
        label,
        ai_probability,
        certainty,
        ai_spans,
        BACKEND_NAME,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(
        label: &str,
        class_probs: Option<Vec<f64>>,
        intervals: Vec<(usize, usize, f64)>,
    ) -> GigacheckPrediction {
        GigacheckPrediction {
            label: label.to_string(),
            class_probs,
            intervals: intervals
                .into_iter()
                .map(|(start, end, score)| GigacheckInterval { start, end, score })
                .collect(),
        }
    }

    #[test]
    fn test_normalize_ai_with_probs_and_intervals() {
        let result = normalize(prediction(
            "ai",
            Some(vec![0.91, 0.09]),
            vec![(0, 12, 0.97)],
        ))
        .unwrap();

        assert_eq!(result.label, Label::Ai);
        assert_eq!(result.ai_probability, 0.91);
        assert_eq!(result.certainty, 0.91);
        assert_eq!(result.ai_spans, vec![AiSpan::new(0, 12, 0.97)]);
        assert_eq!(result.model_used, "gigacheck");
    }

    #[test]
    fn test_normalize_human_certainty_from_second_class() {
        let result = normalize(prediction("human", Some(vec![0.3, 0.7]), vec![])).unwrap();

        assert_eq!(result.label, Label::Human);
        assert_eq!(result.ai_probability, 0.3);
        assert_eq!(result.certainty, 0.7);
    }

    #[test]
    fn test_normalize_synthesizes_without_probs() {
        let result = normalize(prediction("ai", None, vec![])).unwrap();

        assert_eq!(result.ai_probability, 1.0);
        assert_eq!(result.certainty, 1.0);
        assert!(result.ai_spans.is_empty());
    }

    #[test]
    fn test_normalize_short_prob_vector_treated_as_missing() {
        let result = normalize(prediction("ai", Some(vec![0.9]), vec![])).unwrap();

        assert_eq!(result.ai_probability, 1.0);
        assert_eq!(result.certainty, 1.0);
    }

    #[test]
    fn test_normalize_drops_degenerate_intervals() {
        let result = normalize(prediction(
            "ai",
            Some(vec![0.9, 0.1]),
            vec![(5, 5, 0.9), (8, 4, 0.8), (1, 3, 0.7)],
        ))
        .unwrap();

        assert_eq!(result.ai_spans, vec![AiSpan::new(1, 3, 0.7)]);
    }

    #[test]
    fn test_normalize_rejects_unknown_label() {
        let err = normalize(prediction("unsure", None, vec![])).unwrap_err();
        assert!(matches!(err, DetectError::BackendInference { .. }));
    }

    #[test]
    fn test_newline_flattening_preserves_length() {
        let text = "line one\nline two\r\nline three";
        let flattened = text.replace('\n', " ");

        assert_eq!(flattened.chars().count(), text.chars().count());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = GigacheckBackend::new("http://localhost:8002/", 0.5, Duration::from_secs(5));
        assert_eq!(backend.base_url, "http://localhost:8002");
        assert_eq!(backend.threshold, 0.5);
        assert_eq!(backend.name(), "gigacheck");
    }
}
