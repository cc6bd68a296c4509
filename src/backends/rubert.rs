//! RuBERT binary classifier backend.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Backend;
use crate::error::DetectError;
use crate::types::{Detection, Label};

/// Name reported in logs, configuration and `model_used`
const BACKEND_NAME: &str = "rubert";

/// Client for a RuBERT sequence-classification server.
///
/// The server is a plain binary classifier: it reports a label and, when
/// running with probability output enabled, a per-class probability map.
/// It has no notion of spans, so results always carry an empty span list.
pub struct RubertBackend {
    client: Client,
    base_url: String,
}

/// Request payload for the predict endpoint.
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

/// Native response shape of the RuBERT server.
#[derive(Debug, Deserialize)]
struct RubertPrediction {
    label: String,
    #[serde(default)]
    probabilities: Option<HashMap<String, f64>>,
}

impl RubertBackend {
    /// Create a backend client for the given server base URL.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Backend for RubertBackend {
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
        let url = format!("{}/predict", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&PredictRequest { text })
            .send()
            .await
            .map_err(|e| DetectError::inference(BACKEND_NAME, e.to_string()))?;

        if !response.status().is_success() {
            return Err(DetectError::inference(
                BACKEND_NAME,
                format!("predict returned {}", response.status()),
            ));
        }

        let prediction: RubertPrediction = response
            .json()
            .await
            .map_err(|e| DetectError::inference(BACKEND_NAME, e.to_string()))?;

        normalize(prediction)
    }
}

/// Normalize the server's native shape into the uniform result.
///
/// A server running without probability output still yields a usable
/// result: the reported label gets a synthesized 1.0/0.0 probability pair
/// and full certainty.
fn normalize(prediction: RubertPrediction) -> Result<Detection, DetectError> {
    let label = Label::parse(&prediction.label).ok_or_else(|| {
        DetectError::inference(
            BACKEND_NAME,
            format!("unrecognized label {:?}", prediction.label),
        )
    })?;

    let (ai_probability, certainty) = match &prediction.probabilities {
        Some(probs) => {
            let ai = probs.get("AI").copied().unwrap_or(0.0);
            let human = probs.get("HUMAN").copied().unwrap_or(0.0);
            (ai, if label.is_ai() { ai } else { human })
        }
        None => (if label.is_ai() { 1.0 } else { 0.0 }, 1.0),
    };

    Ok(Detection::new(
        label,
        ai_probability,
        certainty,
        vec![],
        BACKEND_NAME,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(label: &str, probs: Option<Vec<(&str, f64)>>) -> RubertPrediction {
        RubertPrediction {
            label: label.to_string(),
            probabilities: probs.map(|pairs| {
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect()
            }),
        }
    }

    #[test]
    fn test_normalize_ai_with_probabilities() {
        let result =
            normalize(prediction("AI", Some(vec![("AI", 0.88), ("HUMAN", 0.12)]))).unwrap();

        assert_eq!(result.label, Label::Ai);
        assert_eq!(result.ai_probability, 0.88);
        assert_eq!(result.certainty, 0.88);
        assert!(result.ai_spans.is_empty());
        assert_eq!(result.model_used, "rubert");
    }

    #[test]
    fn test_normalize_human_certainty_is_human_probability() {
        let result =
            normalize(prediction("HUMAN", Some(vec![("AI", 0.2), ("HUMAN", 0.8)]))).unwrap();

        assert_eq!(result.label, Label::Human);
        assert_eq!(result.ai_probability, 0.2);
        assert_eq!(result.certainty, 0.8);
    }

    #[test]
    fn test_normalize_synthesizes_without_probabilities() {
        let ai = normalize(prediction("AI", None)).unwrap();
        assert_eq!(ai.ai_probability, 1.0);
        assert_eq!(ai.certainty, 1.0);

        let human = normalize(prediction("HUMAN", None)).unwrap();
        assert_eq!(human.ai_probability, 0.0);
        assert_eq!(human.certainty, 1.0);
    }

    #[test]
    fn test_normalize_rejects_unknown_label() {
        let err = normalize(prediction("ROBOT", None)).unwrap_err();
        assert!(matches!(err, DetectError::BackendInference { .. }));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = RubertBackend::new("http://localhost:8001/", Duration::from_secs(5));
        assert_eq!(backend.base_url, "http://localhost:8001");
        assert_eq!(backend.name(), "rubert");
    }
}
