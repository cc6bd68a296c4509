//! Merging per-chunk detection results into a document-level result.
//!
//! Probability and certainty are averaged with each chunk weighted by its
//! share of the document's words, the label comes from a strict majority
//! vote, and span offsets are remapped from chunk-local to document-global
//! positions assuming chunks sit [`CHUNK_SEPARATOR`] apart.

use crate::chunker::word_count;
use crate::error::DetectError;
use crate::types::{Detection, Label};
use crate::CHUNK_SEPARATOR;

/// Merge ordered per-chunk results into one document-level result.
///
/// `results` and `chunks` correspond positionally and must be the same
/// length. Weighted probability and certainty are rounded to 4 decimal
/// places; a strict majority of AI votes yields AI, anything else
/// (including a tie) yields HUMAN; `model_used` is taken from the first
/// chunk since one backend classifies the whole document. A single result
/// passes through unchanged.
pub fn aggregate(results: &[Detection], chunks: &[String]) -> Result<Detection, DetectError> {
    if results.is_empty() {
        return Err(DetectError::EmptyAggregation);
    }
    debug_assert_eq!(results.len(), chunks.len());

    if results.len() == 1 {
        return Ok(results[0].clone());
    }

    let word_counts: Vec<usize> = chunks.iter().map(|c| word_count(c)).collect();
    let total_words: usize = word_counts.iter().sum();

    // All-whitespace chunks would mean dividing by zero; give every chunk
    // weight 0 and let the averages come out 0.0.
    let weights: Vec<f64> = if total_words == 0 {
        vec![0.0; chunks.len()]
    } else {
        word_counts
            .iter()
            .map(|&wc| wc as f64 / total_words as f64)
            .collect()
    };

    let ai_probability: f64 = results
        .iter()
        .zip(&weights)
        .map(|(r, w)| r.ai_probability * w)
        .sum();
    let certainty: f64 = results
        .iter()
        .zip(&weights)
        .map(|(r, w)| r.certainty * w)
        .sum();

    let ai_votes = results.iter().filter(|r| r.label.is_ai()).count();
    let label = if ai_votes * 2 > results.len() {
        Label::Ai
    } else {
        Label::Human
    };

    let mut ai_spans = Vec::new();
    let mut offset = 0;
    for (result, chunk) in results.iter().zip(chunks) {
        ai_spans.extend(result.ai_spans.iter().map(|s| s.offset_by(offset)));
        offset += chunk.chars().count() + CHUNK_SEPARATOR.chars().count();
    }

    Ok(Detection {
        label,
        ai_probability: round4(ai_probability),
        certainty: round4(certainty),
        ai_spans,
        model_used: results[0].model_used.clone(),
    })
}

/// Round to 4 decimal places.
fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::AiSpan;

    fn result(label: Label, ai_probability: f64, certainty: f64) -> Detection {
        Detection::new(label, ai_probability, certainty, vec![], "rubert")
    }

    fn chunk_of(words: usize) -> String {
        vec!["word"; words].join(" ")
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let err = aggregate(&[], &[]).unwrap_err();
        assert!(matches!(err, DetectError::EmptyAggregation));
    }

    #[test]
    fn test_single_result_passes_through_unchanged() {
        let single = Detection::new(
            Label::Ai,
            0.876543,
            0.912345,
            vec![AiSpan::new(2, 9, 0.99)],
            "gigacheck",
        );
        let chunks = vec!["some text".to_string()];

        let merged = aggregate(&[single.clone()], &chunks).unwrap();

        // No rounding, no remapping, not even a fresh allocation order.
        assert_eq!(merged, single);
    }

    #[test]
    fn test_probability_and_certainty_weighted_by_words() {
        let results = vec![
            result(Label::Human, 0.2, 0.8),
            result(Label::Ai, 0.6, 0.4),
        ];
        let chunks = vec![chunk_of(100), chunk_of(300)];

        let merged = aggregate(&results, &chunks).unwrap();

        // Weights 0.25 and 0.75.
        assert_eq!(merged.ai_probability, 0.5);
        assert_eq!(merged.certainty, 0.5);
    }

    #[test]
    fn test_weighted_values_stay_within_input_range() {
        let results = vec![
            result(Label::Ai, 0.91, 0.93),
            result(Label::Ai, 0.77, 0.81),
            result(Label::Human, 0.12, 0.88),
        ];
        let chunks = vec![chunk_of(220), chunk_of(480), chunk_of(150)];

        let merged = aggregate(&results, &chunks).unwrap();

        assert!(merged.ai_probability >= 0.12 && merged.ai_probability <= 0.91);
        assert!(merged.certainty >= 0.81 && merged.certainty <= 0.93);
    }

    #[test]
    fn test_rounded_to_four_decimals() {
        let results = vec![
            result(Label::Human, 0.1, 0.1),
            result(Label::Human, 0.2, 0.2),
        ];
        let chunks = vec![chunk_of(100), chunk_of(200)];

        let merged = aggregate(&results, &chunks).unwrap();

        // 0.1 * 1/3 + 0.2 * 2/3 = 0.16666...
        assert_eq!(merged.ai_probability, 0.1667);
        assert_eq!(merged.certainty, 0.1667);
    }

    #[test]
    fn test_strict_majority_yields_ai() {
        let results = vec![
            result(Label::Ai, 0.9, 0.9),
            result(Label::Ai, 0.8, 0.8),
            result(Label::Human, 0.1, 0.9),
        ];
        let chunks = vec![chunk_of(10), chunk_of(10), chunk_of(10)];

        let merged = aggregate(&results, &chunks).unwrap();
        assert_eq!(merged.label, Label::Ai);
    }

    #[test]
    fn test_minority_yields_human() {
        let results = vec![
            result(Label::Ai, 0.9, 0.9),
            result(Label::Human, 0.1, 0.9),
            result(Label::Human, 0.2, 0.8),
        ];
        let chunks = vec![chunk_of(10), chunk_of(10), chunk_of(10)];

        let merged = aggregate(&results, &chunks).unwrap();
        assert_eq!(merged.label, Label::Human);
    }

    #[test]
    fn test_tie_yields_human() {
        let results = vec![
            result(Label::Ai, 0.9, 0.9),
            result(Label::Human, 0.1, 0.9),
        ];
        let chunks = vec![chunk_of(10), chunk_of(10)];

        let merged = aggregate(&results, &chunks).unwrap();
        assert_eq!(merged.label, Label::Human);
    }

    #[test]
    fn test_span_offsets_remapped_to_document_positions() {
        let results = vec![
            Detection::new(Label::Ai, 0.9, 0.9, vec![AiSpan::new(0, 2, 0.9)], "gigacheck"),
            Detection::new(Label::Ai, 0.8, 0.8, vec![AiSpan::new(1, 3, 0.7)], "gigacheck"),
        ];
        let chunks = vec!["AAAA".to_string(), "BBBB".to_string()];

        let merged = aggregate(&results, &chunks).unwrap();

        // Second chunk starts at 4 + 2 separator characters.
        assert_eq!(
            merged.ai_spans,
            vec![AiSpan::new(0, 2, 0.9), AiSpan::new(7, 9, 0.7)]
        );
    }

    #[test]
    fn test_spans_keep_chunk_order() {
        let results = vec![
            Detection::new(
                Label::Ai,
                0.9,
                0.9,
                vec![AiSpan::new(0, 1, 0.5), AiSpan::new(2, 3, 0.6)],
                "gigacheck",
            ),
            Detection::new(Label::Ai, 0.8, 0.8, vec![AiSpan::new(0, 1, 0.7)], "gigacheck"),
        ];
        let chunks = vec!["abcd".to_string(), "efgh".to_string()];

        let merged = aggregate(&results, &chunks).unwrap();

        assert_eq!(
            merged.ai_spans,
            vec![
                AiSpan::new(0, 1, 0.5),
                AiSpan::new(2, 3, 0.6),
                AiSpan::new(6, 7, 0.7),
            ]
        );
    }

    #[test]
    fn test_offsets_count_characters_not_bytes() {
        // Cyrillic text: 6 characters, 12 bytes.
        let first = "привет".to_string();
        let results = vec![
            Detection::new(Label::Ai, 0.9, 0.9, vec![], "gigacheck"),
            Detection::new(Label::Ai, 0.8, 0.8, vec![AiSpan::new(0, 4, 0.9)], "gigacheck"),
        ];
        let chunks = vec![first, "next one".to_string()];

        let merged = aggregate(&results, &chunks).unwrap();

        assert_eq!(merged.ai_spans, vec![AiSpan::new(8, 12, 0.9)]);
    }

    #[test]
    fn test_zero_total_words_does_not_divide_by_zero() {
        let results = vec![
            result(Label::Human, 0.4, 0.9),
            result(Label::Human, 0.3, 0.8),
        ];
        let chunks = vec!["\n".to_string(), "\t ".to_string()];

        let merged = aggregate(&results, &chunks).unwrap();

        assert_eq!(merged.ai_probability, 0.0);
        assert_eq!(merged.certainty, 0.0);
        assert_eq!(merged.label, Label::Human);
    }

    #[test]
    fn test_model_used_comes_from_first_result() {
        let results = vec![
            Detection::new(Label::Human, 0.1, 0.9, vec![], "gigacheck"),
            Detection::new(Label::Human, 0.2, 0.8, vec![], "gigacheck"),
        ];
        let chunks = vec![chunk_of(10), chunk_of(10)];

        let merged = aggregate(&results, &chunks).unwrap();
        assert_eq!(merged.model_used, "gigacheck");
    }
}
