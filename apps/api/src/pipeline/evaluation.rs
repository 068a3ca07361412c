//! Evaluation parsing: best-effort conversion of the scoring stage's text into a record.
//!
//! The model is asked for JSON but nothing constrains it, so the answer may be
//! single-quoted pseudo-JSON or plain prose. Attempts, in order:
//! 1. decode the trimmed (fence-stripped) text as a JSON object
//! 2. replace every `'` with `"` and decode again
//! 3. keep the raw text
//!
//! Parsing never fails. Callers match on `Evaluation`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::llm_client::strip_json_fences;

/// Structured scoring record. Every field is optional; a missing field never fails the decode.
///
/// `overall_score` is not checked against `breakdown`; the model's numbers are reported as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredEvaluation {
    #[serde(
        default,
        deserialize_with = "lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub overall_score: Option<u32>,
    /// Criterion name → rating (nominally 1–5, kept as whatever the model sent).
    #[serde(default, deserialize_with = "lenient_breakdown")]
    pub breakdown: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub missing_keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub quick_wins: Vec<String>,
    /// Any other fields the model returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tagged result of `parse_evaluation`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Evaluation {
    Structured(StructuredEvaluation),
    /// The evaluation text, unchanged, when no structured reading succeeded.
    Raw { raw: String },
}

impl Evaluation {
    pub fn overall_score(&self) -> Option<u32> {
        match self {
            Evaluation::Structured(structured) => structured.overall_score,
            Evaluation::Raw { .. } => None,
        }
    }
}

/// Parses the evaluation stage's output. Never fails.
pub fn parse_evaluation(text: &str) -> Evaluation {
    let candidate = strip_json_fences(text);

    match serde_json::from_str::<StructuredEvaluation>(candidate) {
        Ok(structured) => return Evaluation::Structured(structured),
        Err(e) => debug!("Evaluation is not direct JSON ({e}); retrying with quote normalization"),
    }

    let normalized = candidate.replace('\'', "\"");
    match serde_json::from_str::<StructuredEvaluation>(&normalized) {
        Ok(structured) => Evaluation::Structured(structured),
        Err(e) => {
            debug!("Evaluation kept as raw text: {e}");
            Evaluation::Raw {
                raw: text.to_string(),
            }
        }
    }
}

/// Accepts `72`, `72.4`, `"72"` or `"72/100"`. Anything else reads as absent.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(score_from_value))
}

fn score_from_value(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches("/100").trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (number.is_finite() && number >= 0.0 && number <= u32::MAX as f64)
        .then(|| number.round() as u32)
}

fn lenient_breakdown<'de, D>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    })
}

/// Accepts an array (non-string items are stringified), a single string, or null.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOUBLE_QUOTED: &str = r#"{"overall_score": 72, "breakdown": {"keywords": 4, "structure": 3, "metrics": 2, "verbs": 4, "format": 5}, "missing_keywords": ["Python", "SQL"], "quick_wins": ["Add metrics"]}"#;

    #[test]
    fn test_parses_double_quoted_json() {
        let evaluation = parse_evaluation(DOUBLE_QUOTED);
        let Evaluation::Structured(structured) = evaluation else {
            panic!("expected structured evaluation");
        };
        assert_eq!(structured.overall_score, Some(72));
        assert_eq!(structured.breakdown.len(), 5);
        assert_eq!(structured.breakdown["format"], json!(5));
        assert_eq!(structured.missing_keywords, vec!["Python", "SQL"]);
        assert_eq!(structured.quick_wins, vec!["Add metrics"]);
    }

    #[test]
    fn test_single_quoted_matches_double_quoted() {
        let single_quoted = DOUBLE_QUOTED.replace('"', "'");
        assert_eq!(
            parse_evaluation(&single_quoted),
            parse_evaluation(DOUBLE_QUOTED)
        );
    }

    #[test]
    fn test_single_quoted_scenario() {
        let text = "{'overall_score': 72, 'missing_keywords': ['Python','SQL'], 'quick_wins': ['Add metrics']}";
        let evaluation = parse_evaluation(text);
        assert_eq!(evaluation.overall_score(), Some(72));
        let Evaluation::Structured(structured) = evaluation else {
            panic!("expected structured evaluation");
        };
        assert_eq!(structured.missing_keywords, vec!["Python", "SQL"]);
        assert_eq!(structured.quick_wins, vec!["Add metrics"]);
        assert!(structured.breakdown.is_empty());
    }

    #[test]
    fn test_prose_falls_back_to_raw_unchanged() {
        let text = "The resume looks solid overall, I'd give it a 7/10.";
        assert_eq!(
            parse_evaluation(text),
            Evaluation::Raw {
                raw: text.to_string()
            }
        );
    }

    #[test]
    fn test_apostrophe_inside_json_falls_back_to_raw() {
        // Valid neither as-is nor after quote replacement.
        let text = "{'quick_wins': ['Don't use tables']";
        assert!(matches!(parse_evaluation(text), Evaluation::Raw { .. }));
    }

    #[test]
    fn test_non_object_json_falls_back_to_raw() {
        assert!(matches!(parse_evaluation("[1, 2, 3]"), Evaluation::Raw { .. }));
        assert!(matches!(parse_evaluation("\"just text\""), Evaluation::Raw { .. }));
        assert!(matches!(parse_evaluation(""), Evaluation::Raw { .. }));
    }

    #[test]
    fn test_code_fenced_json_is_structured() {
        let text = format!("```json\n{DOUBLE_QUOTED}\n```");
        assert_eq!(parse_evaluation(&text).overall_score(), Some(72));
    }

    #[test]
    fn test_missing_fields_default() {
        let Evaluation::Structured(structured) = parse_evaluation("{}") else {
            panic!("expected structured evaluation");
        };
        assert_eq!(structured, StructuredEvaluation::default());
    }

    #[test]
    fn test_lenient_field_shapes() {
        let text = r#"{"overall_score": "81/100", "breakdown": null, "missing_keywords": "Kubernetes", "quick_wins": [1, "Add a summary"], "notes": "good"}"#;
        let Evaluation::Structured(structured) = parse_evaluation(text) else {
            panic!("expected structured evaluation");
        };
        assert_eq!(structured.overall_score, Some(81));
        assert!(structured.breakdown.is_empty());
        assert_eq!(structured.missing_keywords, vec!["Kubernetes"]);
        assert_eq!(structured.quick_wins, vec!["1", "Add a summary"]);
        assert_eq!(structured.extra["notes"], json!("good"));
    }

    #[test]
    fn test_float_score_is_rounded_and_inconsistency_kept() {
        // Breakdown of all 1s with a high overall score is reported, not corrected.
        let text = r#"{"overall_score": 94.6, "breakdown": {"keywords": 1, "structure": 1}}"#;
        assert_eq!(parse_evaluation(text).overall_score(), Some(95));
    }

    #[test]
    fn test_raw_serializes_under_raw_key() {
        let value = serde_json::to_value(Evaluation::Raw {
            raw: "no json".to_string(),
        })
        .unwrap();
        assert_eq!(value, json!({"raw": "no json"}));
    }

    #[test]
    fn test_structured_serializes_flat() {
        let value = serde_json::to_value(parse_evaluation(DOUBLE_QUOTED)).unwrap();
        assert_eq!(value["overall_score"], json!(72));
        assert_eq!(value["missing_keywords"], json!(["Python", "SQL"]));
    }
}
