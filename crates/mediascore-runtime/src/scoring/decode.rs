//! Strict decoding of model score replies.
//!
//! A reply either decodes into a validated [`ScoreReply`] or fails with
//! [`ScoringError::Parse`]. Nothing partially decoded leaves this module.

use serde_json::Value as JsonValue;

use mediascore_core::clamp_score;

use super::ScoringError;

/// A validated model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreReply {
    /// Score, already clamped to `[0, 100]`
    pub score: f64,

    /// Free-text rationale, when the model sent a string
    pub rationale: Option<String>,
}

impl ScoreReply {
    /// Decode the raw completion text.
    ///
    /// Accepts a JSON object whose `score` is a number, or a string holding a
    /// finite number. Out-of-range scores are clamped; a missing, null or
    /// non-numeric score is a parse error.
    pub fn decode(content: &str) -> Result<Self, ScoringError> {
        let body = strip_code_fence(content.trim());
        if body.is_empty() {
            return Err(ScoringError::Parse("empty reply".to_string()));
        }

        let value: JsonValue = serde_json::from_str(body)
            .map_err(|e| ScoringError::Parse(format!("reply is not JSON: {}", e)))?;

        let object = value
            .as_object()
            .ok_or_else(|| ScoringError::Parse("reply is not a JSON object".to_string()))?;

        let score = match object.get("score") {
            Some(JsonValue::Number(n)) => n.as_f64(),
            Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|s| s.is_finite())
        .ok_or_else(|| {
            ScoringError::Parse(format!(
                "no numeric score in reply: {:?}",
                object.get("score")
            ))
        })?;

        let rationale = object
            .get("rationale")
            .and_then(JsonValue::as_str)
            .map(str::to_string);

        Ok(Self {
            score: clamp_score(score),
            rationale,
        })
    }
}

/// Remove a surrounding Markdown code fence (```json ... ```), if present.
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening line
    match inner.split_once('\n') {
        Some((tag, rest)) if !tag.trim_start().starts_with('{') => rest.trim(),
        _ => inner.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse_err(content: &str) -> bool {
        matches!(ScoreReply::decode(content), Err(ScoringError::Parse(_)))
    }

    #[test]
    fn test_decode_number_and_rationale() {
        let reply = ScoreReply::decode(r#"{"score": 82, "rationale": "on brand"}"#).unwrap();
        assert_eq!(reply.score, 82.0);
        assert_eq!(reply.rationale.as_deref(), Some("on brand"));
    }

    #[test]
    fn test_decode_clamps_out_of_range() {
        assert_eq!(ScoreReply::decode(r#"{"score": 150}"#).unwrap().score, 100.0);
        assert_eq!(ScoreReply::decode(r#"{"score": -30}"#).unwrap().score, 0.0);
    }

    #[test]
    fn test_decode_numeric_string() {
        assert_eq!(ScoreReply::decode(r#"{"score": " 64.5 "}"#).unwrap().score, 64.5);
    }

    #[test]
    fn test_decode_rejects_non_numeric_scores() {
        assert!(parse_err(r#"{"score": "abc"}"#));
        assert!(parse_err(r#"{"score": null}"#));
        assert!(parse_err(r#"{"score": true}"#));
        assert!(parse_err(r#"{"score": "inf"}"#));
        assert!(parse_err(r#"{"rationale": "no score"}"#));
    }

    #[test]
    fn test_decode_rejects_malformed_bodies() {
        assert!(parse_err(""));
        assert!(parse_err("   "));
        assert!(parse_err("82"));
        assert!(parse_err("[82]"));
        assert!(parse_err("score: 82"));
    }

    #[test]
    fn test_non_string_rationale_is_dropped() {
        let reply = ScoreReply::decode(r#"{"score": 10, "rationale": 5}"#).unwrap();
        assert_eq!(reply.rationale, None);
    }

    proptest! {
        #[test]
        fn prop_decoded_score_in_range(score in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
            let content = serde_json::json!({ "score": score }).to_string();
            let reply = ScoreReply::decode(&content).unwrap();
            prop_assert!((0.0..=100.0).contains(&reply.score));
        }

        #[test]
        fn prop_decode_never_panics(content in ".*") {
            let _ = ScoreReply::decode(&content);
        }
    }

    #[test]
    fn test_decode_fenced_reply() {
        let fenced = "```json\n{\"score\": 71}\n```";
        assert_eq!(ScoreReply::decode(fenced).unwrap().score, 71.0);

        let bare_fence = "```{\"score\": 12}```";
        assert_eq!(ScoreReply::decode(bare_fence).unwrap().score, 12.0);
    }
}
