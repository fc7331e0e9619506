use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::extract::{self, ComplexityKind};

/// At most this many suggestions are kept per code evaluation
pub const MAX_SUGGESTIONS: usize = 5;

/// Score used for every metric of a degraded final evaluation
pub const DEGRADED_SCORE: u8 = 5;

const CODE_KEYS: [&str; 3] = ["correctness", "feedback", "time_complexity"];
const FINAL_KEYS: [&str; 3] = ["technical_skill", "overall_rating", "recommendation"];

/// Structured evaluation of a single code submission
///
/// Scores are 0-10 when present; `None` means the evaluation did not state one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub correctness: Option<u8>,
    pub time_complexity: Option<String>,
    pub space_complexity: Option<String>,
    pub code_quality: Option<u8>,
    /// Never empty
    pub feedback: String,
    pub suggestions: Vec<String>,
}

impl EvaluationRecord {
    /// Extract an evaluation from generated text.
    ///
    /// A structured block carrying `correctness`, `feedback` or `time_complexity`
    /// wins; otherwise fields are scraped from the prose. Feedback falls back to
    /// the full raw text.
    pub fn parse(raw: &str) -> Self {
        if let Some(map) = extract::structured_block(raw, &CODE_KEYS) {
            debug!("Parsed code evaluation from structured block");
            return Self::from_block(&map, raw);
        }

        debug!(raw_len = raw.len(), "No structured block, scraping code evaluation");
        Self {
            correctness: extract::score_near(raw, "correctness"),
            time_complexity: extract::complexity(raw, ComplexityKind::Time),
            space_complexity: extract::complexity(raw, ComplexityKind::Space),
            code_quality: extract::score_near(raw, "quality"),
            feedback: extract::non_empty_feedback(None, raw),
            suggestions: extract::suggestions(raw, MAX_SUGGESTIONS),
        }
    }

    fn from_block(map: &Map<String, Value>, raw: &str) -> Self {
        let mut suggestions = map
            .get("suggestions")
            .map(extract::string_list)
            .unwrap_or_default();
        suggestions.truncate(MAX_SUGGESTIONS);

        Self {
            correctness: map.get("correctness").and_then(extract::score_value),
            time_complexity: map.get("time_complexity").and_then(extract::text_value),
            space_complexity: map.get("space_complexity").and_then(extract::text_value),
            code_quality: map.get("code_quality").and_then(extract::score_value),
            feedback: extract::non_empty_feedback(
                map.get("feedback").and_then(extract::text_value),
                raw,
            ),
            suggestions,
        }
    }

    /// Compact summary for logs
    pub fn short_description(&self) -> String {
        let score = |s: Option<u8>| s.map_or("-".to_string(), |v| format!("{}/10", v));
        format!(
            "correctness {} quality {} time {}",
            score(self.correctness),
            score(self.code_quality),
            self.time_complexity.as_deref().unwrap_or("-")
        )
    }
}

/// Hiring decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HireDecision {
    Hire,
    NoHire,
    Undecided,
}

impl HireDecision {
    /// Normalise free-form decision labels ("No Hire", "no-hire", "strong hire")
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "undecided" | "unsure" | "maybe" => Some(HireDecision::Undecided),
            "" => None,
            _ => extract::hire_decision(&normalized.replace('_', " ")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HireDecision::Hire => "hire",
            HireDecision::NoHire => "no_hire",
            HireDecision::Undecided => "undecided",
        }
    }
}

/// Confidence attached to a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl Confidence {
    /// Unknown labels map to `Medium`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "high" | "strong" => Confidence::High,
            "low" | "weak" => Confidence::Low,
            _ => Confidence::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recommendation {
    pub decision: Option<HireDecision>,
    pub confidence: Confidence,
}

impl Recommendation {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Recommendation {
                decision: map
                    .get("decision")
                    .and_then(Value::as_str)
                    .and_then(HireDecision::from_label),
                confidence: map
                    .get("confidence")
                    .and_then(Value::as_str)
                    .map(Confidence::from_label)
                    .unwrap_or_default(),
            },
            Value::String(text) => extract::recommendation(text),
            _ => Recommendation::default(),
        }
    }
}

/// Structured hire/no-hire assessment of a whole interview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalEvaluationRecord {
    pub technical_skill: Option<u8>,
    pub problem_solving: Option<u8>,
    pub communication: Option<u8>,
    pub overall_rating: Option<u8>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub recommendation: Recommendation,
    /// Never empty
    pub detailed_feedback: String,
}

impl FinalEvaluationRecord {
    /// Extract a final evaluation from generated text, same strategy as
    /// [`EvaluationRecord::parse`].
    pub fn parse(raw: &str) -> Self {
        if let Some(map) = extract::structured_block(raw, &FINAL_KEYS) {
            debug!("Parsed final evaluation from structured block");
            return Self::from_block(&map, raw);
        }

        debug!(raw_len = raw.len(), "No structured block, scraping final evaluation");
        Self {
            technical_skill: extract::score_near(raw, "technical"),
            problem_solving: extract::score_near(raw, "problem"),
            communication: extract::score_near(raw, "communicat"),
            overall_rating: extract::score_near(raw, "overall"),
            strengths: extract::section_list(raw, "strength"),
            areas_for_improvement: extract::section_list(raw, "improv"),
            recommendation: extract::recommendation(raw),
            detailed_feedback: extract::non_empty_feedback(None, raw),
        }
    }

    fn from_block(map: &Map<String, Value>, raw: &str) -> Self {
        let list = |key: &str| map.get(key).map(extract::string_list).unwrap_or_default();

        Self {
            technical_skill: map.get("technical_skill").and_then(extract::score_value),
            problem_solving: map.get("problem_solving").and_then(extract::score_value),
            communication: map.get("communication").and_then(extract::score_value),
            overall_rating: map.get("overall_rating").and_then(extract::score_value),
            strengths: list("strengths"),
            areas_for_improvement: list("areas_for_improvement"),
            recommendation: map
                .get("recommendation")
                .map(Recommendation::from_value)
                .unwrap_or_default(),
            detailed_feedback: extract::non_empty_feedback(
                map.get("detailed_feedback").and_then(extract::text_value),
                raw,
            ),
        }
    }

    /// Fixed record returned when the evaluation could not be produced at all
    pub fn degraded(error: &str) -> Self {
        Self {
            technical_skill: Some(DEGRADED_SCORE),
            problem_solving: Some(DEGRADED_SCORE),
            communication: Some(DEGRADED_SCORE),
            overall_rating: Some(DEGRADED_SCORE),
            strengths: vec!["Unable to assess strengths because the evaluation failed".to_string()],
            areas_for_improvement: vec![
                "Unable to assess areas for improvement because the evaluation failed".to_string(),
            ],
            recommendation: Recommendation {
                decision: Some(HireDecision::Undecided),
                confidence: Confidence::Low,
            },
            detailed_feedback: format!("The final evaluation could not be completed: {}", error),
        }
    }

    /// Get a short description of the assessment for logging
    pub fn short_description(&self) -> String {
        let decision = self
            .recommendation
            .decision
            .map_or("none", |d| d.as_str());
        match self.overall_rating {
            Some(overall) => format!("{} (overall {}/10)", decision, overall),
            None => decision.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structured_code_evaluation() {
        let raw = r#"The solution is correct and idiomatic.

```json
{"correctness": 9, "time_complexity": "O(n)", "space_complexity": "O(n)", "code_quality": 8, "feedback": "Clean single pass.", "suggestions": ["Name the helper", "Add tests"]}
```"#;
        let record = EvaluationRecord::parse(raw);
        assert_eq!(record.correctness, Some(9));
        assert_eq!(record.time_complexity.as_deref(), Some("O(n)"));
        assert_eq!(record.code_quality, Some(8));
        assert_eq!(record.feedback, "Clean single pass.");
        assert_eq!(record.suggestions, vec!["Name the helper", "Add tests"]);
    }

    #[test]
    fn test_structured_block_without_feedback_backfills_raw() {
        let raw = r#"Analysis follows. {"correctness": 6}"#;
        let record = EvaluationRecord::parse(raw);
        assert_eq!(record.correctness, Some(6));
        assert_eq!(record.feedback, raw);
        assert!(record.suggestions.is_empty());
        assert_eq!(record.time_complexity, None);
    }

    #[test]
    fn test_structured_suggestions_capped() {
        let raw = r#"{"feedback": "ok", "suggestions": ["1","2","3","4","5","6","7"]}"#;
        assert_eq!(EvaluationRecord::parse(raw).suggestions.len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_scraped_code_evaluation() {
        let raw = "Correctness: 7/10. The approach works for most inputs.\n\nTime Complexity: O(n^2) due to nested loops.\n\nSpace Complexity: constant extra memory\n\nCode Quality: 6 out of 10\n\nSuggestions:\n- Use a hash map\n- Extract a helper";
        let record = EvaluationRecord::parse(raw);
        assert_eq!(record.correctness, Some(7));
        assert_eq!(record.code_quality, Some(6));
        assert_eq!(record.time_complexity.as_deref(), Some("O(n^2)"));
        assert_eq!(
            record.space_complexity.as_deref(),
            Some("constant extra memory")
        );
        assert_eq!(record.suggestions, vec!["Use a hash map", "Extract a helper"]);
        assert_eq!(record.feedback, raw);
    }

    #[test]
    fn test_blank_generation_still_has_feedback() {
        let record = EvaluationRecord::parse("   ");
        assert!(!record.feedback.is_empty());
        assert_eq!(record.correctness, None);
    }

    #[test]
    fn test_parse_structured_final_evaluation() {
        let raw = r#"Summary below.
{"technical_skill": 8, "problem_solving": "7/10", "communication": 9, "overall_rating": 8,
 "strengths": ["Clear explanations"], "areas_for_improvement": ["Edge cases"],
 "recommendation": {"decision": "Hire", "confidence": "High"},
 "detailed_feedback": "Strong candidate."}"#;
        let record = FinalEvaluationRecord::parse(raw);
        assert_eq!(record.technical_skill, Some(8));
        assert_eq!(record.problem_solving, Some(7));
        assert_eq!(record.recommendation.decision, Some(HireDecision::Hire));
        assert_eq!(record.recommendation.confidence, Confidence::High);
        assert_eq!(record.detailed_feedback, "Strong candidate.");
    }

    #[test]
    fn test_structured_recommendation_as_string() {
        let raw = r#"{"overall_rating": 4, "recommendation": "Do not hire, I am not confident in their fundamentals"}"#;
        let record = FinalEvaluationRecord::parse(raw);
        assert_eq!(record.recommendation.decision, Some(HireDecision::NoHire));
        assert_eq!(record.recommendation.confidence, Confidence::Low);
        assert_eq!(record.detailed_feedback, raw);
    }

    #[test]
    fn test_scraped_final_evaluation() {
        let raw = "Technical Knowledge: 6/10\nProblem-Solving Ability: 5/10\nCommunication Skills: 8/10\nOverall Rating: 6/10\n\nStrengths:\n- Friendly\n- Explains trade-offs\n\nAreas for Improvement:\n- Algorithms\n\nHiring Recommendation: I would hire this candidate for a junior role, though I do not recommend them for senior. I am fairly confident.";
        let record = FinalEvaluationRecord::parse(raw);
        assert_eq!(record.technical_skill, Some(6));
        assert_eq!(record.problem_solving, Some(5));
        assert_eq!(record.communication, Some(8));
        assert_eq!(record.overall_rating, Some(6));
        assert_eq!(record.strengths, vec!["Friendly", "Explains trade-offs"]);
        assert_eq!(record.areas_for_improvement, vec!["Algorithms"]);
        assert_eq!(record.recommendation.decision, Some(HireDecision::NoHire));
        assert_eq!(record.recommendation.confidence, Confidence::High);
    }

    #[test]
    fn test_degraded_record() {
        let record = FinalEvaluationRecord::degraded("connection reset");
        assert_eq!(record.technical_skill, Some(5));
        assert_eq!(record.problem_solving, Some(5));
        assert_eq!(record.communication, Some(5));
        assert_eq!(record.overall_rating, Some(5));
        assert_eq!(record.recommendation.decision, Some(HireDecision::Undecided));
        assert_eq!(record.recommendation.confidence, Confidence::Low);
        assert!(record.detailed_feedback.contains("connection reset"));
    }

    #[test]
    fn test_decision_labels() {
        assert_eq!(HireDecision::from_label("No Hire"), Some(HireDecision::NoHire));
        assert_eq!(HireDecision::from_label("no_hire"), Some(HireDecision::NoHire));
        assert_eq!(HireDecision::from_label("Strong hire"), Some(HireDecision::Hire));
        assert_eq!(HireDecision::from_label("undecided"), Some(HireDecision::Undecided));
        assert_eq!(HireDecision::from_label(""), None);
    }

    #[test]
    fn test_record_serializes_absent_scores_as_null() {
        let record = EvaluationRecord::parse("plain words");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["correctness"].is_null());
        assert_eq!(json["feedback"], "plain words");
    }
}
