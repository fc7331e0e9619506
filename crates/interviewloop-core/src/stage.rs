use serde::{Deserialize, Serialize};

/// Interview stages, in their usual order.
///
/// The order is not a transition table: the coordinator decides every move and
/// may revisit a stage (a second problem re-enters `CodingProblem`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStage {
    #[default]
    Introduction,
    ResumeDiscussion,
    TechnicalQuestions,
    CodingProblem,
    CodeEvaluation,
    FollowUp,
    FinalEvaluation,
}

impl InterviewStage {
    pub const ALL: [InterviewStage; 7] = [
        InterviewStage::Introduction,
        InterviewStage::ResumeDiscussion,
        InterviewStage::TechnicalQuestions,
        InterviewStage::CodingProblem,
        InterviewStage::CodeEvaluation,
        InterviewStage::FollowUp,
        InterviewStage::FinalEvaluation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStage::Introduction => "introduction",
            InterviewStage::ResumeDiscussion => "resume_discussion",
            InterviewStage::TechnicalQuestions => "technical_questions",
            InterviewStage::CodingProblem => "coding_problem",
            InterviewStage::CodeEvaluation => "code_evaluation",
            InterviewStage::FollowUp => "follow_up",
            InterviewStage::FinalEvaluation => "final_evaluation",
        }
    }
}

impl std::fmt::Display for InterviewStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InterviewStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        InterviewStage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| format!("Unknown interview stage: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        for stage in InterviewStage::ALL {
            assert_eq!(stage.to_string().parse::<InterviewStage>().unwrap(), stage);
        }
        assert_eq!(
            "Coding Problem".parse::<InterviewStage>().unwrap(),
            InterviewStage::CodingProblem
        );
        assert!("onsite".parse::<InterviewStage>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&InterviewStage::FinalEvaluation).unwrap();
        assert_eq!(json, "\"final_evaluation\"");
        assert_eq!(InterviewStage::default(), InterviewStage::Introduction);
    }
}
