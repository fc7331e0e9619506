use interviewloop_evaluator::EvaluationRecord;
use serde::{Deserialize, Serialize};

/// A graded code submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSubmission {
    pub problem: String,
    pub code: String,
    pub language: Option<String>,
    pub evaluation: EvaluationRecord,
}

/// Per-session interview state, updated as each response is processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewContext {
    pub candidate_name: Option<String>,
    pub role: String,
    pub difficulty: String,
    /// Summary of the candidate's background from their introduction
    pub background: Option<String>,
    pub current_problem: Option<String>,
    /// Topics derived when moving to the coding stage
    pub topics: Vec<String>,
    pub submissions: Vec<CodeSubmission>,
}

impl InterviewContext {
    pub fn new(role: impl Into<String>, difficulty: impl Into<String>) -> Self {
        Self {
            candidate_name: None,
            role: role.into(),
            difficulty: difficulty.into(),
            background: None,
            current_problem: None,
            topics: Vec::new(),
            submissions: Vec::new(),
        }
    }

    pub fn push_submission(&mut self, submission: CodeSubmission) {
        self.submissions.push(submission);
    }
}
