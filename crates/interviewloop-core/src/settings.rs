use serde::{Deserialize, Serialize};

use crate::InterviewError;
use std::time::Duration;

/// Interview policy knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterviewSettings {
    pub default_role: String,
    pub default_difficulty: String,
    /// A second coding problem is offered only while fewer submissions than
    /// this have been recorded; at 1 the branch is never taken after a submission.
    pub second_problem_threshold: usize,
    /// Final feedback longer than this many words is condensed into highlights
    pub highlight_word_limit: usize,
    /// Rewritten problem introductions must stay under this many words
    pub intro_rewrite_word_limit: usize,
    /// Idle time after which a session is reclaimed
    pub max_interview_duration_secs: u64,
}

impl Default for InterviewSettings {
    fn default() -> Self {
        Self {
            default_role: "Software Engineer".to_string(),
            default_difficulty: "medium".to_string(),
            second_problem_threshold: 1,
            highlight_word_limit: 100,
            intro_rewrite_word_limit: 50,
            max_interview_duration_secs: 3600,
        }
    }
}

impl InterviewSettings {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.max_interview_duration_secs)
    }

    /// Reject values that would make an interview unusable
    pub fn validate(&self) -> Result<(), InterviewError> {
        if self.default_role.trim().is_empty() {
            return Err(InterviewError::Config("default_role is empty".to_string()));
        }
        if self.default_difficulty.trim().is_empty() {
            return Err(InterviewError::Config(
                "default_difficulty is empty".to_string(),
            ));
        }
        if self.second_problem_threshold == 0 {
            return Err(InterviewError::Config(
                "second_problem_threshold must be at least 1".to_string(),
            ));
        }
        if self.intro_rewrite_word_limit == 0 {
            return Err(InterviewError::Config(
                "intro_rewrite_word_limit must be at least 1".to_string(),
            ));
        }
        if self.max_interview_duration_secs == 0 {
            return Err(InterviewError::Config(
                "max_interview_duration_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
