use interviewloop_agent::Generator;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{EvaluationPrompts, FinalEvaluationRecord};

/// Evaluator that turns a whole interview transcript into a hiring assessment
pub struct FinalEvaluator<'a> {
    generator: &'a dyn Generator,
}

impl<'a> FinalEvaluator<'a> {
    pub fn new(generator: &'a dyn Generator) -> Self {
        Self { generator }
    }

    /// Evaluate the interview notes.
    ///
    /// Never fails: a serialization or generation error yields
    /// [`FinalEvaluationRecord::degraded`].
    pub async fn evaluate<T>(&self, interview_notes: &T) -> FinalEvaluationRecord
    where
        T: Serialize + Sync + ?Sized,
    {
        let notes = match serde_json::to_string_pretty(interview_notes) {
            Ok(notes) => notes,
            Err(e) => {
                warn!(error = %e, "Failed to serialize interview notes");
                return FinalEvaluationRecord::degraded(&e.to_string());
            }
        };

        let prompt = EvaluationPrompts::final_evaluation(&notes);
        debug!(notes_len = notes.len(), "Running final evaluation");

        match self.generator.generate(&prompt).await {
            Ok(raw) => {
                let record = FinalEvaluationRecord::parse(&raw);
                info!(summary = %record.short_description(), "Final evaluation completed");
                record
            }
            Err(e) => {
                warn!(error = %e, "Final evaluation failed, using degraded record");
                FinalEvaluationRecord::degraded(&e.to_string())
            }
        }
    }
}
