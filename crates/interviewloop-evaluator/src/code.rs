use interviewloop_agent::{GenerationError, Generator};
use tracing::{debug, info};

use crate::{EvaluationPrompts, EvaluationRecord};

/// Inputs required to evaluate a code submission.
#[derive(Clone, Copy, Debug)]
pub struct CodeEvaluationInput<'a> {
    pub code: &'a str,
    pub problem_statement: &'a str,
    pub language: Option<&'a str>,
}

/// Evaluator that grades a single code submission
pub struct CodeEvaluator<'a> {
    generator: &'a dyn Generator,
}

impl<'a> CodeEvaluator<'a> {
    pub fn new(generator: &'a dyn Generator) -> Self {
        Self { generator }
    }

    /// Evaluate the submission. Generation failures propagate; unstructured
    /// output never fails and goes through the extraction fallbacks.
    pub async fn evaluate(
        &self,
        input: CodeEvaluationInput<'_>,
    ) -> Result<EvaluationRecord, GenerationError> {
        let prompt =
            EvaluationPrompts::code_evaluation(input.code, input.problem_statement, input.language);

        debug!(
            code_len = input.code.len(),
            language = input.language.unwrap_or("unspecified"),
            "Running code evaluation"
        );

        let raw = self.generator.generate(&prompt).await?;
        let record = EvaluationRecord::parse(&raw);

        info!(summary = %record.short_description(), "Code evaluation completed");
        Ok(record)
    }
}
