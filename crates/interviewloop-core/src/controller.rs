use interviewloop_agent::{GenerationError, Generator};
use interviewloop_evaluator::extract::word_count;
use tracing::{debug, info};

use crate::heuristics::is_placeholder_context;
use crate::transcript::{Transcript, TranscriptEntry};
use crate::{InterviewPrompts, InterviewStage};

/// Marks where the problem statement begins in a presented problem
pub const PROBLEM_MARKER: &str = "Problem:";

/// Default word limit for a rewritten problem introduction
pub const DEFAULT_INTRO_WORD_LIMIT: usize = 50;

/// Owns the current stage and the interview notes, and issues the
/// stage-specific generation requests.
#[derive(Debug)]
pub struct StageController {
    stage: InterviewStage,
    transcript: Transcript,
    intro_word_limit: usize,
}

impl Default for StageController {
    fn default() -> Self {
        Self::new()
    }
}

impl StageController {
    pub fn new() -> Self {
        Self {
            stage: InterviewStage::Introduction,
            transcript: Transcript::new(),
            intro_word_limit: DEFAULT_INTRO_WORD_LIMIT,
        }
    }

    pub fn with_intro_word_limit(mut self, limit: usize) -> Self {
        self.intro_word_limit = limit;
        self
    }

    pub fn current_stage(&self) -> InterviewStage {
        self.stage
    }

    /// The full interview notes, in insertion order
    pub fn notes(&self) -> &[TranscriptEntry] {
        self.transcript.entries()
    }

    pub async fn start(
        &mut self,
        generator: &dyn Generator,
        candidate_name: &str,
    ) -> Result<String, GenerationError> {
        self.enter(InterviewStage::Introduction);
        let text = generator
            .generate(&InterviewPrompts::introduction(candidate_name))
            .await?;
        self.append(text.clone());
        Ok(text)
    }

    pub async fn discuss_resume(
        &mut self,
        generator: &dyn Generator,
        resume_text: &str,
    ) -> Result<String, GenerationError> {
        self.enter(InterviewStage::ResumeDiscussion);
        let text = generator
            .generate(&InterviewPrompts::resume_discussion(resume_text))
            .await?;
        self.append(text.clone());
        Ok(text)
    }

    pub async fn ask_technical_questions(
        &mut self,
        generator: &dyn Generator,
        background: &str,
        role: &str,
        difficulty: &str,
    ) -> Result<String, GenerationError> {
        self.enter(InterviewStage::TechnicalQuestions);
        let text = generator
            .generate(&InterviewPrompts::technical_questions(
                background, role, difficulty,
            ))
            .await?;
        self.append(text.clone());
        Ok(text)
    }

    /// Present a coding problem.
    ///
    /// With usable `context`, a second request rewrites the introduction to
    /// reference it. The rewrite replaces everything before [`PROBLEM_MARKER`]
    /// only when it is short enough and the marker is found past the start;
    /// otherwise the original text is kept.
    pub async fn present_coding_problem(
        &mut self,
        generator: &dyn Generator,
        difficulty: &str,
        topic: &str,
        context: Option<&str>,
    ) -> Result<String, GenerationError> {
        self.enter(InterviewStage::CodingProblem);
        let mut text = generator
            .generate(&InterviewPrompts::coding_problem(difficulty, topic, context))
            .await?;

        if let Some(context) = context.filter(|c| !is_placeholder_context(c)) {
            let rewritten = generator
                .generate(&InterviewPrompts::rewrite_intro(context, &text))
                .await?;
            if let Some(spliced) = self.splice_intro(&text, &rewritten) {
                text = spliced;
            }
        }

        self.append(text.clone());
        Ok(text)
    }

    fn splice_intro(&self, original: &str, rewritten: &str) -> Option<String> {
        let words = word_count(rewritten);
        if words >= self.intro_word_limit {
            debug!(words, "Rewritten introduction too long, keeping original");
            return None;
        }
        match original.find(PROBLEM_MARKER) {
            Some(start) if start > 0 => Some(format!(
                "{}\n\n{}",
                rewritten.trim(),
                &original[start..]
            )),
            _ => {
                debug!("No problem marker after an introduction, keeping original");
                None
            }
        }
    }

    /// Return to `stage` after a side discussion; no entry is recorded
    pub(crate) fn restore_stage(&mut self, stage: InterviewStage) {
        self.enter(stage);
    }

    pub fn record_evaluation(&mut self, evaluation_text: &str, problem_statement: Option<&str>) {
        self.enter(InterviewStage::CodeEvaluation);
        let mut entry = TranscriptEntry::interviewer(self.stage, evaluation_text);
        if let Some(problem) = problem_statement {
            entry = entry.with_problem_statement(problem);
        }
        self.transcript.push(entry);
    }

    pub fn record_final_evaluation(&mut self, evaluation_text: &str) {
        self.enter(InterviewStage::FinalEvaluation);
        self.append(evaluation_text.to_string());
    }

    /// Append the candidate's message tagged with the current stage
    pub fn record_candidate_response(&mut self, response: &str) {
        self.transcript
            .push(TranscriptEntry::candidate(self.stage, response));
    }

    /// Hand over the notes, leaving the controller empty
    pub fn take_transcript(&mut self) -> Transcript {
        std::mem::take(&mut self.transcript)
    }

    fn enter(&mut self, stage: InterviewStage) {
        if self.stage != stage {
            info!(from = %self.stage, to = %stage, "Stage transition");
        }
        self.stage = stage;
    }

    fn append(&mut self, content: String) {
        self.transcript
            .push(TranscriptEntry::interviewer(self.stage, content));
    }
}
