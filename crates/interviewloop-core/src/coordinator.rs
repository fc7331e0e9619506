use std::sync::Arc;
use std::time::Instant;

use interviewloop_agent::{create_generator, Generator, GeneratorConfig};
use interviewloop_evaluator::extract::word_count;
use interviewloop_evaluator::{
    CodeEvaluationInput, CodeEvaluator, EvaluationRecord, FinalEvaluationRecord, FinalEvaluator,
};
use interviewloop_logging::{LogEvent, Logger};
use tracing::{debug, info, warn};

use crate::heuristics::{detect_language, looks_like_code};
use crate::transcript::{self, Speaker, Transcript, TranscriptEntry};
use crate::{
    CodeSubmission, InterviewContext, InterviewError, InterviewPrompts, InterviewSettings,
    InterviewStage, StageController,
};

/// Appended, in order, after any derived topics
pub const DEFAULT_TOPICS: [&str; 4] = [
    "algorithms",
    "data structures",
    "system design",
    "concurrency",
];

/// At most this many topics are taken from the model's answer
const MAX_DERIVED_TOPICS: usize = 4;

/// Transcript entries used to extract discussion context
const CONTEXT_WINDOW: usize = 4;

/// Shown to the candidate when a turn could not be processed
pub const APOLOGY: &str = "I'm sorry, I ran into a problem processing that. Could you say that again?";

/// What to do with a candidate response, decided by the current stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Summarize the introduction and move to technical questions
    SummarizeBackground,
    /// Derive topics and context, then present a coding problem
    PresentProblem,
    /// Evaluate a submission, or help a candidate who has not submitted yet
    ReviewSubmission,
    /// Offer another problem or wrap up the interview
    NextProblemOrConclude,
    /// Forward the response to the model as-is
    PassThrough,
}

impl Route {
    pub fn for_stage(stage: InterviewStage) -> Self {
        match stage {
            InterviewStage::Introduction => Route::SummarizeBackground,
            InterviewStage::TechnicalQuestions => Route::PresentProblem,
            InterviewStage::CodingProblem => Route::ReviewSubmission,
            InterviewStage::CodeEvaluation => Route::NextProblemOrConclude,
            InterviewStage::ResumeDiscussion
            | InterviewStage::FollowUp
            | InterviewStage::FinalEvaluation => Route::PassThrough,
        }
    }
}

/// Routes candidate responses through the interview stages.
///
/// One coordinator owns one session: its context, its notes and its generator.
/// After [`Coordinator::cleanup`] every operation fails with
/// [`InterviewError::SessionClosed`].
pub struct Coordinator {
    generator: Option<Box<dyn Generator>>,
    controller: StageController,
    context: InterviewContext,
    settings: InterviewSettings,
    logger: Option<Arc<Logger>>,
    started_at: Instant,
    final_record: Option<FinalEvaluationRecord>,
}

impl Coordinator {
    pub fn new(generator: Box<dyn Generator>, settings: InterviewSettings) -> Self {
        let context = InterviewContext::new(
            settings.default_role.clone(),
            settings.default_difficulty.clone(),
        );
        let controller =
            StageController::new().with_intro_word_limit(settings.intro_rewrite_word_limit);

        Self {
            generator: Some(generator),
            controller,
            context,
            settings,
            logger: None,
            started_at: Instant::now(),
            final_record: None,
        }
    }

    /// Build the generator from configuration
    pub fn from_config(
        config: &GeneratorConfig,
        settings: InterviewSettings,
    ) -> Result<Self, InterviewError> {
        settings.validate()?;
        Ok(Self::new(create_generator(config)?, settings))
    }

    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn current_stage(&self) -> InterviewStage {
        self.controller.current_stage()
    }

    pub fn notes(&self) -> &[TranscriptEntry] {
        self.controller.notes()
    }

    pub fn context(&self) -> &InterviewContext {
        &self.context
    }

    pub fn settings(&self) -> &InterviewSettings {
        &self.settings
    }

    pub fn is_closed(&self) -> bool {
        self.generator.is_none()
    }

    /// The most recent final evaluation, if one has been produced
    pub fn final_record(&self) -> Option<&FinalEvaluationRecord> {
        self.final_record.as_ref()
    }

    /// `(provider, model)` of the active generator
    pub fn generator_info(&self) -> Option<(String, String)> {
        self.generator
            .as_deref()
            .map(|g| (g.name().to_string(), g.model().to_string()))
    }

    /// Begin the interview. Role and difficulty fall back to the settings.
    pub async fn start(
        &mut self,
        candidate_name: &str,
        role: Option<&str>,
        difficulty: Option<&str>,
    ) -> Result<String, InterviewError> {
        let generator = active(&self.generator)?;

        self.context.candidate_name = Some(candidate_name.to_string());
        if let Some(role) = role {
            self.context.role = role.to_string();
        }
        if let Some(difficulty) = difficulty {
            self.context.difficulty = difficulty.to_string();
        }
        self.started_at = Instant::now();

        self.log(&LogEvent::InterviewStarted {
            candidate: candidate_name.to_string(),
            role: self.context.role.clone(),
            difficulty: self.context.difficulty.clone(),
            provider: generator.name().to_string(),
            model: generator.model().to_string(),
        });
        self.log(&LogEvent::StageEntered {
            stage: InterviewStage::Introduction.to_string(),
        });

        Ok(self.controller.start(generator, candidate_name).await?)
    }

    /// Handle one candidate turn: record it, then route it by the current stage.
    ///
    /// Never fails; errors are logged and the candidate gets [`APOLOGY`].
    pub async fn respond(&mut self, response: &str) -> String {
        if self.is_closed() {
            warn!("Response received after session cleanup");
            return APOLOGY.to_string();
        }

        let stage = self.current_stage();
        self.log(&LogEvent::CandidateResponded {
            stage: stage.to_string(),
            chars: response.chars().count(),
            looks_like_code: looks_like_code(response),
        });
        self.controller.record_candidate_response(response);

        let notes = self.controller.notes().to_vec();
        match self.process(stage, response, &notes).await {
            Ok(text) => text,
            Err(e) => {
                warn!(stage = %stage, error = %e, "Failed to process candidate response");
                self.log(&LogEvent::GenerationFailed {
                    stage: stage.to_string(),
                    error: e.to_string(),
                });
                APOLOGY.to_string()
            }
        }
    }

    /// Decide and run the next action for `response` given at `stage`
    pub async fn process(
        &mut self,
        stage: InterviewStage,
        response: &str,
        transcript: &[TranscriptEntry],
    ) -> Result<String, InterviewError> {
        let route = Route::for_stage(stage);
        debug!(stage = %stage, ?route, "Routing candidate response");

        let before = self.current_stage();
        let text = match route {
            Route::SummarizeBackground => self.summarize_background(response).await?,
            Route::PresentProblem => self.present_problem(response, transcript).await?,
            Route::ReviewSubmission => self.review_submission(response, transcript).await?,
            Route::NextProblemOrConclude => self.next_problem_or_conclude(transcript).await?,
            Route::PassThrough => self.pass_through(response).await?,
        };

        let after = self.current_stage();
        if after != before {
            self.log(&LogEvent::StageEntered {
                stage: after.to_string(),
            });
        }
        Ok(text)
    }

    async fn summarize_background(&mut self, response: &str) -> Result<String, InterviewError> {
        let generator = active(&self.generator)?;

        // Raw introduction stands in until the summary arrives
        self.context.background = Some(response.to_string());
        let background = generator
            .generate(&InterviewPrompts::background_summary(response))
            .await?;
        self.context.background = Some(background.clone());

        Ok(self
            .controller
            .ask_technical_questions(
                generator,
                &background,
                &self.context.role,
                &self.context.difficulty,
            )
            .await?)
    }

    async fn present_problem(
        &mut self,
        response: &str,
        transcript: &[TranscriptEntry],
    ) -> Result<String, InterviewError> {
        let topics = self.derive_topics(transcript, Some(response)).await?;
        let generator = active(&self.generator)?;

        let recent = with_response(
            transcript::recent(transcript, CONTEXT_WINDOW),
            Some(response),
        );
        let technical_context = generator
            .generate(&InterviewPrompts::technical_context(&recent))
            .await?;

        let topic = topics.first().map(String::as_str).unwrap_or(DEFAULT_TOPICS[0]);
        let text = self
            .controller
            .present_coding_problem(
                generator,
                &self.context.difficulty,
                topic,
                Some(technical_context.as_str()),
            )
            .await?;

        self.context.topics = topics;
        self.refresh_current_problem();
        Ok(text)
    }

    async fn review_submission(
        &mut self,
        response: &str,
        transcript: &[TranscriptEntry],
    ) -> Result<String, InterviewError> {
        if !looks_like_code(response) {
            let generator = active(&self.generator)?;
            debug!("Response does not look like code, answering as conversation");
            return Ok(generator
                .generate(&InterviewPrompts::coding_hint(response))
                .await?);
        }

        if let Some(problem) = transcript::current_problem(transcript).filter(|p| !p.is_empty()) {
            self.context.current_problem = Some(problem.to_string());
        }
        let problem = self.context.current_problem.clone().unwrap_or_default();
        let language = detect_language(response);

        let record = self.evaluate_code(response, &problem, Some(language)).await?;
        Ok(record.feedback)
    }

    async fn next_problem_or_conclude(
        &mut self,
        transcript: &[TranscriptEntry],
    ) -> Result<String, InterviewError> {
        let submissions = self.context.submissions.len();
        if submissions >= self.settings.second_problem_threshold {
            debug!(submissions, "Submission threshold reached, concluding");
            return self.conclude().await;
        }

        let topics = self.derive_topics(transcript, None).await?;
        let Some(topic) = topics.get(1).cloned() else {
            return self.conclude().await;
        };

        let generator = active(&self.generator)?;
        info!(topic = %topic, "Presenting a second coding problem");
        let transition = generator
            .generate(&InterviewPrompts::second_problem_transition(&topic))
            .await?;
        let problem = self
            .controller
            .present_coding_problem(generator, &self.context.difficulty, &topic, None)
            .await?;

        self.context.topics = topics;
        self.refresh_current_problem();
        Ok(format!("{}\n\n{}", transition, problem))
    }

    async fn pass_through(&mut self, response: &str) -> Result<String, InterviewError> {
        let generator = active(&self.generator)?;
        Ok(generator
            .generate(&InterviewPrompts::pass_through(response))
            .await?)
    }

    /// Closing message followed by either the highlights of a long final
    /// evaluation or its full feedback
    async fn conclude(&mut self) -> Result<String, InterviewError> {
        let closing = active(&self.generator)?
            .generate(&InterviewPrompts::closing())
            .await?;

        let evaluation = self.final_evaluation().await?;
        let feedback = evaluation.detailed_feedback;

        if word_count(&feedback) > self.settings.highlight_word_limit {
            let highlights = active(&self.generator)?
                .generate(&InterviewPrompts::highlights(&feedback))
                .await?;
            return Ok(format!("{}\n\n{}", closing, highlights));
        }
        Ok(format!("{}\n\n{}", closing, feedback))
    }

    /// Candidate coding topics: up to four derived from the conversation, then
    /// the defaults. Never empty; a failed request yields the defaults alone.
    pub async fn derive_topics(
        &self,
        transcript: &[TranscriptEntry],
        response: Option<&str>,
    ) -> Result<Vec<String>, InterviewError> {
        let generator = active(&self.generator)?;
        let defaults = DEFAULT_TOPICS.iter().map(|t| t.to_string());

        if transcript.is_empty() {
            return Ok(defaults.collect());
        }

        let conversation = with_response(transcript, response);
        let derived = match generator.generate(&InterviewPrompts::topics(&conversation)).await {
            Ok(text) => parse_topics(&text),
            Err(e) => {
                warn!(error = %e, "Topic derivation failed, using default topics");
                Vec::new()
            }
        };

        debug!(derived = ?derived, "Derived coding topics");
        Ok(derived.into_iter().chain(defaults).collect())
    }

    /// Evaluate a submission, record it in the context and the notes.
    ///
    /// Also the direct submission entry point, bypassing stage routing.
    pub async fn evaluate_code(
        &mut self,
        code: &str,
        problem_statement: &str,
        language: Option<&str>,
    ) -> Result<EvaluationRecord, InterviewError> {
        let generator = active(&self.generator)?;
        let record = CodeEvaluator::new(generator)
            .evaluate(CodeEvaluationInput {
                code,
                problem_statement,
                language,
            })
            .await?;

        self.context.push_submission(CodeSubmission {
            problem: problem_statement.to_string(),
            code: code.to_string(),
            language: language.map(String::from),
            evaluation: record.clone(),
        });
        let problem = Some(problem_statement).filter(|p| !p.is_empty());
        self.controller.record_evaluation(&record.feedback, problem);

        self.log(&LogEvent::CodeEvaluated {
            language: language.unwrap_or("unspecified").to_string(),
            correctness: record.correctness,
            code_quality: record.code_quality,
            time_complexity: record.time_complexity.clone(),
        });
        Ok(record)
    }

    /// Evaluate the whole interview and record the result.
    ///
    /// Generation failures are absorbed into a degraded record.
    pub async fn final_evaluation(&mut self) -> Result<FinalEvaluationRecord, InterviewError> {
        let generator = active(&self.generator)?;
        let record = FinalEvaluator::new(generator)
            .evaluate(self.controller.notes())
            .await;

        self.controller
            .record_final_evaluation(&record.detailed_feedback);

        self.log(&LogEvent::InterviewConcluded {
            decision: record
                .recommendation
                .decision
                .map(|d| d.as_str().to_string()),
            overall_rating: record.overall_rating,
            duration_secs: self.started_at.elapsed().as_secs_f64(),
        });
        self.final_record = Some(record.clone());
        Ok(record)
    }

    /// Ask about the candidate's resume, then return to the interrupted stage
    /// so the next response is routed as if the detour never happened.
    pub async fn discuss_resume(&mut self, resume_text: &str) -> Result<String, InterviewError> {
        let generator = active(&self.generator)?;
        let interrupted = self.current_stage();

        let result = self.controller.discuss_resume(generator, resume_text).await;
        if result.is_ok() {
            self.log(&LogEvent::StageEntered {
                stage: InterviewStage::ResumeDiscussion.to_string(),
            });
        }
        self.controller.restore_stage(interrupted);
        debug!(stage = %interrupted, "Resumed interrupted stage after resume discussion");

        Ok(result?)
    }

    /// Rebuild the generator from new configuration. Notes and context are kept.
    pub async fn reconfigure(&mut self, config: &GeneratorConfig) -> Result<(), InterviewError> {
        let generator = create_generator(config)?;
        self.replace_generator(generator).await
    }

    pub async fn replace_generator(
        &mut self,
        generator: Box<dyn Generator>,
    ) -> Result<(), InterviewError> {
        let previous = self.generator.take().ok_or(InterviewError::SessionClosed)?;
        previous.close().await;
        info!(
            provider = generator.name(),
            model = generator.model(),
            "Generator reconfigured"
        );
        self.generator = Some(generator);
        Ok(())
    }

    /// Release the generator and clear the conversation. Returns the notes.
    pub async fn cleanup(&mut self) -> Transcript {
        if let Some(generator) = self.generator.take() {
            generator.close().await;
        }
        self.context.background = None;
        self.context.current_problem = None;
        self.context.topics.clear();
        self.controller.take_transcript()
    }

    fn refresh_current_problem(&mut self) {
        if let Some(problem) = transcript::current_problem(self.controller.notes()) {
            self.context.current_problem = Some(problem.to_string());
        }
    }

    fn log(&self, event: &LogEvent) {
        if let Some(ref logger) = self.logger {
            logger.log(event);
        }
    }
}

fn active(generator: &Option<Box<dyn Generator>>) -> Result<&dyn Generator, InterviewError> {
    generator.as_deref().ok_or(InterviewError::SessionClosed)
}

/// Rendered entries plus the candidate's response, unless it is already the last entry
fn with_response(entries: &[TranscriptEntry], response: Option<&str>) -> String {
    let mut conversation = transcript::conversation(entries);
    let already_recorded = |r: &str| {
        entries
            .last()
            .is_some_and(|e| e.speaker == Speaker::Candidate && e.content == r)
    };
    if let Some(response) = response.filter(|r| !r.is_empty() && !already_recorded(r)) {
        if !conversation.is_empty() {
            conversation.push('\n');
        }
        conversation.push_str("Candidate: ");
        conversation.push_str(response);
    }
    conversation
}

/// Comma-separated topics, trimmed, empties dropped, at most four
fn parse_topics(text: &str) -> Vec<String> {
    text.split(',')
        .map(|topic| topic.trim().trim_matches(|c| c == '"' || c == '.').trim())
        .filter(|topic| !topic.is_empty())
        .take(MAX_DERIVED_TOPICS)
        .map(String::from)
        .collect()
}
