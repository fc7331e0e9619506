use interviewloop_agent::{GeneratorConfig, ProviderKind, ScriptedGenerator};
use interviewloop_core::{
    Coordinator, InterviewError, InterviewSettings, InterviewStage, Speaker, APOLOGY,
    DEFAULT_TOPICS,
};
use interviewloop_evaluator::HireDecision;

const PROBLEM: &str = "Nice discussion so far. Let's try a coding exercise.\n\nProblem: Given an array of integers and a target, return the indices of the two numbers that add up to the target.";

const EVALUATION: &str = r#"The solution is correct.
{"correctness": 9, "time_complexity": "O(n)", "space_complexity": "O(n)", "code_quality": 8, "feedback": "Correct single pass with a hash map.", "suggestions": ["Handle empty input"]}"#;

const FINAL: &str = r#"{"technical_skill": 8, "problem_solving": 8, "communication": 9, "overall_rating": 8, "strengths": ["Clear"], "areas_for_improvement": ["Testing"], "recommendation": {"decision": "hire", "confidence": "high"}, "detailed_feedback": "Strong, communicative candidate."}"#;

fn coordinator(generator: &ScriptedGenerator) -> Coordinator {
    Coordinator::new(Box::new(generator.clone()), InterviewSettings::default())
}

#[tokio::test]
async fn test_full_interview_flow() {
    let generator = ScriptedGenerator::new([
        "Welcome Ada! Tell me about yourself.",
        "Backend engineer, Rust and Postgres.",
        "How would you speed up a slow query?",
        "hash maps, indexing",
        "database indexing",
        PROBLEM,
        "Since we covered indexing, here is a lookup problem.",
        "Good question: no, the input is not sorted.",
        EVALUATION,
        "Thank you for your time today, Ada.",
        FINAL,
    ]);
    let mut coordinator = coordinator(&generator);

    let intro = coordinator
        .start("Ada", Some("Backend Engineer"), Some("hard"))
        .await
        .unwrap();
    assert_eq!(intro, "Welcome Ada! Tell me about yourself.");
    assert_eq!(coordinator.current_stage(), InterviewStage::Introduction);

    let questions = coordinator
        .respond("I'm a backend engineer working with Rust and Postgres.")
        .await;
    assert_eq!(questions, "How would you speed up a slow query?");
    assert_eq!(coordinator.current_stage(), InterviewStage::TechnicalQuestions);
    assert_eq!(
        coordinator.context().background.as_deref(),
        Some("Backend engineer, Rust and Postgres.")
    );

    let problem = coordinator.respond("I'd add a B-tree index.").await;
    assert!(problem.starts_with("Since we covered indexing, here is a lookup problem."));
    assert!(problem.ends_with("add up to the target."));
    assert_eq!(coordinator.current_stage(), InterviewStage::CodingProblem);
    assert_eq!(coordinator.context().topics[0], "hash maps");
    assert_eq!(coordinator.context().topics.len(), 6);

    let hint = coordinator.respond("Can I assume the input is sorted?").await;
    assert_eq!(hint, "Good question: no, the input is not sorted.");
    assert_eq!(coordinator.current_stage(), InterviewStage::CodingProblem);
    assert!(coordinator.context().submissions.is_empty());

    let feedback = coordinator
        .respond("def two_sum(nums, target):\n    seen = {}\n    return []")
        .await;
    assert_eq!(feedback, "Correct single pass with a hash map.");
    assert_eq!(coordinator.current_stage(), InterviewStage::CodeEvaluation);

    let submission = &coordinator.context().submissions[0];
    assert_eq!(submission.problem, problem);
    assert_eq!(submission.language.as_deref(), Some("python"));
    assert_eq!(submission.evaluation.correctness, Some(9));

    let conclusion = coordinator.respond("Thanks, that was fun.").await;
    assert_eq!(
        conclusion,
        "Thank you for your time today, Ada.\n\nStrong, communicative candidate."
    );
    assert_eq!(coordinator.current_stage(), InterviewStage::FinalEvaluation);
    assert_eq!(generator.remaining(), 0);

    let notes = coordinator.notes();
    assert_eq!(notes.len(), 10);
    assert_eq!(notes[1].speaker, Speaker::Candidate);
    assert_eq!(notes[4].stage, InterviewStage::CodingProblem);
    assert_eq!(notes[4].content, problem);
    assert_eq!(notes[7].stage, InterviewStage::CodeEvaluation);
    assert_eq!(notes[7].problem_statement.as_deref(), Some(problem.as_str()));
    assert_eq!(notes[9].stage, InterviewStage::FinalEvaluation);

    let record = coordinator.final_record().unwrap();
    assert_eq!(record.overall_rating, Some(8));
    assert_eq!(record.recommendation.decision, Some(HireDecision::Hire));

    let prompts = generator.prompts();
    assert!(prompts[2].text.contains("Backend Engineer"));
    assert!(prompts[2].text.contains("hard"));
    assert!(prompts[8].text.contains("language: python"));
    assert!(prompts[8].text.contains("Problem: Given an array"));
}

#[tokio::test]
async fn test_non_code_response_takes_conversation_branch() {
    let generator = ScriptedGenerator::new(["Take your time and think aloud."]);
    let mut coordinator = coordinator(&generator);

    let text = coordinator
        .process(
            InterviewStage::CodingProblem,
            "I think I would sort first and then walk two pointers inward.",
            &[],
        )
        .await
        .unwrap();

    assert_eq!(text, "Take your time and think aloud.");
    assert!(coordinator.context().submissions.is_empty());
    assert!(coordinator.notes().is_empty());
}

#[tokio::test]
async fn test_python_submission_is_detected_and_evaluated() {
    let generator = ScriptedGenerator::new([EVALUATION]);
    let mut coordinator = coordinator(&generator);

    let text = coordinator
        .process(
            InterviewStage::CodingProblem,
            "def solve(arr): return sorted(arr)",
            &[],
        )
        .await
        .unwrap();

    assert_eq!(text, "Correct single pass with a hash map.");
    let submission = &coordinator.context().submissions[0];
    assert_eq!(submission.language.as_deref(), Some("python"));
    assert_eq!(submission.problem, "");
    assert_eq!(coordinator.notes()[0].problem_statement, None);
}

#[tokio::test]
async fn test_topic_derivation_failure_yields_defaults() {
    let generator = ScriptedGenerator::new(["Hello"]);
    generator.push_failure("provider unavailable");
    let mut coordinator = coordinator(&generator);
    coordinator.start("Ada", None, None).await.unwrap();

    let topics = coordinator
        .derive_topics(coordinator.notes(), Some("I like graphs"))
        .await
        .unwrap();

    assert_eq!(topics, DEFAULT_TOPICS);
}

#[tokio::test]
async fn test_topics_on_empty_transcript_skip_generation() {
    let generator = ScriptedGenerator::default();
    let coordinator = coordinator(&generator);

    let topics = coordinator.derive_topics(&[], None).await.unwrap();

    assert_eq!(topics, DEFAULT_TOPICS);
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn test_final_evaluation_failure_degrades() {
    let generator = ScriptedGenerator::new(["Hello"]);
    generator.push_failure("connection reset");
    let mut coordinator = coordinator(&generator);
    coordinator.start("Ada", None, None).await.unwrap();

    assert!(coordinator.final_record().is_none());
    let record = coordinator.final_evaluation().await.unwrap();

    assert_eq!(coordinator.final_record(), Some(&record));
    assert_eq!(record.technical_skill, Some(5));
    assert_eq!(record.problem_solving, Some(5));
    assert_eq!(record.communication, Some(5));
    assert_eq!(record.overall_rating, Some(5));
    assert_eq!(record.recommendation.decision, Some(HireDecision::Undecided));
    assert!(!record.detailed_feedback.is_empty());

    let last = coordinator.notes().last().unwrap();
    assert_eq!(last.stage, InterviewStage::FinalEvaluation);
    assert_eq!(last.content, record.detailed_feedback);
}

#[tokio::test]
async fn test_direct_code_submission() {
    let generator = ScriptedGenerator::new(["Correctness: 6/10. Consider an early return."]);
    let mut coordinator = coordinator(&generator);

    let record = coordinator
        .evaluate_code("fn main() {}", "Print nothing", Some("rust"))
        .await
        .unwrap();

    assert_eq!(record.correctness, Some(6));
    assert_eq!(record.feedback, "Correctness: 6/10. Consider an early return.");
    assert_eq!(record.suggestions, vec!["Consider an early return"]);
    assert_eq!(coordinator.context().submissions.len(), 1);
    assert_eq!(coordinator.current_stage(), InterviewStage::CodeEvaluation);
    assert_eq!(
        coordinator.notes()[0].problem_statement.as_deref(),
        Some("Print nothing")
    );
}

#[tokio::test]
async fn test_second_problem_with_raised_threshold() {
    let generator = ScriptedGenerator::new([
        "Hello",
        EVALUATION,
        "graphs, heaps",
        "Great job. Let's explore another area.",
        "Problem: Find the k largest elements.",
    ]);
    let settings = InterviewSettings {
        second_problem_threshold: 2,
        ..InterviewSettings::default()
    };
    let mut coordinator = Coordinator::new(Box::new(generator.clone()), settings);
    coordinator.start("Ada", None, None).await.unwrap();
    coordinator
        .evaluate_code("def f(): pass", "Problem: f", Some("python"))
        .await
        .unwrap();

    let text = coordinator.respond("Ready for more.").await;

    assert_eq!(
        text,
        "Great job. Let's explore another area.\n\nProblem: Find the k largest elements."
    );
    assert_eq!(coordinator.current_stage(), InterviewStage::CodingProblem);
    assert_eq!(
        coordinator.context().current_problem.as_deref(),
        Some("Problem: Find the k largest elements.")
    );
    let prompts = generator.prompts();
    assert!(prompts[3].text.contains("heaps"));
    assert!(prompts[4].text.contains("Topic: heaps"));
}

#[tokio::test]
async fn test_default_threshold_concludes_after_first_submission() {
    let long_feedback = vec!["detail"; 120].join(" ");
    let generator = ScriptedGenerator::new([
        "Hello".to_string(),
        EVALUATION.to_string(),
        "Thanks for interviewing with us.".to_string(),
        format!(r#"{{"overall_rating": 7, "detailed_feedback": "{}"}}"#, long_feedback),
        "- Solid fundamentals\n- Communicates clearly\n- Should test more".to_string(),
    ]);
    let mut coordinator = coordinator(&generator);
    coordinator.start("Ada", None, None).await.unwrap();
    coordinator
        .evaluate_code("def f(): pass", "Problem: f", None)
        .await
        .unwrap();

    let text = coordinator.respond("Done.").await;

    assert_eq!(
        text,
        "Thanks for interviewing with us.\n\n- Solid fundamentals\n- Communicates clearly\n- Should test more"
    );
    assert_eq!(coordinator.current_stage(), InterviewStage::FinalEvaluation);
}

#[tokio::test]
async fn test_final_stage_passes_response_through() {
    let generator = ScriptedGenerator::new(["You're welcome!"]);
    let mut coordinator = coordinator(&generator);

    let text = coordinator
        .process(InterviewStage::FinalEvaluation, "Thanks again", &[])
        .await
        .unwrap();

    assert_eq!(text, "You're welcome!");
    assert_eq!(generator.prompts()[0].text, "Thanks again");
}

#[tokio::test]
async fn test_generation_failure_returns_apology() {
    let generator = ScriptedGenerator::new(["Hello"]);
    generator.push_failure("rate limited");
    let mut coordinator = coordinator(&generator);
    coordinator.start("Ada", None, None).await.unwrap();

    let text = coordinator.respond("I build compilers.").await;

    assert_eq!(text, APOLOGY);
    assert_eq!(
        coordinator.context().background.as_deref(),
        Some("I build compilers.")
    );
}

#[tokio::test]
async fn test_cleanup_closes_session() {
    let generator = ScriptedGenerator::new(["Hello"]);
    let mut coordinator = coordinator(&generator);
    coordinator.start("Ada", None, None).await.unwrap();

    let transcript = coordinator.cleanup().await;

    assert_eq!(transcript.len(), 1);
    assert!(coordinator.notes().is_empty());
    assert!(coordinator.is_closed());
    assert!(generator.is_closed());
    assert!(matches!(
        coordinator.start("Ada", None, None).await,
        Err(InterviewError::SessionClosed)
    ));
    assert_eq!(coordinator.respond("hello?").await, APOLOGY);
}

#[tokio::test]
async fn test_reconfigure_keeps_context_and_notes() {
    let first = ScriptedGenerator::new(["Hello"]);
    let mut coordinator = coordinator(&first);
    coordinator
        .start("Ada", Some("Data Engineer"), None)
        .await
        .unwrap();

    let config = GeneratorConfig::new(ProviderKind::Scripted).with_script(["Welcome back."]);
    coordinator.reconfigure(&config).await.unwrap();

    assert!(first.is_closed());
    assert_eq!(coordinator.notes().len(), 1);
    assert_eq!(coordinator.context().role, "Data Engineer");
    assert_eq!(
        coordinator.generator_info(),
        Some(("scripted".to_string(), "script".to_string()))
    );

    let text = coordinator
        .process(InterviewStage::FollowUp, "Are we still on?", &[])
        .await
        .unwrap();
    assert_eq!(text, "Welcome back.");
}

#[tokio::test]
async fn test_resume_discussion() {
    let generator = ScriptedGenerator::new(["Tell me about the payments service you built."]);
    let mut coordinator = coordinator(&generator);

    let text = coordinator
        .discuss_resume("2019-2023: Built payments service at Acme")
        .await
        .unwrap();

    assert_eq!(text, "Tell me about the payments service you built.");
    assert_eq!(coordinator.current_stage(), InterviewStage::Introduction);
    assert_eq!(coordinator.notes()[0].stage, InterviewStage::ResumeDiscussion);
    assert!(generator.prompts()[0].text.contains("payments service at Acme"));
}

#[tokio::test]
async fn test_resume_discussion_continues_to_technical_questions() {
    let generator = ScriptedGenerator::new([
        "Welcome Ada! Tell me about yourself.",
        "Tell me about the payments service you built.",
        "Backend engineer who built a payments service in Rust.",
        "How did you keep payment writes idempotent?",
    ]);
    let mut coordinator = coordinator(&generator);

    coordinator.start("Ada", None, None).await.unwrap();
    coordinator
        .discuss_resume("2019-2023: Built payments service at Acme")
        .await
        .unwrap();

    let reply = coordinator
        .respond("I led the ledger work and the retry queue.")
        .await;

    assert_eq!(reply, "How did you keep payment writes idempotent?");
    assert_eq!(coordinator.current_stage(), InterviewStage::TechnicalQuestions);
    assert_eq!(
        coordinator.context().background.as_deref(),
        Some("Backend engineer who built a payments service in Rust.")
    );
    let stages: Vec<InterviewStage> = coordinator.notes().iter().map(|e| e.stage).collect();
    assert_eq!(
        stages,
        vec![
            InterviewStage::Introduction,
            InterviewStage::ResumeDiscussion,
            InterviewStage::Introduction,
            InterviewStage::TechnicalQuestions,
        ]
    );
}

#[tokio::test]
async fn test_failed_resume_discussion_restores_stage() {
    let generator = ScriptedGenerator::new(["Welcome Ada!"]);
    generator.push_failure("connection reset");
    let mut coordinator = coordinator(&generator);
    coordinator.start("Ada", None, None).await.unwrap();

    let result = coordinator.discuss_resume("Rust, Postgres").await;

    assert!(matches!(result, Err(InterviewError::Generation(_))));
    assert_eq!(coordinator.current_stage(), InterviewStage::Introduction);
    assert_eq!(coordinator.notes().len(), 1);
}

#[tokio::test]
async fn test_fenced_submission_is_evaluated() {
    let generator = ScriptedGenerator::new([EVALUATION]);
    let mut coordinator = coordinator(&generator);
    let turn = "```rust\nfn add(a: i32, b: i32) -> i32 { a + b }\n```";

    let text = coordinator
        .process(InterviewStage::CodingProblem, turn, &[])
        .await
        .unwrap();

    assert_eq!(text, "Correct single pass with a hash map.");
    let submission = &coordinator.context().submissions[0];
    assert_eq!(submission.code, turn);
    assert_eq!(submission.language.as_deref(), Some("unknown"));
    assert!(generator.prompts()[0].text.contains("fn add(a: i32, b: i32)"));
}

#[tokio::test]
async fn test_from_config_rejects_invalid_settings() {
    let config = GeneratorConfig::new(ProviderKind::Scripted).with_script(["hi"]);
    let settings = InterviewSettings {
        second_problem_threshold: 0,
        ..InterviewSettings::default()
    };

    let result = Coordinator::from_config(&config, settings);

    assert!(matches!(result, Err(InterviewError::Config(_))));
    assert!(Coordinator::from_config(&config, InterviewSettings::default()).is_ok());
}
