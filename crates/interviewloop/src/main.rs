mod config;
mod terminal;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use tokio::sync::Notify;
use tracing::info;

use interviewloop_agent::{create_generator, Generator, ProviderKind, ScriptedGenerator};
use interviewloop_core::heuristics::{detect_language, language_for_extension};
use interviewloop_core::{CodeSubmission, Coordinator, SessionHandle, SessionRegistry};
use interviewloop_evaluator::FinalEvaluationRecord;
use interviewloop_logging::{init_tracing, LogFormat, Logger, SessionWriter};

use config::{AppConfig, Overrides, CONFIG_FILE_NAME};
use terminal::{next_turn, read_stdin_turn, Command, Input};

const DRY_RUN_REPLY: &str =
    "(dry run) Thanks, that's helpful. Could you tell me a bit more about it?";

#[derive(Parser, Debug)]
#[command(
    name = "interviewloop",
    about = "Automated technical interviews in the terminal",
    version,
    author
)]
struct Cli {
    /// Candidate name
    #[arg(short, long)]
    candidate: String,

    /// Role the candidate is interviewing for
    #[arg(short, long)]
    role: Option<String>,

    /// Interview difficulty
    #[arg(long, value_enum)]
    difficulty: Option<DifficultyChoice>,

    /// Generation backend
    #[arg(short, long, value_enum)]
    provider: Option<ProviderChoice>,

    /// Model to use
    #[arg(short, long)]
    model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// Working directory holding interviewloop.toml (default: current directory)
    #[arg(short = 'd', long)]
    working_dir: Option<PathBuf>,

    /// Resume file to discuss after the introduction
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Diagnostic log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Also append interview events to this file as JSON lines
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Output the final result as JSON
    #[arg(long)]
    json_output: bool,

    /// Do not record the session under the data directory
    #[arg(long)]
    no_session_file: bool,

    /// Dry run: canned interviewer replies, no model calls
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            provider: self.provider.map(|p| ProviderKind::from(p).to_string()),
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            difficulty: self.difficulty.map(|d| d.as_str().to_string()),
            ..Overrides::default()
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DifficultyChoice {
    Easy,
    Medium,
    Hard,
}

impl DifficultyChoice {
    fn as_str(self) -> &'static str {
        match self {
            DifficultyChoice::Easy => "easy",
            DifficultyChoice::Medium => "medium",
            DifficultyChoice::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderChoice {
    Openai,
    Azure,
    Command,
    Scripted,
}

impl From<ProviderChoice> for ProviderKind {
    fn from(choice: ProviderChoice) -> Self {
        match choice {
            ProviderChoice::Openai => ProviderKind::OpenAi,
            ProviderChoice::Azure => ProviderKind::Azure,
            ProviderChoice::Command => ProviderKind::Command,
            ProviderChoice::Scripted => ProviderKind::Scripted,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

/// How the interview ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    Completed,
    Quit,
    Interrupted,
    TimedOut,
    EndOfInput,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::Quit => "quit",
            Outcome::Interrupted => "interrupted",
            Outcome::TimedOut => "timed_out",
            Outcome::EndOfInput => "end_of_input",
        }
    }

    fn exit_code(self) -> i32 {
        match self {
            Outcome::Completed | Outcome::Quit | Outcome::EndOfInput => 0,
            Outcome::TimedOut => 1,
            Outcome::Interrupted => 130,
        }
    }
}

#[derive(Serialize)]
struct InterviewSummary<'a> {
    candidate: &'a str,
    role: &'a str,
    difficulty: &'a str,
    outcome: Outcome,
    duration_secs: f64,
    submissions: &'a [CodeSubmission],
    final_evaluation: Option<&'a FinalEvaluationRecord>,
    session_file: Option<&'a Path>,
}

/// Mirrors new notes and submissions into the session file
struct Recorder {
    writer: Option<SessionWriter>,
    entries: usize,
    submissions: usize,
}

impl Recorder {
    fn flush(&mut self, coordinator: &Coordinator) {
        let Some(ref writer) = self.writer else {
            return;
        };
        for (offset, entry) in coordinator.notes().iter().enumerate().skip(self.entries) {
            writer.write_entry(offset, entry);
        }
        self.entries = self.entries.max(coordinator.notes().len());

        for submission in coordinator.context().submissions.iter().skip(self.submissions) {
            writer.write_code_evaluation(submission.language.as_deref(), &submission.evaluation);
        }
        self.submissions = coordinator.context().submissions.len();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = match cli.working_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);

    let mut config = match AppConfig::load(&working_dir)? {
        Some(config) => {
            info!(dir = %working_dir.display(), "Loaded {}", CONFIG_FILE_NAME);
            config
        }
        None => AppConfig::default(),
    };
    config.apply(Overrides::from_env()?);
    config.apply(cli.overrides());
    config
        .interview
        .validate()
        .with_context(|| format!("Invalid [interview] settings in {}", CONFIG_FILE_NAME))?;

    let generator: Box<dyn Generator> = if cli.dry_run {
        Box::new(ScriptedGenerator::new(config.script.clone()).with_fallback(DRY_RUN_REPLY))
    } else {
        let generator_config = config.generator_config()?;
        create_generator(&generator_config).context("Failed to create generator")?
    };

    if !generator.is_available().await {
        anyhow::bail!(
            "Generator '{}' is not available. Check the provider configuration.",
            generator.name()
        );
    }

    let logger = Arc::new(match cli.log_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    });

    let settings = config.interview.clone();
    let idle_timeout = settings.idle_timeout();
    let mut coordinator = Coordinator::new(generator, settings).with_logger(logger.clone());

    let difficulty = cli.difficulty.map(DifficultyChoice::as_str);
    let introduction = coordinator
        .start(&cli.candidate, cli.role.as_deref(), difficulty)
        .await
        .context("Failed to start the interview")?;

    let writer = if cli.no_session_file {
        None
    } else {
        Some(SessionWriter::new(&cli.candidate).context("Failed to create session file")?)
    };
    if let Some(ref writer) = writer {
        let (provider, model) = coordinator.generator_info().unwrap_or_default();
        let context = coordinator.context();
        writer.write_start(&cli.candidate, &context.role, &context.difficulty, &provider, &model);
    }
    let mut recorder = Recorder {
        writer,
        entries: 0,
        submissions: 0,
    };
    recorder.flush(&coordinator);

    print_interviewer(&introduction);
    print_usage();

    if let Some(ref path) = cli.resume {
        let resume = read_file(&working_dir, path)?;
        match coordinator.discuss_resume(&resume).await {
            Ok(text) => print_interviewer(&text),
            Err(e) => eprintln!("{} {}", "Could not discuss the resume:".yellow(), e),
        }
        recorder.flush(&coordinator);
    }

    let registry = Arc::new(SessionRegistry::new(idle_timeout).with_logger(logger.clone()));
    let session_id = registry.create(coordinator);
    let handle: SessionHandle = registry.get(session_id)?;
    let sweeper = registry.clone().spawn_sweeper(sweep_period(idle_timeout));

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupt = Arc::new(Notify::new());
    let interrupt_flag = interrupted.clone();
    let interrupt_signal = interrupt.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted. Finishing the interview...");
        interrupt_flag.store(true, Ordering::SeqCst);
        interrupt_signal.notify_one();
    })
    .context("Failed to set Ctrl+C handler")?;

    let started = Instant::now();
    let outcome = loop {
        // A turn already in progress completes before the flag is seen
        if interrupted.load(Ordering::SeqCst) {
            break Outcome::Interrupted;
        }

        let turn = match next_turn(read_stdin_turn, &interrupt).await? {
            Input::Turn(turn) => turn,
            Input::EndOfInput => break Outcome::EndOfInput,
            Input::Interrupted => break Outcome::Interrupted,
        };

        // Touching the session keeps the sweeper away; a miss means it expired
        if registry.get(session_id).is_err() {
            eprintln!("{}", "The interview timed out.".yellow());
            break Outcome::TimedOut;
        }

        let command = match Command::parse(&turn) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e.to_string().yellow());
                continue;
            }
        };

        let mut coordinator = handle.lock().await;
        match command {
            Command::Say(text) => {
                let reply = coordinator.respond(&text).await;
                print_interviewer(&reply);
            }
            Command::Submit(path) => {
                let code = match read_file(&working_dir, &path) {
                    Ok(code) => code,
                    Err(e) => {
                        eprintln!("{} {:#}", "Could not read submission:".yellow(), e);
                        continue;
                    }
                };
                let language = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(language_for_extension)
                    .unwrap_or_else(|| detect_language(&code));
                let problem = coordinator.context().current_problem.clone().unwrap_or_default();
                match coordinator.evaluate_code(&code, &problem, Some(language)).await {
                    Ok(record) => {
                        print_interviewer(&record.feedback);
                        eprintln!("{}", record.short_description().dimmed());
                    }
                    Err(e) => eprintln!("{} {}", "Evaluation failed:".yellow(), e),
                }
            }
            Command::Resume(path) => {
                let resume = match read_file(&working_dir, &path) {
                    Ok(resume) => resume,
                    Err(e) => {
                        eprintln!("{} {:#}", "Could not read resume:".yellow(), e);
                        continue;
                    }
                };
                match coordinator.discuss_resume(&resume).await {
                    Ok(text) => print_interviewer(&text),
                    Err(e) => eprintln!("{} {}", "Could not discuss the resume:".yellow(), e),
                }
            }
            Command::Evaluate => {
                coordinator.final_evaluation().await?;
            }
            Command::Quit => break Outcome::Quit,
        }

        recorder.flush(&coordinator);
        if coordinator.final_record().is_some() {
            break Outcome::Completed;
        }
    };

    sweeper.abort();

    let mut coordinator = handle.lock().await;
    if coordinator.final_record().is_none() && !coordinator.is_closed() {
        coordinator.final_evaluation().await?;
    }
    recorder.flush(&coordinator);

    let duration_secs = started.elapsed().as_secs_f64();
    let summary = InterviewSummary {
        candidate: &cli.candidate,
        role: &coordinator.context().role,
        difficulty: &coordinator.context().difficulty,
        outcome,
        duration_secs,
        submissions: &coordinator.context().submissions,
        final_evaluation: coordinator.final_record(),
        session_file: recorder.writer.as_ref().map(SessionWriter::path),
    };

    if cli.json_output {
        let json = serde_json::to_string_pretty(&summary)?;
        println!("{}", json);
    } else {
        print_summary(&summary);
    }

    if let Some(ref writer) = recorder.writer {
        if let Some(record) = coordinator.final_record() {
            writer.write_final_evaluation(record);
        }
        writer.write_end(outcome.as_str(), recorder.entries, duration_secs);
    }
    drop(coordinator);

    if registry.contains(session_id) {
        registry.remove(session_id).await?;
    }
    drop(recorder);

    // An abandoned stdin read would otherwise hold runtime shutdown open
    std::process::exit(outcome.exit_code());
}

fn sweep_period(idle_timeout: Duration) -> Duration {
    idle_timeout.clamp(Duration::from_secs(1), Duration::from_secs(30))
}

fn read_file(working_dir: &Path, path: &Path) -> Result<String> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    };
    std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_interviewer(text: &str) {
    println!("\n{}\n{}\n", "Interviewer:".cyan().bold(), text.trim());
}

fn print_usage() {
    eprintln!(
        "{}",
        "End each reply with a blank line. Commands: /submit <file>, /resume <file>, /evaluate, /quit"
            .dimmed()
    );
}

fn print_summary(summary: &InterviewSummary) {
    eprintln!();
    eprintln!("{}", "Interview finished".bold());
    eprintln!("  Candidate:  {}", summary.candidate);
    eprintln!("  Role:       {} ({})", summary.role, summary.difficulty);
    eprintln!("  Outcome:    {}", summary.outcome.as_str());
    eprintln!("  Duration:   {:.0}s", summary.duration_secs);
    eprintln!("  Submissions: {}", summary.submissions.len());

    for (i, submission) in summary.submissions.iter().enumerate() {
        eprintln!(
            "    {}. [{}] {}",
            i + 1,
            submission.language.as_deref().unwrap_or("unknown"),
            submission.evaluation.short_description()
        );
    }

    if let Some(record) = summary.final_evaluation {
        let decision = match record.recommendation.decision {
            Some(decision) => decision.as_str(),
            None => "none",
        };
        let decision = match decision {
            "hire" => decision.green().bold(),
            "no_hire" => decision.red().bold(),
            _ => decision.yellow().bold(),
        };
        eprintln!("  Recommendation: {}", decision);
        eprintln!("  {}", record.short_description());
    }

    if let Some(path) = summary.session_file {
        eprintln!("  Session file: {}", path.display());
    }
}
