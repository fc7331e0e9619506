use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Structured log events for an interview session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    InterviewStarted {
        candidate: String,
        role: String,
        difficulty: String,
        provider: String,
        model: String,
    },
    StageEntered {
        stage: String,
    },
    CandidateResponded {
        stage: String,
        chars: usize,
        looks_like_code: bool,
    },
    CodeEvaluated {
        language: String,
        correctness: Option<u8>,
        code_quality: Option<u8>,
        time_complexity: Option<String>,
    },
    InterviewConcluded {
        decision: Option<String>,
        overall_rating: Option<u8>,
        duration_secs: f64,
    },
    GenerationFailed {
        stage: String,
        error: String,
    },
    SessionClosed {
        session_id: String,
        reason: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for interview events - console output plus optional JSON lines file
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        let line = match self.format {
            LogFormat::Json => serde_json::to_string(event).ok(),
            LogFormat::Pretty => Self::render_pretty(event),
            LogFormat::Compact => Some(Self::render_compact(
                event,
                &chrono::Utc::now().format("%H:%M:%S").to_string(),
            )),
        };
        if let Some(line) = line {
            let _ = writeln!(std::io::stderr(), "{}", line);
        }
    }

    fn render_pretty(event: &LogEvent) -> Option<String> {
        let line = match event {
            LogEvent::InterviewStarted {
                candidate,
                role,
                difficulty,
                provider,
                model,
            } => format!(
                "{} {} {} {}\n  {} {}",
                "●".bright_blue(),
                "Interview".bold().bright_white(),
                Self::truncate(candidate, 40).bright_white(),
                format!("({}, {})", role, difficulty).dimmed(),
                "Model:".dimmed(),
                format!("{}/{}", provider, model).dimmed()
            ),
            LogEvent::StageEntered { stage } => format!(
                "  {} {}",
                "▶".bright_cyan(),
                stage.to_uppercase().bright_cyan().bold()
            ),
            LogEvent::CandidateResponded { .. } => {
                // Debug detail, shown by json/compact only
                return None;
            }
            LogEvent::CodeEvaluated {
                language,
                correctness,
                code_quality,
                time_complexity,
            } => format!(
                "    {} Code evaluated ({}): correctness {}, quality {}, time {}",
                "✓".bright_green(),
                language,
                Self::score(*correctness),
                Self::score(*code_quality),
                time_complexity.as_deref().unwrap_or("-")
            ),
            LogEvent::InterviewConcluded {
                decision,
                overall_rating,
                duration_secs,
            } => {
                let decision = decision.as_deref().unwrap_or("none");
                let styled = match decision {
                    "hire" => decision.bright_green().bold(),
                    "no_hire" => decision.bright_red().bold(),
                    _ => decision.bright_yellow().bold(),
                };
                format!(
                    "{} Interview concluded: {} (overall {}) in {:.1}s",
                    "■".bright_blue(),
                    styled,
                    Self::score(*overall_rating),
                    duration_secs
                )
            }
            LogEvent::GenerationFailed { stage, error } => format!(
                "{} Generation failed during {}: {}",
                "✗".bright_red(),
                stage,
                error.bright_red()
            ),
            LogEvent::SessionClosed { session_id, reason } => format!(
                "{} Session {} closed ({})",
                "⚠".bright_yellow(),
                Self::truncate(session_id, 8),
                reason
            ),
        };
        Some(line)
    }

    fn render_compact(event: &LogEvent, timestamp: &str) -> String {
        match event {
            LogEvent::InterviewStarted {
                candidate, model, ..
            } => format!("[{}] interview:start {} model={}", timestamp, candidate, model),
            LogEvent::StageEntered { stage } => format!("[{}] stage:{}", timestamp, stage),
            LogEvent::CandidateResponded {
                stage,
                chars,
                looks_like_code,
            } => format!(
                "[{}] candidate:{} chars={} code={}",
                timestamp, stage, chars, looks_like_code
            ),
            LogEvent::CodeEvaluated {
                language,
                correctness,
                ..
            } => format!(
                "[{}] code:{} correctness={}",
                timestamp,
                language,
                Self::score(*correctness)
            ),
            LogEvent::InterviewConcluded {
                decision,
                duration_secs,
                ..
            } => format!(
                "[{}] interview:done {} {:.1}s",
                timestamp,
                decision.as_deref().unwrap_or("none"),
                duration_secs
            ),
            LogEvent::GenerationFailed { stage, error } => {
                format!("[{}] error:{}:{}", timestamp, stage, error)
            }
            LogEvent::SessionClosed { session_id, reason } => {
                format!("[{}] session:closed {} {}", timestamp, session_id, reason)
            }
        }
    }

    fn score(score: Option<u8>) -> String {
        score.map_or_else(|| "-".to_string(), |s| format!("{}/10", s))
    }

    fn truncate(s: &str, max_chars: usize) -> String {
        if s.chars().count() <= max_chars {
            return s.to_string();
        }
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
