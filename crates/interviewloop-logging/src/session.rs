use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::warn;

/// Represents each line type in the session JSONL file.
///
/// Transcript entries and evaluation records are stored as plain JSON values so
/// this crate stays independent of the interview types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionLine {
    SessionStart {
        timestamp: DateTime<Utc>,
        candidate: String,
        role: String,
        difficulty: String,
        provider: String,
        model: String,
    },
    TranscriptEntry {
        index: usize,
        entry: Value,
        timestamp: DateTime<Utc>,
    },
    CodeEvaluation {
        language: Option<String>,
        evaluation: Value,
        timestamp: DateTime<Utc>,
    },
    FinalEvaluation {
        evaluation: Value,
        timestamp: DateTime<Utc>,
    },
    SessionEnd {
        outcome: String,
        entries: usize,
        duration_secs: f64,
        timestamp: DateTime<Utc>,
    },
}

/// Writes an interview as JSONL to a file in ~/.local/share/interviewloop/sessions/.
pub struct SessionWriter {
    file: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl SessionWriter {
    /// Create a writer in the user data directory. The file name is the current
    /// UTC timestamp plus a short hash of the candidate name.
    pub fn new(candidate: &str) -> io::Result<Self> {
        Self::with_dir(&Self::sessions_dir()?, candidate)
    }

    /// Create a writer in an explicit directory
    pub fn with_dir(sessions_dir: &Path, candidate: &str) -> io::Result<Self> {
        fs::create_dir_all(sessions_dir)?;

        let path = sessions_dir.join(Self::file_name(Utc::now(), candidate));
        let file = File::create(&path)?;

        Ok(Self {
            file: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    /// Returns the path to the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_start(
        &self,
        candidate: &str,
        role: &str,
        difficulty: &str,
        provider: &str,
        model: &str,
    ) {
        self.write_line(&SessionLine::SessionStart {
            timestamp: Utc::now(),
            candidate: candidate.to_string(),
            role: role.to_string(),
            difficulty: difficulty.to_string(),
            provider: provider.to_string(),
            model: model.to_string(),
        });
    }

    pub fn write_entry<T: Serialize>(&self, index: usize, entry: &T) {
        if let Some(entry) = Self::to_value(entry) {
            self.write_line(&SessionLine::TranscriptEntry {
                index,
                entry,
                timestamp: Utc::now(),
            });
        }
    }

    pub fn write_code_evaluation<T: Serialize>(&self, language: Option<&str>, evaluation: &T) {
        if let Some(evaluation) = Self::to_value(evaluation) {
            self.write_line(&SessionLine::CodeEvaluation {
                language: language.map(String::from),
                evaluation,
                timestamp: Utc::now(),
            });
        }
    }

    pub fn write_final_evaluation<T: Serialize>(&self, evaluation: &T) {
        if let Some(evaluation) = Self::to_value(evaluation) {
            self.write_line(&SessionLine::FinalEvaluation {
                evaluation,
                timestamp: Utc::now(),
            });
        }
    }

    /// Write the session end line.
    pub fn write_end(&self, outcome: &str, entries: usize, duration_secs: f64) {
        self.write_line(&SessionLine::SessionEnd {
            outcome: outcome.to_string(),
            entries,
            duration_secs,
            timestamp: Utc::now(),
        });
    }

    fn to_value<T: Serialize>(value: &T) -> Option<Value> {
        match serde_json::to_value(value) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "Skipping unserializable session line");
                None
            }
        }
    }

    fn write_line(&self, line: &SessionLine) {
        if let Ok(json) = serde_json::to_string(line) {
            if let Ok(mut writer) = self.file.lock() {
                let _ = writeln!(writer, "{}", json);
                let _ = writer.flush();
            }
        }
    }

    fn file_name(now: DateTime<Utc>, candidate: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(candidate.as_bytes());
        let hash = hex::encode(hasher.finalize());

        format!("{}_{}.jsonl", now.format("%Y-%m-%dT%H-%M-%SZ"), &hash[..6])
    }

    fn sessions_dir() -> io::Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine data directory",
            )
        })?;
        Ok(data_dir.join("interviewloop").join("sessions"))
    }
}
