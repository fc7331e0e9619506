use interviewloop_agent::GenerationError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum InterviewError {
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Interview session has been closed")]
    SessionClosed,

    #[error("Unknown interview session: {0}")]
    UnknownSession(Uuid),

    #[error("Configuration error: {0}")]
    Config(String),
}
