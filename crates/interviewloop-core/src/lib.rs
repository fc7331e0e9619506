//! # interviewloop-core
//!
//! The interview session state machine.
//!
//! ## Key Types
//!
//! - [`Coordinator`] - Routes each candidate response by the current stage
//! - [`StageController`] - Current stage, interview notes and stage prompts
//! - [`InterviewContext`] - Per-session state (background, problem, submissions)
//! - [`SessionRegistry`] - Live sessions with idle reclamation

mod context;
mod controller;
mod coordinator;
mod error;
pub mod heuristics;
mod prompts;
mod registry;
mod settings;
mod stage;
pub mod transcript;

pub use context::{CodeSubmission, InterviewContext};
pub use controller::{StageController, PROBLEM_MARKER};
pub use coordinator::{Coordinator, Route, APOLOGY, DEFAULT_TOPICS};
pub use error::InterviewError;
pub use prompts::InterviewPrompts;
pub use registry::{SessionHandle, SessionRegistry};
pub use settings::InterviewSettings;
pub use stage::InterviewStage;
pub use transcript::{Speaker, Transcript, TranscriptEntry};
