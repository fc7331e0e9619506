//! # interviewloop-evaluator
//!
//! Turns generated evaluation text into structured records. The model is asked
//! for a JSON block but its output is never trusted to contain one: the
//! [`extract`] module scrapes scores, complexity, lists and the hiring
//! recommendation from prose when no usable block is found.

mod code;
pub mod extract;
mod final_eval;
mod prompts;
mod records;

pub use code::{CodeEvaluationInput, CodeEvaluator};
pub use extract::FEEDBACK_PLACEHOLDER;
pub use final_eval::FinalEvaluator;
pub use prompts::EvaluationPrompts;
pub use records::{
    Confidence, EvaluationRecord, FinalEvaluationRecord, HireDecision, Recommendation,
    MAX_SUGGESTIONS,
};
