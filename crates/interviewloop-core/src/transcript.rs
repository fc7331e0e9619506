use serde::{Deserialize, Serialize};

use crate::InterviewStage;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    #[default]
    Interviewer,
    Candidate,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Interviewer => "Interviewer",
            Speaker::Candidate => "Candidate",
        }
    }
}

/// One line of interview notes. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub stage: InterviewStage,
    #[serde(default)]
    pub speaker: Speaker,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_statement: Option<String>,
}

impl TranscriptEntry {
    pub fn interviewer(stage: InterviewStage, content: impl Into<String>) -> Self {
        Self {
            stage,
            speaker: Speaker::Interviewer,
            content: content.into(),
            problem_statement: None,
        }
    }

    pub fn candidate(stage: InterviewStage, content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Candidate,
            ..Self::interviewer(stage, content)
        }
    }

    pub fn with_problem_statement(mut self, problem_statement: impl Into<String>) -> Self {
        self.problem_statement = Some(problem_statement.into());
        self
    }

    /// `Speaker: content`, as shown to the model
    pub fn render(&self) -> String {
        format!("{}: {}", self.speaker.label(), self.content)
    }
}

/// Append-only, ordered interview notes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<TranscriptEntry> {
        self.entries
    }
}

/// The last `n` entries (all of them when there are fewer)
pub fn recent(entries: &[TranscriptEntry], n: usize) -> &[TranscriptEntry] {
    &entries[entries.len().saturating_sub(n)..]
}

/// The most recent problem the interviewer presented
pub fn current_problem(entries: &[TranscriptEntry]) -> Option<&str> {
    entries
        .iter()
        .rev()
        .find(|entry| {
            entry.stage == InterviewStage::CodingProblem && entry.speaker == Speaker::Interviewer
        })
        .map(|entry| entry.content.as_str())
}

/// Entries rendered one per line
pub fn conversation(entries: &[TranscriptEntry]) -> String {
    entries
        .iter()
        .map(TranscriptEntry::render)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut transcript = Transcript::new();
        let entries: Vec<TranscriptEntry> = (0..5)
            .map(|i| TranscriptEntry::interviewer(InterviewStage::TechnicalQuestions, format!("q{}", i)))
            .collect();
        for entry in &entries {
            transcript.push(entry.clone());
        }
        assert_eq!(transcript.entries(), entries.as_slice());
        assert_eq!(transcript.len(), 5);
    }

    #[test]
    fn test_recent_handles_short_transcripts() {
        let entries = vec![
            TranscriptEntry::interviewer(InterviewStage::Introduction, "a"),
            TranscriptEntry::candidate(InterviewStage::Introduction, "b"),
        ];
        assert_eq!(recent(&entries, 4).len(), 2);
        assert_eq!(recent(&entries, 1)[0].content, "b");
        assert!(recent(&entries, 0).is_empty());
    }

    #[test]
    fn test_current_problem_ignores_candidate_entries() {
        let entries = vec![
            TranscriptEntry::interviewer(InterviewStage::CodingProblem, "Problem: two sum"),
            TranscriptEntry::candidate(InterviewStage::CodingProblem, "can I use a map?"),
        ];
        assert_eq!(current_problem(&entries), Some("Problem: two sum"));

        let later = [
            entries.clone(),
            vec![TranscriptEntry::interviewer(
                InterviewStage::CodingProblem,
                "Problem: merge intervals",
            )],
        ]
        .concat();
        assert_eq!(current_problem(&later), Some("Problem: merge intervals"));
        assert_eq!(current_problem(&entries[1..]), None);
    }

    #[test]
    fn test_serialized_entry_shape() {
        let entry = TranscriptEntry::interviewer(InterviewStage::CodeEvaluation, "Looks correct")
            .with_problem_statement("Reverse a list");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["stage"], "code_evaluation");
        assert_eq!(json["speaker"], "interviewer");
        assert_eq!(json["problem_statement"], "Reverse a list");

        let plain: TranscriptEntry =
            serde_json::from_str(r#"{"stage": "introduction", "content": "Hi"}"#).unwrap();
        assert_eq!(plain.speaker, Speaker::Interviewer);
        assert!(serde_json::to_value(&plain).unwrap().get("problem_statement").is_none());
    }

    #[test]
    fn test_conversation_labels_speakers() {
        let entries = vec![
            TranscriptEntry::interviewer(InterviewStage::Introduction, "Welcome"),
            TranscriptEntry::candidate(InterviewStage::Introduction, "Thanks"),
        ];
        assert_eq!(conversation(&entries), "Interviewer: Welcome\nCandidate: Thanks");
    }
}
