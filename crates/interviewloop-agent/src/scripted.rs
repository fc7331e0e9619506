use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::{GenerationError, Generator, Prompt};

#[derive(Debug)]
enum Reply {
    Text(String),
    Failure(String),
}

#[derive(Debug, Default)]
struct ScriptState {
    replies: VecDeque<Reply>,
    prompts: Vec<Prompt>,
    fallback: Option<String>,
    closed: bool,
}

/// Generator that replays canned replies in order.
///
/// Used for offline rehearsals (`--dry-run`) and as a deterministic stand-in
/// for a real provider. Clones share the same script, so a caller can keep a
/// handle to inspect the prompts that were sent.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGenerator {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let generator = Self::default();
        for reply in replies {
            generator.push_reply(reply);
        }
        generator
    }

    /// Reply returned once the script runs out (otherwise exhaustion is an error)
    pub fn with_fallback(self, text: impl Into<String>) -> Self {
        self.lock().fallback = Some(text.into());
        self
    }

    pub fn push_reply(&self, text: impl Into<String>) {
        self.lock().replies.push_back(Reply::Text(text.into()));
    }

    /// Queue a transient provider failure
    pub fn push_failure(&self, message: impl Into<String>) {
        self.lock().replies.push_back(Reply::Failure(message.into()));
    }

    /// Every prompt received so far, in order
    pub fn prompts(&self) -> Vec<Prompt> {
        self.lock().prompts.clone()
    }

    pub fn remaining(&self) -> usize {
        self.lock().replies.len()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "script"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let mut state = self.lock();
        if state.closed {
            return Err(GenerationError::ExecutionFailed(
                "scripted generator is closed".to_string(),
            ));
        }
        state.prompts.push(prompt.clone());

        let reply = state.replies.pop_front();
        debug!(remaining = state.replies.len(), "Scripted reply");
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Failure(message)) => Err(GenerationError::Network(message)),
            None => state.fallback.clone().ok_or_else(|| {
                GenerationError::ExecutionFailed("script exhausted".to_string())
            }),
        }
    }

    async fn close(&self) {
        self.lock().closed = true;
    }
}
