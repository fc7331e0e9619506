use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use crate::{CommandConfig, GenerationError, Generator, ProcessSpawner, Prompt};

/// Generator backed by a local CLI (e.g. `claude --print --`)
///
/// The flattened prompt is appended as the final positional argument and
/// stdout is returned as the generated text.
pub struct CommandGenerator {
    command: CommandConfig,
    model: String,
    timeout: Option<Duration>,
}

impl CommandGenerator {
    pub fn new(command: CommandConfig, model: String, timeout: Option<Duration>) -> Self {
        Self {
            command,
            model,
            timeout,
        }
    }
}

#[async_trait]
impl Generator for CommandGenerator {
    fn name(&self) -> &str {
        "command"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.command.binary)
            .arg("--version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let text = prompt.flattened();

        debug!(
            binary = %self.command.binary.display(),
            prompt_len = text.len(),
            "Executing command generator"
        );

        let mut args: Vec<&str> = self.command.args.iter().map(String::as_str).collect();
        args.push(&text);

        let output = ProcessSpawner::spawn(
            &self.command.binary,
            &args,
            self.command.working_dir.as_deref(),
            self.timeout,
        )
        .await?;

        info!(
            exit_code = output.exit_code,
            lines = output.stdout_lines(),
            duration_secs = output.duration.as_secs_f64(),
            "Command generator completed"
        );

        if !output.success() {
            return Err(GenerationError::ExecutionFailed(format!(
                "{} exited with code {}: {}",
                self.command.binary.display(),
                output.exit_code,
                output.stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}
