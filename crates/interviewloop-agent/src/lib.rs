//! # interviewloop-agent
//!
//! The text-generation collaborator used by the interview core: a [`Generator`]
//! turns a [`Prompt`] into text. Providers are selected through
//! [`GeneratorConfig`] and built by [`create_generator`].

mod command;
mod openai;
mod output;
mod scripted;
mod spawner;
mod traits;

pub use command::CommandGenerator;
pub use openai::{parse_http_error, OpenAiGenerator};
pub use output::CommandOutput;
pub use scripted::ScriptedGenerator;
pub use spawner::ProcessSpawner;
pub use traits::{
    AzureConfig, CommandConfig, GenerationError, Generator, GeneratorConfig, Prompt,
    ProviderKind, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};

/// Create a generator from its configuration
pub fn create_generator(config: &GeneratorConfig) -> Result<Box<dyn Generator>, GenerationError> {
    match config.provider {
        ProviderKind::OpenAi | ProviderKind::Azure => {
            Ok(Box::new(OpenAiGenerator::new(config.clone())?))
        }
        ProviderKind::Command => {
            let command = config.command.clone().ok_or_else(|| {
                GenerationError::ConfigError("command provider requires a binary".to_string())
            })?;
            Ok(Box::new(CommandGenerator::new(
                command,
                config.model.clone(),
                config.timeout,
            )))
        }
        ProviderKind::Scripted => Ok(Box::new(ScriptedGenerator::new(config.script.clone()))),
    }
}
