use async_trait::async_trait;
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default OpenAI-compatible API base
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default model name
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Errors that can occur during text generation
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("{provider}: missing API key")]
    MissingApiKey { provider: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Provider server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse provider response: {0}")]
    Parse(String),

    #[error("Provider returned no content")]
    EmptyResponse,

    #[error("Failed to spawn generator process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generation failed: {0}")]
    ExecutionFailed(String),

    #[error("Generator configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP {status}: {body}")]
    Other { status: u16, body: String },
}

/// A single generation request: optional system persona plus the request text
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: Option<String>,
    pub text: String,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            system: None,
            text: text.into(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// System persona and request text joined, for backends without roles
    pub fn flattened(&self) -> String {
        match self.system {
            Some(ref system) => format!("{}\n\n{}", system.trim(), self.text.trim()),
            None => self.text.clone(),
        }
    }
}

/// Supported generation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Azure,
    Command,
    Scripted,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Azure => write!(f, "azure"),
            ProviderKind::Command => write!(f, "command"),
            ProviderKind::Scripted => write!(f, "scripted"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "open-ai" => Ok(ProviderKind::OpenAi),
            "azure" | "azure-openai" => Ok(ProviderKind::Azure),
            "command" | "cli" => Ok(ProviderKind::Command),
            "scripted" | "script" | "replay" => Ok(ProviderKind::Scripted),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// Azure OpenAI deployment settings
#[derive(Debug, Clone)]
pub struct AzureConfig {
    pub api_version: String,
    pub deployment_name: String,
    pub resource_name: String,
}

/// Local command used as a generator (prompt is passed as the final argument)
#[derive(Debug, Clone)]
pub struct CommandConfig {
    pub binary: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl CommandConfig {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// Configuration for building a generator
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub provider: ProviderKind,
    /// API base URL (OpenAI-compatible providers)
    pub endpoint: String,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Per-request timeout (None = no limit)
    pub timeout: Option<Duration>,
    pub azure: Option<AzureConfig>,
    pub command: Option<CommandConfig>,
    /// Canned replies for the scripted provider
    pub script: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            timeout: None,
            azure: None,
            command: None,
            script: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_azure(mut self, azure: AzureConfig) -> Self {
        self.azure = Some(azure);
        self
    }

    pub fn with_command(mut self, command: CommandConfig) -> Self {
        self.command = Some(command);
        self
    }

    pub fn with_script<I, S>(mut self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script = replies.into_iter().map(Into::into).collect();
        self
    }
}

/// The text-generation collaborator: a prompt goes in, generated text comes out
#[async_trait]
pub trait Generator: Send + Sync {
    /// Human-readable name of the provider (e.g., "openai")
    fn name(&self) -> &str;

    /// Model identifier used for requests
    fn model(&self) -> &str;

    /// Generate text for the given prompt
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError>;

    /// Check whether the backend is reachable/installed
    async fn is_available(&self) -> bool {
        true
    }

    /// Release any held handles; the generator must not be used afterwards
    async fn close(&self) {}
}
