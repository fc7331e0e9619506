//! Configuration for interviewloop.
//!
//! Values come from `interviewloop.toml` in the working directory, then the
//! environment (after loading `.env`), then command line flags. Later sources win.

use anyhow::{bail, Context, Result};
use interviewloop_agent::{AzureConfig, CommandConfig, GeneratorConfig, ProviderKind};
use interviewloop_core::InterviewSettings;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "interviewloop.toml";

/// Configuration loaded from `interviewloop.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// `openai`, `azure`, `command` or `scripted`
    pub provider: Option<String>,
    /// OpenAI-compatible API base URL
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub azure: AzureSection,
    pub command: Option<CommandSection>,
    /// Canned replies for the scripted provider
    #[serde(default)]
    pub script: Vec<String>,
    #[serde(default)]
    pub interview: InterviewSettings,
    /// Only ever set from the environment or flags
    #[serde(skip)]
    pub api_key: Option<SecretString>,
}

/// Azure OpenAI deployment
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AzureSection {
    pub api_version: Option<String>,
    pub deployment_name: Option<String>,
    pub resource_name: Option<String>,
}

/// Local command used as the generator
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSection {
    pub binary: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

/// Values that replace file configuration, from the environment or the CLI
#[derive(Debug, Default)]
pub struct Overrides {
    pub provider: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub azure_api_version: Option<String>,
    pub azure_deployment_name: Option<String>,
    pub azure_resource_name: Option<String>,
    pub max_interview_duration: Option<u64>,
    pub difficulty: Option<String>,
}

impl Overrides {
    /// Read overrides from the process environment, loading `.env` first
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let max_interview_duration = get("MAX_INTERVIEW_DURATION")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("MAX_INTERVIEW_DURATION is not a number: {}", raw))
            })
            .transpose()?;

        Ok(Self {
            provider: get("MODEL_PROVIDER"),
            endpoint: get("MODEL_ENDPOINT"),
            model: get("MODEL_NAME"),
            api_key: get("OPENAI_API_KEY"),
            temperature: None,
            azure_api_version: get("AZURE_API_VERSION"),
            azure_deployment_name: get("AZURE_DEPLOYMENT_NAME"),
            azure_resource_name: get("AZURE_RESOURCE_NAME"),
            max_interview_duration,
            difficulty: get("DEFAULT_INTERVIEW_DIFFICULTY"),
        })
    }
}

impl AppConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Replace every value the overrides carry
    pub fn apply(&mut self, overrides: Overrides) {
        fn set<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut self.provider, overrides.provider);
        set(&mut self.endpoint, overrides.endpoint);
        set(&mut self.model, overrides.model);
        set(&mut self.temperature, overrides.temperature);
        set(&mut self.azure.api_version, overrides.azure_api_version);
        set(&mut self.azure.deployment_name, overrides.azure_deployment_name);
        set(&mut self.azure.resource_name, overrides.azure_resource_name);
        set(
            &mut self.api_key,
            overrides.api_key.map(SecretString::from),
        );
        if let Some(secs) = overrides.max_interview_duration {
            self.interview.max_interview_duration_secs = secs;
        }
        if let Some(difficulty) = overrides.difficulty {
            self.interview.default_difficulty = difficulty;
        }
    }

    /// Provider to use. Without an explicit choice, a configured Azure
    /// api version selects Azure, otherwise OpenAI.
    pub fn provider(&self) -> Result<ProviderKind> {
        match self.provider {
            Some(ref name) => name.parse::<ProviderKind>().map_err(anyhow::Error::msg),
            None if self.azure.api_version.is_some() => Ok(ProviderKind::Azure),
            None => Ok(ProviderKind::OpenAi),
        }
    }

    /// Build the generator configuration
    pub fn generator_config(&self) -> Result<GeneratorConfig> {
        let provider = self.provider()?;
        let mut config = GeneratorConfig::new(provider);

        if let Some(ref endpoint) = self.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        if let Some(ref model) = self.model {
            config = config.with_model(model.clone());
        }
        if let Some(temperature) = self.temperature {
            config = config.with_temperature(temperature);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config.max_tokens = self.max_tokens;
        config.api_key = self.api_key.clone();

        match provider {
            ProviderKind::Azure => {
                let (Some(api_version), Some(deployment_name), Some(resource_name)) = (
                    self.azure.api_version.clone(),
                    self.azure.deployment_name.clone(),
                    self.azure.resource_name.clone(),
                ) else {
                    bail!(
                        "Azure provider needs AZURE_API_VERSION, AZURE_DEPLOYMENT_NAME and AZURE_RESOURCE_NAME"
                    );
                };
                config = config.with_azure(AzureConfig {
                    api_version,
                    deployment_name,
                    resource_name,
                });
            }
            ProviderKind::Command => {
                let Some(ref command) = self.command else {
                    bail!("Command provider needs a [command] section in {}", CONFIG_FILE_NAME);
                };
                let mut command_config =
                    CommandConfig::new(command.binary.clone()).with_args(command.args.clone());
                command_config.working_dir = command.working_dir.clone();
                config = config.with_command(command_config);
            }
            ProviderKind::Scripted => {
                config = config.with_script(self.script.clone());
            }
            ProviderKind::OpenAi => {}
        }

        Ok(config)
    }
}
