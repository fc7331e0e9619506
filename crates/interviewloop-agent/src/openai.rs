//! OpenAI-compatible chat completions provider.
//!
//! Serves both the public OpenAI API (Bearer auth against `{endpoint}/chat/completions`)
//! and Azure OpenAI deployments (`api-key` header against the deployment URL).

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;

use crate::{GenerationError, Generator, GeneratorConfig, Prompt, ProviderKind};

/// OpenAI / Azure OpenAI generator
pub struct OpenAiGenerator {
    config: GeneratorConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        if config.api_key.is_none() {
            return Err(GenerationError::MissingApiKey {
                provider: config.provider.to_string(),
            });
        }
        if config.provider == ProviderKind::Azure && config.azure.is_none() {
            return Err(GenerationError::ConfigError(
                "azure provider requires api version, deployment and resource name".to_string(),
            ));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GenerationError::ConfigError(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Resolve the completions URL for the configured provider
    pub fn url(&self) -> String {
        match (&self.config.provider, &self.config.azure) {
            (ProviderKind::Azure, Some(azure)) => format!(
                "https://{}.openai.azure.com/openai/deployments/{}/chat/completions?api-version={}",
                azure.resource_name, azure.deployment_name, azure.api_version
            ),
            _ => format!(
                "{}/chat/completions",
                self.config.endpoint.trim_end_matches('/')
            ),
        }
    }

    /// Build the request body for the API
    pub fn build_request_body(&self, prompt: &Prompt) -> serde_json::Value {
        let mut messages = Vec::new();
        if let Some(ref system) = prompt.system {
            messages.push(serde_json::json!({
                "role": "system",
                "content": system
            }));
        }
        messages.push(serde_json::json!({
            "role": "user",
            "content": prompt.text
        }));

        let mut body = serde_json::json!({
            "messages": messages,
            "temperature": self.config.temperature,
        });

        // Azure selects the model through the deployment name
        if self.config.provider != ProviderKind::Azure {
            body["model"] = serde_json::json!(self.config.model);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    fn parse_response(body: &str) -> Result<String, GenerationError> {
        let response: ChatResponse = serde_json::from_str(body)
            .map_err(|e| GenerationError::Parse(format!("Failed to parse response: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or(GenerationError::EmptyResponse)
    }
}

/// Map a non-success HTTP status to a generation error
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> GenerationError {
    match status {
        401 => GenerationError::AuthenticationFailed(format!("{}: Invalid API key", provider)),
        403 => GenerationError::AuthenticationFailed(format!("{}: Access denied", provider)),
        404 => GenerationError::ModelNotFound(body.to_string()),
        429 => GenerationError::RateLimited(body.to_string()),
        400 => GenerationError::InvalidRequest(body.to_string()),
        500..=599 => GenerationError::ServerError {
            status,
            message: body.to_string(),
        },
        _ => GenerationError::Other {
            status,
            body: body.to_string(),
        },
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    fn name(&self) -> &str {
        match self.config.provider {
            ProviderKind::Azure => "azure",
            _ => "openai",
        }
    }

    fn model(&self) -> &str {
        match (&self.config.provider, &self.config.azure) {
            (ProviderKind::Azure, Some(azure)) => &azure.deployment_name,
            _ => &self.config.model,
        }
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| GenerationError::MissingApiKey {
                provider: self.name().to_string(),
            })?;

        let body = self.build_request_body(prompt);

        debug!(
            provider = self.name(),
            model = self.model(),
            prompt_len = prompt.text.len(),
            "Sending completion request"
        );

        let mut request = self
            .client
            .post(self.url())
            .header("Content-Type", "application/json");
        request = match self.config.provider {
            ProviderKind::Azure => request.header("api-key", api_key.expose_secret()),
            _ => request.header(
                "Authorization",
                format!("Bearer {}", api_key.expose_secret()),
            ),
        };

        let response = request.json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout(self.config.timeout.unwrap_or_default())
            } else {
                GenerationError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body_text = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(parse_http_error(status, &body_text, self.name()));
        }

        let content = Self::parse_response(&body_text)?;
        debug!(response_len = content.len(), "Completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AzureConfig;

    fn openai() -> OpenAiGenerator {
        OpenAiGenerator::new(
            GeneratorConfig::new(ProviderKind::OpenAi)
                .with_api_key("sk-test")
                .with_endpoint("https://llm.internal/v1/")
                .with_model("gpt-4o"),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let result = OpenAiGenerator::new(GeneratorConfig::new(ProviderKind::OpenAi));
        assert!(matches!(
            result,
            Err(GenerationError::MissingApiKey { .. })
        ));
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        assert_eq!(openai().url(), "https://llm.internal/v1/chat/completions");
    }

    #[test]
    fn test_azure_url_and_model() {
        let generator = OpenAiGenerator::new(
            GeneratorConfig::new(ProviderKind::Azure)
                .with_api_key("azure-key")
                .with_azure(AzureConfig {
                    api_version: "2024-02-01".into(),
                    deployment_name: "interviewer".into(),
                    resource_name: "acme".into(),
                }),
        )
        .unwrap();
        assert_eq!(
            generator.url(),
            "https://acme.openai.azure.com/openai/deployments/interviewer/chat/completions?api-version=2024-02-01"
        );
        assert_eq!(generator.model(), "interviewer");
        let body = generator.build_request_body(&Prompt::new("hi"));
        assert!(body.get("model").is_none());
    }

    #[test]
    fn test_azure_without_deployment_is_config_error() {
        let result =
            OpenAiGenerator::new(GeneratorConfig::new(ProviderKind::Azure).with_api_key("k"));
        assert!(matches!(result, Err(GenerationError::ConfigError(_))));
    }

    #[test]
    fn test_request_body_includes_system_message() {
        let body = openai()
            .build_request_body(&Prompt::new("Present a problem").with_system("persona"));
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "persona");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Present a problem");
    }

    #[test]
    fn test_parse_response_takes_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hello there"}}]}"#;
        assert_eq!(OpenAiGenerator::parse_response(body).unwrap(), "Hello there");
    }

    #[test]
    fn test_parse_response_without_content() {
        let body = r#"{"choices":[]}"#;
        assert!(matches!(
            OpenAiGenerator::parse_response(body),
            Err(GenerationError::EmptyResponse)
        ));
        assert!(matches!(
            OpenAiGenerator::parse_response("not json"),
            Err(GenerationError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_http_error_classification() {
        assert!(matches!(
            parse_http_error(401, "", "openai"),
            GenerationError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            parse_http_error(429, "slow down", "openai"),
            GenerationError::RateLimited(_)
        ));
        assert!(matches!(
            parse_http_error(503, "down", "openai"),
            GenerationError::ServerError { status: 503, .. }
        ));
        assert!(matches!(
            parse_http_error(418, "teapot", "openai"),
            GenerationError::Other { status: 418, .. }
        ));
    }
}
