use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A text-generating model behind a single prompt-in, text-out call.
///
/// Implementations issue stateless requests and are shared across
/// concurrent profiling tasks.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,
    /// Temperature, 0 for greedy decoding
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY environment variable not set")?;

        Ok(Self::new(api_key, "claude-sonnet-4-20250514".to_string()))
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: 0.0,
            max_tokens: 500,
        }
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Send a single user message to Claude and get the text response
    pub async fn send_message(&self, user: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error: {} - {}", status, body);
        }

        let response: AnthropicResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        // Extract text from the first content block
        response
            .content
            .into_iter()
            .find(|c| c.content_type == "text")
            .map(|c| c.text)
            .context("No text content in response")
    }
}

#[async_trait]
impl LlmProvider for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Querying {} ({} prompt chars)", self.config.model, prompt.len());
        self.send_message(prompt).await
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";
const WATSONX_API_VERSION: &str = "2023-05-29";

/// Configuration for the watsonx.ai text generation client
#[derive(Debug, Clone)]
pub struct WatsonxConfig {
    pub api_key: String,
    /// Regional endpoint, e.g. "https://us-south.ml.cloud.ibm.com"
    pub url: String,
    pub project_id: String,
    pub model_id: String,
    pub parameters: WatsonxParameters,
}

/// Decoding parameters sent with every generation request
#[derive(Debug, Clone, Serialize)]
pub struct WatsonxParameters {
    pub decoding_method: String,
    pub max_new_tokens: u32,
    pub min_new_tokens: u32,
    pub stop_sequences: Vec<String>,
    pub repetition_penalty: f64,
}

impl Default for WatsonxParameters {
    fn default() -> Self {
        Self {
            decoding_method: "greedy".to_string(),
            max_new_tokens: 500,
            min_new_tokens: 0,
            stop_sequences: vec![],
            repetition_penalty: 1.0,
        }
    }
}

impl WatsonxConfig {
    /// Create config from WATSONX_API_KEY, WATSONX_URL and WATSONX_PROJECT_ID
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("WATSONX_API_KEY")
            .context("WATSONX_API_KEY environment variable not set")?;
        let url =
            std::env::var("WATSONX_URL").context("WATSONX_URL environment variable not set")?;
        let project_id = std::env::var("WATSONX_PROJECT_ID")
            .context("WATSONX_PROJECT_ID environment variable not set")?;

        Ok(Self {
            api_key,
            url: url.trim_end_matches('/').to_string(),
            project_id,
            model_id: "meta-llama/llama-3-70b-instruct".to_string(),
            parameters: WatsonxParameters::default(),
        })
    }
}

/// watsonx.ai client holding a bearer token obtained once at connect time
pub struct WatsonxClient {
    client: Client,
    config: WatsonxConfig,
    access_token: String,
}

impl WatsonxClient {
    /// Exchange the API key for an IAM access token and build the client
    pub async fn connect(config: WatsonxConfig) -> Result<Self> {
        let client = Client::new();

        let response = client
            .post(IAM_TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
                ("apikey", config.api_key.as_str()),
            ])
            .send()
            .await
            .context("Failed to request IAM token")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("IAM token error: {} - {}", status, body);
        }

        let token: IamToken = response
            .json()
            .await
            .context("Failed to parse IAM token response")?;

        Ok(Self {
            client,
            config,
            access_token: token.access_token,
        })
    }
}

#[async_trait]
impl LlmProvider for WatsonxClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            "Querying {} ({} prompt chars)",
            self.config.model_id,
            prompt.len()
        );

        let request = GenerationRequest {
            model_id: &self.config.model_id,
            input: prompt,
            parameters: &self.config.parameters,
            project_id: &self.config.project_id,
        };

        let response = self
            .client
            .post(format!("{}/ml/v1/text/generation", self.config.url))
            .query(&[("version", WATSONX_API_VERSION)])
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to watsonx.ai")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("watsonx.ai error: {} - {}", status, body);
        }

        let response: GenerationResponse = response
            .json()
            .await
            .context("Failed to parse watsonx.ai response")?;

        response
            .results
            .into_iter()
            .next()
            .map(|r| r.generated_text)
            .context("No generated text in response")
    }
}

#[derive(Debug, Deserialize)]
struct IamToken {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model_id: &'a str,
    input: &'a str,
    parameters: &'a WatsonxParameters,
    project_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    results: Vec<GenerationResult>,
}

#[derive(Debug, Deserialize)]
struct GenerationResult {
    generated_text: String,
}
