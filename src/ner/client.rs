use std::future::Future;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{build_entity_prompt, locate_entities, EntityRecognizer, ENTITY_LABELS, ENTITY_SYSTEM_PROMPT};
use crate::models::RecognizedEntity;

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (ANTHROPIC_MODEL env var, optional)
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY environment variable not set")?;
        let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, model))
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: 0.0,
            max_tokens: 4096,
        }
    }
}

/// An entity as reported by the model, before it is placed in the transcript
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedEntity {
    pub text: String,
    pub label: String,
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

    /// Ask the model for the named entities in one transcript via forced tool use
    pub async fn extract_entities(&self, transcript: &str) -> Result<Vec<ExtractedEntity>> {
        let tool = Tool {
            name: "submit_entities".to_string(),
            description: "Submit every named entity found in the transcript, in order of appearance"
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "entities": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "text": {
                                    "type": "string",
                                    "description": "The entity exactly as written in the transcript"
                                },
                                "label": {"type": "string", "enum": ENTITY_LABELS}
                            },
                            "required": ["text", "label"]
                        }
                    }
                },
                "required": ["entities"]
            }),
        };

        let request = AnthropicToolRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(ENTITY_SYSTEM_PROMPT.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: build_entity_prompt(transcript),
            }],
            tools: vec![tool],
            tool_choice: Some(ToolChoice {
                choice_type: "tool".to_string(),
                name: "submit_entities".to_string(),
            }),
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

        // Find the tool_use content block
        for content in &response.content {
            if content.content_type == "tool_use" && content.name.as_deref() == Some("submit_entities")
            {
                if let Some(input) = &content.input {
                    let submitted: EntityToolInput = serde_json::from_value(input.clone())
                        .context("Failed to parse tool input as entity list")?;
                    return Ok(submitted.entities);
                }
            }
        }

        anyhow::bail!("No tool_use response found")
    }
}

/// Entity recognition backed by the Anthropic Messages API
pub struct AnthropicRecognizer {
    client: AnthropicClient,
}

impl AnthropicRecognizer {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: AnthropicClient::new(config),
        }
    }
}

impl EntityRecognizer for AnthropicRecognizer {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn recognize(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<RecognizedEntity>>>> {
        async move {
            let mut results = Vec::with_capacity(texts.len());
            for (index, text) in texts.iter().enumerate() {
                if text.trim().is_empty() {
                    results.push(Vec::new());
                    continue;
                }
                let extracted = self
                    .client
                    .extract_entities(text)
                    .await
                    .with_context(|| format!("Entity extraction failed for transcript {}", index))?;
                debug!("Transcript {}: {} entities reported", index, extracted.len());
                let found = extracted.into_iter().map(|e| (e.text, e.label)).collect();
                results.push(locate_entities(text, found));
            }
            Ok(results)
        }
    }
}

#[derive(Debug, Deserialize)]
struct EntityToolInput {
    #[serde(default)]
    entities: Vec<ExtractedEntity>,
}

#[derive(Debug, Serialize)]
struct AnthropicToolRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: String,
    name: String,
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
    name: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}
