use std::future::Future;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::EntityRecognizer;
use crate::models::RecognizedEntity;

/// Configuration for an HTTP entity-recognition service
#[derive(Debug, Clone)]
pub struct HttpNerConfig {
    /// Endpoint accepting `{"texts": [...]}`
    pub url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl HttpNerConfig {
    /// Use `url` if given, otherwise the NER_SERVICE_URL environment variable
    pub fn from_env_or(url: Option<String>) -> Result<Self> {
        let url = match url {
            Some(url) => url,
            None => std::env::var("NER_SERVICE_URL")
                .context("No --ner-url given and NER_SERVICE_URL environment variable not set")?,
        };

        Ok(Self {
            url,
            timeout: Duration::from_secs(300),
        })
    }
}

/// Entity recognition through a spaCy-style HTTP service
///
/// The whole batch is sent in one request; the service answers with one
/// entity list per text.
pub struct HttpRecognizer {
    client: Client,
    config: HttpNerConfig,
}

impl HttpRecognizer {
    pub fn new(config: HttpNerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }
}

impl EntityRecognizer for HttpRecognizer {
    fn name(&self) -> &str {
        "http"
    }

    fn recognize(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<RecognizedEntity>>>> {
        async move {
            let response = self
                .client
                .post(&self.config.url)
                .json(&NerRequest { texts })
                .send()
                .await
                .with_context(|| format!("Failed to send request to {}", self.config.url))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("NER service error: {} - {}", status, body);
            }

            let response: NerResponse = response
                .json()
                .await
                .context("Failed to parse NER service response")?;

            ensure!(
                response.documents.len() == texts.len(),
                "NER service returned {} documents for {} texts",
                response.documents.len(),
                texts.len()
            );

            Ok(response.documents)
        }
    }
}

#[derive(Debug, Serialize)]
struct NerRequest<'a> {
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
struct NerResponse {
    documents: Vec<Vec<RecognizedEntity>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parses() {
        let json = r#"{
            "documents": [
                [{"text": "Robarts", "label": "ORG", "start_char": 12, "end_char": 19}],
                []
            ]
        }"#;

        let response: NerResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.documents.len(), 2);
        assert_eq!(response.documents[0][0].label, "ORG");
        assert_eq!(response.documents[0][0].end_char, 19);
    }

    #[test]
    fn test_request_serializes_texts() {
        let texts = vec!["chat_patron:hi ".to_string()];
        let json = serde_json::to_string(&NerRequest { texts: &texts }).unwrap();
        assert_eq!(json, r#"{"texts":["chat_patron:hi "]}"#);
    }

    #[test]
    fn test_explicit_url_wins() {
        let config = HttpNerConfig::from_env_or(Some("http://localhost:8080/ner".to_string())).unwrap();
        assert_eq!(config.url, "http://localhost:8080/ner");
    }
}
