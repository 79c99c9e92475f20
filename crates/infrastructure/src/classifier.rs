//! HTTP priority classifier
//!
//! Asks a Gemini-style `generateContent` endpoint to label an issue
//! description as NORMAL, URGENT or SEVERE. The first label found in the
//! reply wins; a reply without one is an error the caller treats like any
//! other classifier failure.

use async_trait::async_trait;
use civic_issues_application::PriorityAdvisor;
use civic_issues_common::ClassifierConfig;
use civic_issues_domain::errors::IntegrationError;
use civic_issues_domain::Priority;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{Error, Result};

fn prompt(description: &str) -> String {
    format!(
        "You prioritize civic issues reported by citizens. There are three priorities:\n\
         1) NORMAL\n\
         2) URGENT\n\
         3) SEVERE\n\
         Return only the priority. For example:\n\
         description = a power pole has fallen and the electric wires are on the road\n\
         output = SEVERE\n\
         description = {}",
        description
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Priority advisor backed by a generative language HTTP API.
#[derive(Clone)]
pub struct HttpPriorityAdvisor {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpPriorityAdvisor {
    /// Build the advisor; `timeout` bounds each HTTP call.
    pub fn new(config: &ClassifierConfig, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("civic-issues"));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: format!(
                "{}/v1beta/models/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key: config.api_key.clone(),
        })
    }

    async fn generate(&self, description: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt(description),
                }],
            }],
        };

        let mut request = self.http.post(&self.url).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response: GenerateResponse = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.text())
    }
}

#[async_trait]
impl PriorityAdvisor for HttpPriorityAdvisor {
    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn classify(&self, text: &str) -> std::result::Result<Priority, IntegrationError> {
        let reply = self.generate(text).await.map_err(|e| {
            warn!(error = %e, "Classifier request failed");
            IntegrationError::Classifier(e.to_string())
        })?;

        match Priority::from_label(&reply) {
            Some(priority) => {
                debug!(%priority, "Classifier answered");
                Ok(priority)
            }
            None => Err(IntegrationError::Classifier(format!(
                "no priority label in reply: {}",
                reply.trim()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_description() {
        let text = prompt("Sewage overflowing near the school");
        assert!(text.ends_with("description = Sewage overflowing near the school"));
        assert!(text.contains("SEVERE"));
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "output ="}, {"text": "URGENT"}]}}]
        }))
        .unwrap();
        assert_eq!(response.text(), "output = URGENT");
    }

    #[test]
    fn test_url_layout() {
        let config = ClassifierConfig {
            enabled: true,
            endpoint: "http://localhost:9000/".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
        };
        let advisor = HttpPriorityAdvisor::new(&config, Duration::from_secs(1)).unwrap();
        assert_eq!(
            advisor.url,
            "http://localhost:9000/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
