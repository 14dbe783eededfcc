use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::utils::AppError;

/// Modelo de linguagem que responde a um prompt com texto livre
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        log::debug!("🤖 Calling language model ({} prompt chars)", prompt.len());

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let mut request = self
            .http
            .post(&self.api_url)
            .header("Accept", "application/json")
            .json(&body);

        if let Some(key) = &self.api_key {
            request = request.header("x-goog-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Failed to reach language model: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamError(format!(
                "Language model API error: {}",
                response.status()
            )));
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Failed to parse language model response: {}", e)))?;

        data.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| AppError::UpstreamError("Language model returned no text".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer, api_key: Option<&str>) -> GeminiClient {
        GeminiClient::new(&GeminiConfig {
            api_url: server.url("/v1beta/models/gemini:generateContent"),
            api_key: api_key.map(String::from),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_first_candidate_text() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini:generateContent")
                .header("x-goog-api-key", "secret")
                .json_body(serde_json::json!({
                    "contents": [{ "parts": [{ "text": "hello" }] }]
                }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "candidates": [
                        { "content": { "parts": [{ "text": "{\"type\":\"general\"}" }] } },
                        { "content": { "parts": [{ "text": "ignored" }] } }
                    ]
                }));
        });

        let text = client_for(&server, Some("secret")).generate("hello").await.unwrap();

        api_mock.assert();
        assert_eq!(text, "{\"type\":\"general\"}");
    }

    #[tokio::test]
    async fn test_generate_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(429).body("quota exceeded");
        });

        let err = client_for(&server, None).generate("hello").await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamError(ref m) if m.contains("429")));
    }

    #[tokio::test]
    async fn test_generate_without_candidates() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({ "candidates": [] }));
        });

        let err = client_for(&server, None).generate("hello").await.unwrap_err();
        assert_eq!(err.to_string(), "Upstream error: Language model returned no text");
    }
}
