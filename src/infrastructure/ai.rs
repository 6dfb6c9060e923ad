//! Client for the generative-language API behind the charging optimizer.
//!
//! Speaks the `generateContent` wire format: the prompt goes in
//! `contents[0].parts[0].text`, the answer comes back in
//! `candidates[0].content.parts[0].text`.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{DomainError, DomainResult};

pub const DEFAULT_AI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_AI_API_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

pub struct AiClient {
    http: reqwest::Client,
    config: AiConfig,
}

impl AiClient {
    pub fn new(config: AiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self { http, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Send `prompt` and return the first candidate's text.
    pub async fn generate(&self, prompt: &str) -> DomainResult<String> {
        let Some(key) = self.config.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            return Err(DomainError::Internal(
                "Server AI API key not configured.".into(),
            ));
        };

        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig::default(),
        };

        debug!(url = %self.config.api_url, "Calling AI service");
        let resp = self
            .http
            .post(&self.config.api_url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Upstream(format!("AI service error: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<Value>(&text) {
                Ok(json) => json.to_string(),
                Err(_) => serde_json::json!({ "status": status.as_u16(), "text": text }).to_string(),
            };
            warn!(status = status.as_u16(), "AI service returned an error");
            return Err(DomainError::Upstream(format!("AI service error: {}", detail)));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| DomainError::Upstream(format!("AI service error: {}", e)))?;

        extract_text(&data)
            .map(str::to_string)
            .ok_or_else(|| DomainError::Upstream("No content returned from AI service.".into()))
    }
}

fn extract_text(data: &Value) -> Option<&str> {
    data.get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::json;

    async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/generate", addr)
    }

    fn client(url: String, key: Option<&str>) -> AiClient {
        AiClient::new(AiConfig {
            api_key: key.map(str::to_string),
            api_url: url,
            timeout: Duration::from_secs(5),
        })
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: "hi" }],
            }],
            generation_config: GenerationConfig::default(),
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(v["generationConfig"]["topK"], 40);
        assert_eq!(v["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn extract_text_requires_the_full_path() {
        let ok = json!({"candidates": [{"content": {"parts": [{"text": "plan"}]}}]});
        assert_eq!(extract_text(&ok), Some("plan"));
        assert_eq!(extract_text(&json!({"candidates": []})), None);
        assert_eq!(extract_text(&json!({})), None);
    }

    #[tokio::test]
    async fn missing_key_is_reported_without_a_request() {
        let c = client("http://127.0.0.1:9/never".into(), None);
        assert!(!c.is_configured());
        let err = c.generate("x").await.unwrap_err();
        assert_eq!(err.to_string(), "Server AI API key not configured.");
    }

    #[tokio::test]
    async fn returns_candidate_text() {
        let url = spawn_mock(Router::new().route(
            "/generate",
            post(|Json(body): Json<Value>| async move {
                let prompt = body["contents"][0]["parts"][0]["text"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                Json(json!({"candidates": [{"content": {"parts": [{"text": format!("echo: {}", prompt)}]}}]}))
            }),
        ))
        .await;

        let text = client(url, Some("k")).generate("hello").await.unwrap();
        assert_eq!(text, "echo: hello");
    }

    #[tokio::test]
    async fn upstream_errors_become_bad_gateway_errors() {
        let url = spawn_mock(Router::new().route(
            "/generate",
            post(|| async {
                (
                    axum::http::StatusCode::FORBIDDEN,
                    Json(json!({"error": {"message": "bad key"}})),
                )
            }),
        ))
        .await;

        let err = client(url, Some("k")).generate("hello").await.unwrap_err();
        assert!(matches!(err, DomainError::Upstream(ref m) if m.starts_with("AI service error:")));
        assert!(err.to_string().contains("bad key"));
    }

    #[tokio::test]
    async fn empty_candidates_are_an_error() {
        let url = spawn_mock(Router::new().route(
            "/generate",
            post(|| async { Json(json!({"candidates": []})) }),
        ))
        .await;

        let err = client(url, Some("k")).generate("hello").await.unwrap_err();
        assert_eq!(err.to_string(), "No content returned from AI service.");
    }
}
