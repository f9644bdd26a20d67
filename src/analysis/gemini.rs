//! Gemini `generateContent` REST client

use super::prompt::{build_prompt, AnalysisKind, SYSTEM_INSTRUCTION};
use crate::extractor::models::VideoMetadata;
use crate::utils::config::AppSettings;
use crate::utils::error::NebulaError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

pub const EMPTY_ANALYSIS: &str = "No analysis could be generated.";

/// Client for content analysis
pub struct AnalysisClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl AnalysisClient {
    pub fn new(client: Client, base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn from_settings(settings: &AppSettings, client: Client) -> Self {
        Self::new(
            client,
            &settings.gemini_url,
            &settings.gemini_model,
            settings.api_key.clone(),
        )
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Ask the model for an analysis of `metadata`.
    ///
    /// Fails with [`NebulaError::MissingApiKey`] before any request when no
    /// key is configured.
    pub async fn analyze(
        &self,
        metadata: &VideoMetadata,
        kind: AnalysisKind,
    ) -> Result<String, NebulaError> {
        let api_key = self.api_key.as_deref().ok_or(NebulaError::MissingApiKey)?;
        let prompt = build_prompt(metadata, kind);

        info!("Requesting {} analysis for {}", kind, metadata.id);
        match self.generate(api_key, &prompt).await {
            Ok(Some(text)) => Ok(text),
            Ok(None) => {
                debug!("Model returned no text for {}", metadata.id);
                Ok(EMPTY_ANALYSIS.to_string())
            }
            Err(e) => {
                error!("Analysis request failed: {}", e);
                Err(NebulaError::AnalysisFailed(e.to_string()))
            }
        }
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<Option<String>, NebulaError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NebulaError::SourceStatus {
                source_id: "gemini",
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        Ok(parsed.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::models::VideoId;
    use crate::extractor::resolver::synthetic_metadata;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/models/gemini-2.5-flash:generateContent";

    fn metadata() -> VideoMetadata {
        synthetic_metadata(&VideoId::new("dQw4w9WgXcQ").expect("valid id"))
    }

    fn client(server: &MockServer, key: Option<&str>) -> AnalysisClient {
        AnalysisClient::new(
            Client::new(),
            &server.uri(),
            "gemini-2.5-flash",
            key.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server, None)
            .analyze(&metadata(), AnalysisKind::Summary)
            .await
            .unwrap_err();
        assert!(matches!(err, NebulaError::MissingApiKey));

        let blank = client(&server, Some("  "));
        assert!(!blank.has_api_key());
    }

    #[tokio::test]
    async fn test_successful_analysis_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "- catchy" }, { "text": "\n- upbeat" }] }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server, Some("test-key"))
            .analyze(&metadata(), AnalysisKind::Summary)
            .await
            .expect("analysis succeeds");
        assert_eq!(text, "- catchy\n- upbeat");
    }

    #[tokio::test]
    async fn test_empty_response_uses_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let text = client(&server, Some("k"))
            .analyze(&metadata(), AnalysisKind::Tags)
            .await
            .expect("empty output is not an error");
        assert_eq!(text, EMPTY_ANALYSIS);
    }

    #[tokio::test]
    async fn test_http_error_is_analysis_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server, Some("k"))
            .analyze(&metadata(), AnalysisKind::Blog)
            .await
            .unwrap_err();
        assert!(matches!(err, NebulaError::AnalysisFailed(_)));
        assert_eq!(
            err.user_message(),
            "Failed to analyze video content. Please try again."
        );
    }
}
