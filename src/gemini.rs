use std::path::Path;
use std::time::Duration;

use base64::Engine;
use serde::Deserialize;
use serde_json::json;

use crate::config::GenerationConfig;
use crate::generate::{
    EMPTY_RESPONSE_TEXT, GenerationError, GenerationRequest, TextGenerator, strip_data_url,
};
use crate::prompt::{build_prompt, system_instruction};

/// Blocking client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

impl GeminiClient {
    pub fn new(config: &GenerationConfig, api_key: impl Into<String>) -> Result<Self, GenerationError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: api_key.into(),
        })
    }

    /// Build a client with the key read from `config.api_key_env`.
    pub fn from_env(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenerationError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn request_body(&self, request: &GenerationRequest) -> serde_json::Value {
        let prompt = build_prompt(&request.content, request.action, request.custom_prompt.as_deref());
        let mut parts = vec![json!({ "text": prompt })];
        if let Some(image) = &request.image {
            parts.push(json!({
                "inlineData": {
                    "mimeType": "image/jpeg",
                    "data": strip_data_url(image),
                }
            }));
        }
        json!({
            "systemInstruction": { "parts": [{ "text": system_instruction() }] },
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": { "temperature": self.temperature },
        })
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        tracing::info!(model = %self.model, action = ?request.action, "sending generation request");
        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(request))
            .send()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!(status = status.as_u16(), "generation service rejected the request");
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| GenerationError::Decode(e.to_string()))?;
        let text = response_text(&parsed);
        tracing::debug!(chars = text.len(), "generation response received");
        Ok(text)
    }
}

fn response_text(response: &GenerateContentResponse) -> String {
    let text: String = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text.as_deref())
                .collect()
        })
        .unwrap_or_default();
    if text.is_empty() {
        EMPTY_RESPONSE_TEXT.to_string()
    } else {
        text
    }
}

/// Read an image file and return it base64 encoded.
pub fn load_image_base64(path: &Path) -> Result<String, GenerationError> {
    let bytes = std::fs::read(path).map_err(|source| GenerationError::Image {
        path: path.display().to_string(),
        source,
    })?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}
