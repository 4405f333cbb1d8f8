use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;

use crate::errors::{ScreenClickError, ScreenClickResult};

/// Seam between the resolver and the actual inference backend. The resolver
/// only needs "image + prompt in, free text out"; tests substitute a scripted
/// implementation.
#[async_trait]
pub trait VlmClient: Send + Sync {
    /// One stateless completion request. No conversation state is kept
    /// between calls — every sample is a fresh request.
    async fn complete(&self, image_png: &[u8], prompt: &str, model: &str)
        -> ScreenClickResult<String>;
}

/// Client for a locally hosted Ollama server's chat API.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: String, request_timeout: Duration) -> ScreenClickResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl VlmClient for OllamaClient {
    async fn complete(
        &self,
        image_png: &[u8],
        prompt: &str,
        model: &str,
    ) -> ScreenClickResult<String> {
        let image_b64 = base64::engine::general_purpose::STANDARD.encode(image_png);
        let body = serde_json::json!({
            "model": model,
            "messages": [{
                "role": "user",
                "content": prompt,
                "images": [image_b64],
            }],
            "stream": false,
        });

        tracing::debug!(
            model,
            image_bytes = image_png.len(),
            prompt_len = prompt.len(),
            "sending VLM request"
        );

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ScreenClickError::Inference(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(ScreenClickError::Inference(format!("{status}: {err_body}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScreenClickError::Inference(format!("bad response body: {e}")))?;
        let content = json["message"]["content"].as_str().unwrap_or("").to_string();
        tracing::debug!(content_len = content.len(), "VLM response received");
        Ok(content)
    }
}
