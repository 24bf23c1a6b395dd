//! Image generation, audio transcription and tweeting over HTTP APIs

use async_trait::async_trait;
use autopilot_config::{HuggingFaceConfig, ImageConfig, TwitterConfig};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::ServiceError;

#[async_trait]
pub trait MediaOps: Send + Sync {
    /// PNG bytes for a prompt
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ServiceError>;
    async fn transcribe_audio(&self, audio: Vec<u8>) -> Result<String, ServiceError>;
    /// Returns the id of the created tweet
    async fn post_tweet(&self, text: &str) -> Result<String, ServiceError>;
}

/// OpenAI images, Hugging Face inference and Twitter v2
pub struct HttpMedia {
    client: Client,
    image: ImageConfig,
    huggingface: HuggingFaceConfig,
    twitter: TwitterConfig,
}

impl HttpMedia {
    pub fn new(image: ImageConfig, huggingface: HuggingFaceConfig, twitter: TwitterConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            image,
            huggingface,
            twitter,
        }
    }
}

async fn api_error(service: &'static str, response: reqwest::Response) -> ServiceError {
    let status = response.status().as_u16();
    let body: serde_json::Value = response.json().await.unwrap_or_default();
    let message = body["error"]["message"]
        .as_str()
        .or_else(|| body["error"].as_str())
        .or_else(|| body["detail"].as_str())
        .unwrap_or("unknown error")
        .to_string();
    ServiceError::Api {
        service,
        status,
        message,
    }
}

#[async_trait]
impl MediaOps for HttpMedia {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ServiceError> {
        if self.image.api_key.is_empty() {
            return Err(ServiceError::NotConfigured("services.image.api_key"));
        }
        debug!("◆ Generating image: {}", prompt);

        let response = self
            .client
            .post("https://api.openai.com/v1/images/generations")
            .bearer_auth(&self.image.api_key)
            .json(&json!({
                "prompt": prompt,
                "n": 1,
                "size": self.image.size,
                "response_format": "b64_json",
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error("openai images", response).await);
        }

        let body: serde_json::Value = response.json().await?;
        let encoded = body["data"][0]["b64_json"]
            .as_str()
            .ok_or_else(|| ServiceError::Failed("no image in response".to_string()))?;
        BASE64
            .decode(encoded)
            .map_err(|e| ServiceError::Failed(format!("invalid image payload: {}", e)))
    }

    async fn transcribe_audio(&self, audio: Vec<u8>) -> Result<String, ServiceError> {
        if self.huggingface.api_key.is_empty() {
            return Err(ServiceError::NotConfigured("services.huggingface.api_key"));
        }
        let url = format!(
            "https://api-inference.huggingface.co/models/{}",
            self.huggingface.audio_model
        );
        debug!("◆ Transcribing {} bytes with {}", audio.len(), url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.huggingface.api_key)
            .body(audio)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error("huggingface", response).await);
        }

        let body: serde_json::Value = response.json().await?;
        Ok(body["text"].as_str().unwrap_or_default().to_string())
    }

    async fn post_tweet(&self, text: &str) -> Result<String, ServiceError> {
        if self.twitter.access_token.is_empty() {
            return Err(ServiceError::NotConfigured("services.twitter.access_token"));
        }
        let response = self
            .client
            .post("https://api.twitter.com/2/tweets")
            .bearer_auth(&self.twitter.access_token)
            .json(&json!({ "text": text }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error("twitter", response).await);
        }

        let body: serde_json::Value = response.json().await?;
        Ok(body["data"]["id"].as_str().unwrap_or_default().to_string())
    }
}
