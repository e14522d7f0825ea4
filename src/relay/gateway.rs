use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::config::AiConfig;
use crate::relay::error::RelayError;

/// What the user turn carries: plain text, or text plus one inline image.
#[derive(Debug, Clone, PartialEq)]
pub enum UserContent {
    Text(String),
    TextWithImage { text: String, image_url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: UserContent,
}

/// One-shot chat completion against an LLM gateway.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Returns the assistant message text of the first choice.
    async fn complete(&self, request: ChatRequest) -> Result<String, RelayError>;
}

/// OpenAI-compatible `chat/completions` endpoint over HTTPS.
pub struct HttpGateway {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpGateway {
    pub fn new(config: &AiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.gateway_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatGateway for HttpGateway {
    async fn complete(&self, request: ChatRequest) -> Result<String, RelayError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(RelayError::MissingApiKey);
        };

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(key)
            .json(&request_body(&self.model, &request))
            .send()
            .await?;

        let status = resp.status();
        if let Some(err) = classify_status(status) {
            let text = resp.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %text, "AI gateway error");
            return Err(err);
        }

        let body = resp.text().await?;
        let content = extract_content(&body)?;
        debug!(len = content.len(), "AI response received");
        Ok(content)
    }
}

pub(crate) fn request_body(model: &str, request: &ChatRequest) -> Value {
    let user = match &request.user {
        UserContent::Text(text) => json!({ "role": "user", "content": text }),
        UserContent::TextWithImage { text, image_url } => json!({
            "role": "user",
            "content": [
                { "type": "text", "text": text },
                { "type": "image_url", "image_url": { "url": image_url } }
            ]
        }),
    };
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": request.system },
            user
        ]
    })
}

pub(crate) fn classify_status(status: StatusCode) -> Option<RelayError> {
    if status.is_success() {
        return None;
    }
    Some(match status.as_u16() {
        429 => RelayError::RateLimited,
        402 => RelayError::CreditsExhausted,
        other => RelayError::Gateway { status: other },
    })
}

#[derive(Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

pub(crate) fn extract_content(body: &str) -> Result<String, RelayError> {
    let completion: Completion =
        serde_json::from_str(body).map_err(|e| RelayError::Malformed(e.to_string()))?;
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(RelayError::EmptyResponse)
}
