use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use rw_core::{Error, Result};
use serde::{Deserialize, Serialize};

use super::{ensure_success, require_key, GenerationModel};
use crate::prompt::{Prompt, PromptMode, QuoteRule};
use crate::Config;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// Chat-completion provider; also works with any OpenAI-compatible endpoint
/// through `base_url`.
pub struct OpenAIModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    quote_rule: QuoteRule,
}

impl fmt::Debug for OpenAIModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAIModel {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            api_key: require_key(config, "OPENAI_API_KEY")?,
            base_url: config.base_url_or(DEFAULT_BASE_URL)?,
            model: config.model_or(DEFAULT_MODEL),
            quote_rule: config.quote_rule.unwrap_or(QuoteRule::Brief),
        })
    }
}

#[async_trait]
impl GenerationModel for OpenAIModel {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn quote_rule(&self) -> QuoteRule {
        self.quote_rule
    }

    fn prompt_mode(&self) -> PromptMode {
        PromptMode::Chat
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt.system(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user(),
                },
            ],
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let body = ensure_success(self.name(), response).await?.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|_| {
            Error::unexpected_output("the OpenAI answer is not a chat completion", &body)
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                Error::unexpected_output("the OpenAI answer has no message content", &body)
            })
    }
}
