use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rw_core::{Error, Result, Tone};

use crate::output::clean_output;
use crate::prompt::{Prompt, PromptBuilder, PromptMode, QuoteRule};
use crate::{Config, Provider};

pub mod dummy;
pub mod google;
pub mod openai;

pub use dummy::DummyModel;
pub use google::{GeminiModel, VertexModel};
pub use openai::OpenAIModel;

#[async_trait]
pub trait GenerationModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn quote_rule(&self) -> QuoteRule {
        QuoteRule::Strict
    }

    fn prompt_mode(&self) -> PromptMode {
        PromptMode::Combined
    }

    /// Send the prompt to the provider and return the raw model text.
    async fn complete(&self, prompt: &Prompt) -> Result<String>;

    /// Turn raw text into a JSON-encoded article. Unknown or missing tones
    /// fall back to "informatif".
    async fn generate(&self, raw_text: &str, tone: Option<&str>) -> Result<String> {
        let tone = Tone::resolve(tone);
        let prompt = PromptBuilder::new(self.quote_rule()).build(raw_text, tone);
        tracing::info!("Calling {} with tone {}", self.name(), tone);
        match self.prompt_mode() {
            PromptMode::Combined => tracing::debug!("Prompt: {}", prompt.combined()),
            PromptMode::Chat => {
                tracing::debug!("System: {}\nUser: {}", prompt.system(), prompt.user())
            }
        }

        let raw = self.complete(&prompt).await?;
        tracing::debug!("Raw answer from {}: {}", self.name(), raw);
        clean_output(&raw)
    }
}

pub fn create_model(config: &Config) -> Result<Arc<dyn GenerationModel>> {
    let model: Arc<dyn GenerationModel> = match config.provider {
        Provider::Vertex => Arc::new(VertexModel::new(config)?),
        Provider::Gemini => Arc::new(GeminiModel::new(config)?),
        Provider::OpenAI => Arc::new(OpenAIModel::new(config)?),
        Provider::Dummy => Arc::new(DummyModel::new()),
    };
    Ok(model)
}

/// Turns a non-success response into [`Error::Api`], keeping the provider's
/// error payload.
pub(crate) async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
    let body = match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => value.to_string(),
        Err(_) => text,
    };
    tracing::error!("{} answered with status {}", provider, status);
    Err(Error::Api {
        provider: provider.to_string(),
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        body,
    })
}

pub(crate) fn require_key(config: &Config, var: &str) -> Result<String> {
    config
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| Error::MissingCredential { var: var.to_string() })
}
