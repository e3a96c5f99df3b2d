use std::fmt;
use std::str::FromStr;

use rw_core::{Error, Result};
use url::Url;

pub mod models;
pub mod output;
pub mod prompt;

pub use models::{create_model, GenerationModel};
pub use output::clean_output;
pub use prompt::{Prompt, PromptBuilder, PromptMode, QuoteRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Vertex,
    Gemini,
    OpenAI,
    Dummy,
}

impl Provider {
    /// Environment variable holding the provider credential, if it needs one.
    pub fn credential_var(self) -> Option<&'static str> {
        match self {
            Provider::Vertex => Some("VERTEX_API_KEY"),
            Provider::Gemini => Some("GEMINI_API_KEY"),
            Provider::OpenAI => Some("OPENAI_API_KEY"),
            Provider::Dummy => None,
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vertex" => Ok(Provider::Vertex),
            "gemini" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAI),
            "dummy" => Ok(Provider::Dummy),
            _ => Err(Error::Config(format!(
                "Unknown provider '{}'. Available providers: vertex, gemini, openai, dummy",
                s
            ))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Vertex => "vertex",
            Provider::Gemini => "gemini",
            Provider::OpenAI => "openai",
            Provider::Dummy => "dummy",
        })
    }
}

/// Everything a provider needs, resolved once at startup.
#[derive(Clone)]
pub struct Config {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
    pub project_id: Option<String>,
    pub location: Option<String>,
    pub quote_rule: Option<QuoteRule>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("location", &self.location)
            .field("quote_rule", &self.quote_rule)
            .finish()
    }
}

impl Config {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            api_key: None,
            model_name: None,
            base_url: None,
            project_id: None,
            location: None,
            quote_rule: None,
        }
    }

    /// Reads the provider settings from the process environment. A missing
    /// credential is reported here rather than on the first request.
    pub fn from_env(provider: Provider) -> Result<Self> {
        Self::from_lookup(provider, |var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(provider: Provider, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let mut config = Self::new(provider);

        if let Some(var) = provider.credential_var() {
            config.api_key = Some(get(var).ok_or_else(|| Error::MissingCredential {
                var: var.to_string(),
            })?);
        }

        if provider == Provider::Vertex {
            config.project_id = Some(get("VERTEX_PROJECT_ID").ok_or_else(|| {
                Error::Config("VERTEX_PROJECT_ID must be set for the vertex provider".to_string())
            })?);
            config.location = get("VERTEX_LOCATION");
        }

        Ok(config)
    }

    pub fn with_model(mut self, model_name: Option<String>) -> Self {
        if model_name.is_some() {
            self.model_name = model_name;
        }
        self
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if base_url.is_some() {
            self.base_url = base_url;
        }
        self
    }

    pub fn with_quote_rule(mut self, quote_rule: Option<QuoteRule>) -> Self {
        if quote_rule.is_some() {
            self.quote_rule = quote_rule;
        }
        self
    }

    pub(crate) fn model_or(&self, default: &str) -> String {
        self.model_name.clone().unwrap_or_else(|| default.to_string())
    }

    /// Configured base URL, or `default`, without a trailing slash.
    pub(crate) fn base_url_or(&self, default: &str) -> Result<String> {
        let raw = self.base_url.as_deref().unwrap_or(default);
        let url = Url::parse(raw)
            .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", raw, e)))?;
        Ok(url.as_str().trim_end_matches('/').to_string())
    }
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::{Config, GenerationModel, Provider, QuoteRule};
    pub use rw_core::{ArticleOutput, Error, Result, Section, Tone};
}
