use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use rw_core::{Error, Result};
use serde::{Deserialize, Serialize};

use super::{ensure_success, require_key, GenerationModel};
use crate::prompt::{Prompt, QuoteRule};
use crate::Config;

pub const DEFAULT_VERTEX_LOCATION: &str = "us-central1";
pub const DEFAULT_VERTEX_MODEL: &str = "gemini-1.5-pro-preview-0409";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentRequest {
    fn new(prompt: &Prompt, json_mode: bool) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.combined(),
                }],
            }],
            generation_config: json_mode.then_some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        }
    }
}

/// Sends a `generateContent` call and extracts the first candidate's text.
async fn generate_content(
    provider: &str,
    request: RequestBuilder,
    body: &GenerateContentRequest,
) -> Result<String> {
    let response = request.json(body).send().await?;
    let text = ensure_success(provider, response).await?.text().await?;

    let parsed: GenerateContentResponse = serde_json::from_str(&text).map_err(|_| {
        let reason = format!("the {} answer is not a generateContent response", provider);
        Error::unexpected_output(reason, &text)
    })?;

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or_else(|| {
            let reason = format!("the {} answer has no candidate text", provider);
            Error::unexpected_output(reason, &text)
        })
}

/// Direct REST call to a Vertex AI publisher model, authenticated with a
/// bearer access token.
pub struct VertexModel {
    client: Client,
    access_token: String,
    endpoint: String,
    quote_rule: QuoteRule,
}

impl fmt::Debug for VertexModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexModel")
            .field("client", &"<reqwest::Client>")
            .field("access_token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl VertexModel {
    pub fn new(config: &Config) -> Result<Self> {
        let access_token = require_key(config, "VERTEX_API_KEY")?;
        let project = config
            .project_id
            .clone()
            .ok_or_else(|| {
                Error::Config("VERTEX_PROJECT_ID must be set for the vertex provider".to_string())
            })?;
        let location = config
            .location
            .clone()
            .unwrap_or_else(|| DEFAULT_VERTEX_LOCATION.to_string());
        let base_url =
            config.base_url_or(&format!("https://{}-aiplatform.googleapis.com", location))?;
        let endpoint = format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            base_url,
            project,
            location,
            config.model_or(DEFAULT_VERTEX_MODEL)
        );

        Ok(Self {
            client: Client::new(),
            access_token,
            endpoint,
            quote_rule: config.quote_rule.unwrap_or(QuoteRule::Strict),
        })
    }
}

#[async_trait]
impl GenerationModel for VertexModel {
    fn name(&self) -> &str {
        "Vertex AI"
    }

    fn quote_rule(&self) -> QuoteRule {
        self.quote_rule
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let request = self.client.post(&self.endpoint).bearer_auth(&self.access_token);
        generate_content(self.name(), request, &GenerateContentRequest::new(prompt, false)).await
    }
}

/// Public Gemini API, authenticated with an API key header.
pub struct GeminiModel {
    client: Client,
    api_key: String,
    endpoint: String,
    quote_rule: QuoteRule,
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl GeminiModel {
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url_or(DEFAULT_GEMINI_BASE_URL)?,
            config.model_or(DEFAULT_GEMINI_MODEL)
        );
        Ok(Self {
            client: Client::new(),
            api_key: require_key(config, "GEMINI_API_KEY")?,
            endpoint,
            quote_rule: config.quote_rule.unwrap_or(QuoteRule::Strict),
        })
    }
}

#[async_trait]
impl GenerationModel for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn quote_rule(&self) -> QuoteRule {
        self.quote_rule
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let request = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key);
        generate_content(self.name(), request, &GenerateContentRequest::new(prompt, true)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptBuilder;
    use crate::Provider;
    use rw_core::Tone;

    fn vertex_config() -> Config {
        let mut config = Config::new(Provider::Vertex);
        config.api_key = Some("ya29.token".to_string());
        config.project_id = Some("mon-check-corres".to_string());
        config
    }

    #[test]
    fn test_vertex_endpoint() {
        let model = VertexModel::new(&vertex_config()).unwrap();
        assert_eq!(
            model.endpoint,
            "https://us-central1-aiplatform.googleapis.com/v1/projects/mon-check-corres\
/locations/us-central1/publishers/google/models/gemini-1.5-pro-preview-0409:generateContent"
        );
        assert!(!format!("{:?}", model).contains("ya29"));
    }

    #[test]
    fn test_vertex_requires_project() {
        let mut config = vertex_config();
        config.project_id = None;
        assert!(matches!(VertexModel::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_gemini_endpoint_and_key() {
        let mut config =
            Config::new(Provider::Gemini).with_model(Some("gemini-2.0-flash".to_string()));
        assert!(matches!(GeminiModel::new(&config), Err(Error::MissingCredential { .. })));

        config.api_key = Some("key".to_string());
        let model = GeminiModel::new(&config).unwrap();
        assert_eq!(
            model.endpoint,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let prompt = PromptBuilder::default().build("Texte", Tone::Narratif);
        let value = serde_json::to_value(GenerateContentRequest::new(&prompt, true)).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert!(value["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains(Tone::Narratif.description()));
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");

        let value = serde_json::to_value(GenerateContentRequest::new(&prompt, false)).unwrap();
        assert!(value.get("generationConfig").is_none());
    }
}
