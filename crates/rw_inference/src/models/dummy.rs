use std::fmt;

use async_trait::async_trait;
use rw_core::{ArticleOutput, Result, Section, TITLE_MAX_CHARS};

use super::GenerationModel;
use crate::prompt::Prompt;

/// Offline model: assembles an article from the first sentences of the
/// source text. No credential, no network.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

fn sentences(text: &str) -> Vec<String> {
    text.split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn shorten(text: &str, max: usize) -> String {
    text.chars().take(max).collect::<String>().trim_end().to_string()
}

#[async_trait]
impl GenerationModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let sentences = sentences(&prompt.source);
        let pick = |i: usize| sentences.get(i).cloned().unwrap_or_default();
        let first = pick(0);

        let article = ArticleOutput {
            title: shorten(first.trim_end_matches(['.', '!', '?']), TITLE_MAX_CHARS),
            lede: first.clone(),
            hook: pick(1),
            section1: Section {
                intertitle: "L'essentiel".to_string(),
                paragraph: sentences.iter().take(3).cloned().collect::<Vec<_>>().join(" "),
            },
            section2: Section {
                intertitle: "Pour aller plus loin".to_string(),
                paragraph: sentences.iter().skip(3).cloned().collect::<Vec<_>>().join(" "),
            },
        };
        tracing::debug!("Dummy article built with tone {}", prompt.tone);
        Ok(serde_json::to_string(&article)?)
    }
}
