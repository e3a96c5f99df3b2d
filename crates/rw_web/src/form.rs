//! Form controller: owns the submitted text and tone, and the single view
//! state shown to the user.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rw_core::{ArticleOutput, Error, Result, Tone, MAX_INPUT_CHARS};
use rw_inference::GenerationModel;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormInput {
    pub raw_text: String,
    pub tone: Tone,
}

/// Exactly one of these is displayed at any time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    Idle,
    Busy,
    Error {
        message: String,
    },
    Ready {
        article: ArticleOutput,
        generated_at: DateTime<Utc>,
    },
}

impl ViewState {
    pub fn article(&self) -> Option<&ArticleOutput> {
        match self {
            ViewState::Ready { article, .. } => Some(article),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormSnapshot {
    pub input: FormInput,
    #[serde(flatten)]
    pub view: ViewState,
}

struct FormState {
    input: FormInput,
    view: ViewState,
}

pub struct FormController {
    model: Arc<dyn GenerationModel>,
    inner: Mutex<FormState>,
}

impl std::fmt::Debug for FormController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("model", &self.model.name())
            .field("busy", &self.is_busy())
            .finish()
    }
}

fn validate(raw_text: &str) -> Result<()> {
    if raw_text.trim().is_empty() {
        return Err(Error::EmptyInput);
    }
    let len = raw_text.chars().count();
    if len > MAX_INPUT_CHARS {
        return Err(Error::InputTooLong {
            len,
            max: MAX_INPUT_CHARS,
        });
    }
    Ok(())
}

/// Message shown when a generation ends without producing an outcome.
pub const INTERRUPTED_MESSAGE: &str = "The generation was interrupted before it completed";

/// Leaves the view in a terminal state if the in-flight generation unwinds
/// or its future is dropped before [`InFlight::finish`] runs.
struct InFlight<'a> {
    controller: &'a FormController,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn new(controller: &'a FormController) -> Self {
        Self {
            controller,
            finished: false,
        }
    }

    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::error!(
            "Generation with {} was interrupted",
            self.controller.model.name()
        );
        self.controller.lock().view = ViewState::Error {
            message: INTERRUPTED_MESSAGE.to_string(),
        };
    }
}

impl FormController {
    pub fn new(model: Arc<dyn GenerationModel>) -> Self {
        Self {
            model,
            inner: Mutex::new(FormState {
                input: FormInput::default(),
                view: ViewState::Idle,
            }),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let inner = self.lock();
        FormSnapshot {
            input: inner.input.clone(),
            view: inner.view.clone(),
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.lock().view, ViewState::Busy)
    }

    /// Runs one generation. Validation failures never reach the model, and a
    /// submission made while another is in flight is refused with
    /// [`Error::Busy`] without touching the displayed state.
    pub async fn generate(&self, raw_text: &str, tone: Option<&str>) -> Result<ArticleOutput> {
        let input = FormInput {
            raw_text: raw_text.to_string(),
            tone: Tone::resolve(tone),
        };

        {
            let mut inner = self.lock();
            if matches!(inner.view, ViewState::Busy) {
                return Err(Error::Busy);
            }
            inner.input = input;
            if let Err(err) = validate(raw_text) {
                inner.view = ViewState::Error {
                    message: err.to_string(),
                };
                return Err(err);
            }
            inner.view = ViewState::Busy;
        }

        let in_flight = InFlight::new(self);
        let outcome = self.run(raw_text, tone).await;
        in_flight.finish();

        let mut inner = self.lock();
        inner.view = match &outcome {
            Ok(article) => {
                for warning in article.length_warnings() {
                    tracing::warn!(
                        "Generated {} is {} characters long (intended maximum {})",
                        warning.field,
                        warning.len,
                        warning.max
                    );
                }
                ViewState::Ready {
                    article: article.clone(),
                    generated_at: Utc::now(),
                }
            }
            Err(err) => {
                tracing::error!("Generation with {} failed: {}", self.model.name(), err);
                ViewState::Error {
                    message: err.to_string(),
                }
            }
        };
        outcome
    }

    async fn run(&self, raw_text: &str, tone: Option<&str>) -> Result<ArticleOutput> {
        let raw = self.model.generate(raw_text, tone).await?;
        serde_json::from_str(&raw).map_err(|source| Error::malformed_response(&raw, source))
    }
}
