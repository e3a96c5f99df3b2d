use thiserror::Error;

/// Number of characters of a raw model answer kept in error messages.
pub const PREVIEW_CHARS: usize = 100;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Please enter some text to transform")]
    EmptyInput,

    #[error("Input is too long: {len} characters (maximum {max})")]
    InputTooLong { len: usize, max: usize },

    #[error("A generation is already in progress")]
    Busy,

    #[error("Unknown tone: {0}")]
    UnknownTone(String),

    #[error("Missing credential: environment variable {var} is not set")]
    MissingCredential { var: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{provider} API error: {status} {status_text} - {body}")]
    Api {
        provider: String,
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected model output: {reason}. Received: \"{preview}\"")]
    UnexpectedOutput { reason: String, preview: String },

    #[error("The model returned an invalid article ({source}). Received: \"{preview}\"")]
    MalformedResponse {
        preview: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable tag for the error family, used by the JSON API.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::EmptyInput => "empty_input",
            Error::InputTooLong { .. } => "input_too_long",
            Error::Busy => "busy",
            Error::UnknownTone(_) => "unknown_tone",
            Error::MissingCredential { .. } => "missing_credential",
            Error::Config(_) => "config",
            Error::Api { .. } => "api",
            Error::Http(_) => "http",
            Error::UnexpectedOutput { .. } => "unexpected_output",
            Error::MalformedResponse { .. } => "malformed_response",
            Error::Serialization(_) => "serialization",
            Error::Io(_) => "io",
            Error::Internal(_) => "internal",
        }
    }

    /// Errors raised before any provider call is attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::EmptyInput | Error::InputTooLong { .. } | Error::UnknownTone(_)
        )
    }

    pub fn unexpected_output(reason: impl Into<String>, raw: &str) -> Self {
        Error::UnexpectedOutput {
            reason: reason.into(),
            preview: preview(raw),
        }
    }

    pub fn malformed_response(raw: &str, source: serde_json::Error) -> Self {
        Error::MalformedResponse {
            preview: preview(raw),
            source,
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of `raw`, with an ellipsis when cut.
pub fn preview(raw: &str) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
