pub mod error;
pub mod tone;
pub mod types;

pub use error::{preview, Error};
pub use tone::Tone;
pub use types::{ArticleOutput, LengthWarning, Section, LEDE_MAX_CHARS, TITLE_MAX_CHARS};

pub type Result<T> = std::result::Result<T, Error>;

/// Soft cap on the raw text accepted by the form.
pub const MAX_INPUT_CHARS: usize = 5000;
