use rw_core::{Error, Result};

/// Strips Markdown code fences around the model answer and checks that what
/// remains looks like a JSON object. Well-formedness is left to the caller.
pub fn clean_output(raw: &str) -> Result<String> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Err(Error::unexpected_output("the model returned an empty answer", raw));
    }
    if !cleaned.starts_with('{') {
        return Err(Error::unexpected_output(
            "the answer does not start with '{'",
            cleaned,
        ));
    }
    Ok(cleaned.to_string())
}
