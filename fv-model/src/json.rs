//! Models are asked for bare JSON but routinely wrap it in markdown fences or chatter.

use fv_core::{FvError, Result};
use serde::de::DeserializeOwned;

/// Removes surrounding ```` ```json ```` / ```` ``` ```` fences and whitespace.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest.strip_prefix("json").or_else(|| rest.strip_prefix("JSON")).unwrap_or(rest);
        body = body.strip_suffix("```").unwrap_or(body);
    }
    body.trim()
}

/// Parses model output as `T`, retrying on the outermost `{ ... }` slice when the text has
/// leading or trailing prose.
pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    let body = strip_code_fences(text);
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) else {
                return Err(FvError::Model(format!("model returned non-JSON content: {first_err}")));
            };
            if end <= start {
                return Err(FvError::Model(format!("model returned non-JSON content: {first_err}")));
            }
            serde_json::from_str(&body[start..=end])
                .map_err(|e| FvError::Model(format!("model returned malformed JSON: {e}")))
        }
    }
}
