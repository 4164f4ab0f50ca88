use serde_json::Value;

use super::error::TtsServiceError;

/// Parse a batch file holding a JSON array of strings, e.g. `["hello", "world"]`
pub fn parse_text_batch(json: &str) -> Result<Vec<String>, TtsServiceError> {
    let entries = parse_array(json, "a JSON array of strings")?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::String(text) => Ok(text),
            other => Err(TtsServiceError::InvalidBatchInput(format!(
                "entry {index} must be a string, got {other}"
            ))),
        })
        .collect()
}

/// Parse a batch file holding `[text1, text2]` pairs, e.g. `[["strong", "stark"]]`
pub fn parse_pair_batch(json: &str) -> Result<Vec<(String, String)>, TtsServiceError> {
    let entries = parse_array(json, "a JSON array of [text1, text2] pairs")?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Array(items) if items.len() == 2 => {
                let mut items = items.into_iter();
                match (items.next(), items.next()) {
                    (Some(Value::String(first)), Some(Value::String(second))) => {
                        Ok((first, second))
                    }
                    _ => Err(TtsServiceError::InvalidBatchInput(format!(
                        "entry {index} must contain two strings"
                    ))),
                }
            }
            other => Err(TtsServiceError::InvalidBatchInput(format!(
                "entry {index} must be a [text1, text2] pair, got {other}"
            ))),
        })
        .collect()
}

fn parse_array(json: &str, expected: &str) -> Result<Vec<Value>, TtsServiceError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| TtsServiceError::InvalidBatchInput(format!("not valid JSON: {e}")))?;

    match value {
        Value::Array(entries) if entries.is_empty() => Err(TtsServiceError::InvalidBatchInput(
            "batch is empty".to_string(),
        )),
        Value::Array(entries) => Ok(entries),
        _ => Err(TtsServiceError::InvalidBatchInput(format!(
            "input must contain {expected}"
        ))),
    }
}
