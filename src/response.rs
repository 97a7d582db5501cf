use serde::{Deserialize, Serialize};

/// A file the server reported it could not apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub file_path: String,
    #[serde(default)]
    pub error: String,
}

/// Structured body returned by the update endpoint for a batch upload.
///
/// Every field is optional on the wire; absent fields read as empty or false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    #[serde(default)]
    pub updated_files: Vec<String>,
    #[serde(default)]
    pub failed_files: Vec<FailedFile>,
    #[serde(default)]
    pub rebuilding: bool,
    #[serde(default)]
    pub dev_mode: bool,
}

/// Response body, either the structured shape or opaque text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResponse {
    Unstructured(String),
    Structured(UpdateResult),
}

impl UpdateResponse {
    /// Classify a response body. Only a JSON object that fits [`UpdateResult`]
    /// counts as structured; arrays, scalars, plain text and objects with
    /// mistyped fields stay unstructured.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value @ serde_json::Value::Object(_)) => {
                match serde_json::from_value::<UpdateResult>(value) {
                    Ok(result) => Self::Structured(result),
                    Err(e) => {
                        tracing::debug!("response object does not match update result: {e}");
                        Self::Unstructured(body.to_string())
                    }
                }
            }
            _ => Self::Unstructured(body.to_string()),
        }
    }
}

/// Statuses that mean a single-file upload was applied.
#[must_use]
pub fn is_file_accepted(status: u16) -> bool {
    matches!(status, 200 | 202)
}

/// Statuses that mean a batch was received; per-file outcomes live in the body.
#[must_use]
pub fn is_batch_accepted(status: u16) -> bool {
    matches!(status, 200 | 202 | 207)
}
