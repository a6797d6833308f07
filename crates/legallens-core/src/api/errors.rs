use serde::Deserialize;

/// Error body returned by the API: `{"detail": "..."}`. Validation failures
/// put a list of field errors under `detail` instead of a string.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .and_then(|detail| detail.as_str())
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

/// Extract the server-supplied message from a raw error body, if any.
pub fn server_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    parsed.message().map(str::to_string)
}
