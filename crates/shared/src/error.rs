use serde::{Deserialize, Serialize};

/// Error body returned by the roster server on non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    /// Reads a `{detail}` body leniently; anything else yields `None`.
    pub fn detail_from_body(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ApiError>(body)
            .ok()
            .and_then(|err| err.detail)
            .filter(|detail| !detail.is_empty())
    }
}
