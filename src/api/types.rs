use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error body returned by every non-2xx API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            timestamp: Utc::now(),
        }
    }
}
