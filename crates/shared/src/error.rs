use serde::{Deserialize, Serialize};

/// Shown to the user whenever a filing cannot be completed.
pub const GENERIC_FILING_FAILURE: &str = "Error processing filing. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The case could not be handed to the case-management webhook.
    DeliveryFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingError {
    pub code: ErrorCode,
    pub message: String,
}

impl FilingError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn delivery_failed() -> Self {
        Self::new(ErrorCode::DeliveryFailed, GENERIC_FILING_FAILURE)
    }
}
