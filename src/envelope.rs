use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::Error;

/// Uniform wrapper around every API response body.
///
/// `data` must not be trusted unless `success` is true. When it is false,
/// `message` is the text to show the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ApiResponse<T = JsonValue> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful envelope carrying `data`.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: String::new(),
            data: Some(data),
            timestamp: None,
            error_code: None,
        }
    }

    /// Failed envelope carrying only a message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            timestamp: None,
            error_code: None,
        }
    }

    #[must_use]
    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }
}

impl ApiResponse<JsonValue> {
    /// Resolves the envelope into its payload.
    ///
    /// A failed envelope becomes [`Error::Api`] built from `message` and
    /// `errorCode` alone; `data` is never looked at in that case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] when `success` is false, or
    /// [`Error::Transport`] when `data` does not match `T`.
    pub fn into_data<T: DeserializeOwned>(self, status: Option<u16>) -> Result<T, Error> {
        if !self.success {
            return Err(Error::Api {
                message: non_empty_or(self.message, "Request failed. Please try again."),
                error_code: self.error_code,
                status,
            });
        }
        serde_json::from_value(self.data.unwrap_or(JsonValue::Null)).map_err(|e| {
            tracing::warn!(error = %e, "Envelope data did not match the expected shape");
            Error::Transport(crate::error::MALFORMED_RESPONSE_MESSAGE.to_owned())
        })
    }
}

pub(crate) fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_owned()
    } else {
        message
    }
}
