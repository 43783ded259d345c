/// Fallback text for failures where the server supplied no usable message.
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";

/// Fallback text for requests that exceeded the configured deadline.
pub const TIMEOUT_MESSAGE: &str = "The request timed out. Please try again.";

/// Text surfaced when a 2xx response body is not a valid envelope.
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "The server returned an unexpected response. Please try again later.";

/// Text surfaced when there is no session or it expired locally.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Text surfaced when an authenticated call is attempted with no session.
pub const NOT_SIGNED_IN_MESSAGE: &str = "Please log in to continue.";

/// Every failure a view can receive.
///
/// `Display` renders the user-facing message for each variant, so callers can
/// show `err.to_string()` directly.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Input rejected locally. Never reaches the network.
    #[error("{0}")]
    Validation(String),

    /// Bad credentials, or a token rejected by the server or expired locally.
    #[error("{message}")]
    Unauthorized { message: String },

    /// The server rejected an otherwise well-formed request.
    #[error("{message}")]
    Api {
        message: String,
        error_code: Option<String>,
        status: Option<u16>,
    },

    /// No connectivity, timeout, or malformed response.
    #[error("{0}")]
    Transport(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn session_expired() -> Self {
        Self::Unauthorized {
            message: SESSION_EXPIRED_MESSAGE.to_owned(),
        }
    }

    pub(crate) fn not_signed_in() -> Self {
        Self::Unauthorized {
            message: NOT_SIGNED_IN_MESSAGE.to_owned(),
        }
    }

    /// User-facing message, identical to the `Display` output.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Server-supplied `errorCode`, when the failure came from an envelope.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Api { error_code, .. } => error_code.as_deref(),
            _ => None,
        }
    }

    /// Whether the failure means the user has to sign in again.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Whether the failure was raised locally before any request was sent.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
