use thiserror::Error;

/// Failure of a single API call.
///
/// Pages treat every variant the same way (empty result, optional message);
/// the variants exist for logs and the error history overlay.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error calling {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    #[error("HTTP {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("malformed response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    /// Endpoint path the error relates to, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ApiError::Network { endpoint, .. }
            | ApiError::Status { endpoint, .. }
            | ApiError::Decode { endpoint, .. } => Some(endpoint),
            ApiError::InvalidBaseUrl(_) | ApiError::Client(_) => None,
        }
    }
}
