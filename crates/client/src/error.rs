//! Backend error taxonomy.

use thiserror::Error;

/// Shown when the backend rejects a request without saying why.
const GENERIC_REJECTION: &str = "The request could not be completed.";

/// Errors from talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got a response (DNS, TLS, timeout, connection reset).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with `success: false`.
    #[error("Rejected: {message}")]
    Rejected { message: String },

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("no message"))]
    Status {
        status: u16,
        message: Option<String>,
    },

    /// The response body did not have the expected shape.
    #[error("Unexpected response from {context}: {detail}")]
    Decode {
        context: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub(crate) fn rejected(message: Option<String>) -> Self {
        Self::Rejected {
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_REJECTION.to_string()),
        }
    }

    /// Text to show the user for this error.
    ///
    /// Server-supplied messages are passed through verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            Self::Rejected { message } => message.clone(),
            Self::Status {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Status {
                status,
                message: None,
            } => format!("The server returned an error (HTTP {status})."),
            Self::Decode { .. } => {
                "Unexpected response from the server. Please try again later.".to_string()
            }
        }
    }

    /// Whether the backend refused our credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_is_verbatim() {
        let err = ApiError::rejected(Some("Stock insuficiente".to_string()));
        assert_eq!(err.user_message(), "Stock insuficiente");
    }

    #[test]
    fn test_rejected_without_message() {
        let err = ApiError::rejected(Some("  ".to_string()));
        assert_eq!(err.user_message(), GENERIC_REJECTION);
    }

    #[test]
    fn test_status_messages() {
        let err = ApiError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), "The server returned an error (HTTP 500).");
        assert!(!err.is_unauthorized());

        let err = ApiError::Status {
            status: 401,
            message: Some("Token inválido".to_string()),
        };
        assert_eq!(err.user_message(), "Token inválido");
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_decode_message_is_generic() {
        let err = ApiError::Decode {
            context: "GET categories",
            detail: "missing field `data`".to_string(),
        };
        assert!(err.user_message().starts_with("Unexpected response"));
        assert!(err.to_string().contains("missing field"));
    }
}
