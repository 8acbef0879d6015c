use thiserror::Error;

/// Error raised by the backend clients and recorded by the conversation service.
/// All variants carry owned strings so the error can be cloned into state snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    // ── Transport errors ─────────────────────────────────────────────────────
    #[error("Network error ({endpoint}): {message}")]
    Network { endpoint: String, message: String },

    #[error("API Error ({endpoint}): {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Malformed response ({endpoint}): {message}")]
    Decode { endpoint: String, message: String },

    // ── Stream errors ────────────────────────────────────────────────────────
    #[error("Stream closed abnormally: {message}")]
    Stream { message: String },

    // ── Validation errors ────────────────────────────────────────────────────
    #[error("Response from {endpoint} is missing '{field}'")]
    MissingField { endpoint: String, field: String },
}

impl ClientError {
    pub fn network(endpoint: &str, source: reqwest::Error) -> Self {
        ClientError::Network { endpoint: endpoint.to_string(), message: source.to_string() }
    }

    pub fn decode(endpoint: &str, message: impl Into<String>) -> Self {
        ClientError::Decode { endpoint: endpoint.to_string(), message: message.into() }
    }

    pub fn stream(message: impl Into<String>) -> Self {
        ClientError::Stream { message: message.into() }
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Network { .. } | ClientError::Status { .. } | ClientError::Decode { .. }
        )
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, ClientError::Stream { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::MissingField { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_names_the_endpoint() {
        let err = ClientError::Status { endpoint: "check status".to_string(), status: 503 };
        assert_eq!(err.to_string(), "API Error (check status): 503");
        assert!(err.is_transport());
        assert!(!err.is_stream());
    }

    #[test]
    fn classification_is_exclusive() {
        let stream = ClientError::stream("connection reset");
        assert!(stream.is_stream() && !stream.is_transport() && !stream.is_validation());

        let missing = ClientError::MissingField {
            endpoint: "new session".to_string(),
            field: "session_id".to_string(),
        };
        assert!(missing.is_validation() && !missing.is_transport());
    }
}
