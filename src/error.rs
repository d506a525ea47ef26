use thiserror::Error;

/// Everything that can go wrong talking to the survey service, plus the
/// client-side validation failures that are caught before a request is sent.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// Build a server error from a non-2xx status and its raw body. Django
    /// REST error bodies carry the detail under `message` or `error`.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .or_else(|| value.get("error"))
                    .and_then(|field| field.as_str().map(String::from))
            })
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    "request failed".to_string()
                } else {
                    body.trim().to_string()
                }
            });

        ApiError::Server { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_message_field_from_body() {
        let err = ApiError::from_status(403, r#"{"message": "This survey is not active"}"#);
        assert_eq!(err.to_string(), "server returned 403: This survey is not active");
    }

    #[test]
    fn falls_back_to_error_field() {
        let err = ApiError::from_status(400, r#"{"error": "No file provided"}"#);
        assert_eq!(err.to_string(), "server returned 400: No file provided");
    }

    #[test]
    fn uses_raw_body_when_not_json() {
        let err = ApiError::from_status(502, "Bad Gateway");
        assert_eq!(err.to_string(), "server returned 502: Bad Gateway");
    }

    #[test]
    fn empty_body_gets_generic_message() {
        let err = ApiError::from_status(500, "   ");
        assert_eq!(err.to_string(), "server returned 500: request failed");
    }
}
