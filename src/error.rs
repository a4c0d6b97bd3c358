// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("{service} authentication failed, check the username and API token")]
    Unauthorized { service: &'static str },

    #[error("{service} denied access to {resource}")]
    Forbidden {
        service: &'static str,
        resource: String,
    },

    #[error("{service} resource not found: {resource}")]
    NotFound {
        service: &'static str,
        resource: String,
    },

    #[error("{service} returned {status} {text}")]
    Status {
        service: &'static str,
        status: u16,
        text: String,
    },

    #[error("Unexpected {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ApiError {
    /// Classify a non-success HTTP status returned for `resource`.
    pub fn from_status(service: &'static str, status: StatusCode, resource: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized { service },
            StatusCode::FORBIDDEN => ApiError::Forbidden {
                service,
                resource: resource.to_string(),
            },
            StatusCode::NOT_FOUND => ApiError::NotFound {
                service,
                resource: resource.to_string(),
            },
            other => ApiError::Status {
                service,
                status: other.as_u16(),
                text: other.canonical_reason().unwrap_or("Unknown status").to_string(),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let err = ApiError::from_status("Confluence", StatusCode::UNAUTHORIZED, "/content/1");
        assert!(matches!(err, ApiError::Unauthorized { .. }));

        let err = ApiError::from_status("Jira", StatusCode::FORBIDDEN, "/issue/ABC-1");
        assert!(matches!(err, ApiError::Forbidden { ref resource, .. } if resource == "/issue/ABC-1"));

        let err = ApiError::from_status("Jira", StatusCode::NOT_FOUND, "/issue/ABC-1");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_other_status_keeps_code_and_text() {
        let err = ApiError::from_status("Confluence", StatusCode::BAD_GATEWAY, "/content/search");
        match err {
            ApiError::Status { status, ref text, .. } => {
                assert_eq!(status, 502);
                assert_eq!(text, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            ApiError::from_status("Confluence", StatusCode::BAD_GATEWAY, "/x").to_string(),
            "Confluence returned 502 Bad Gateway"
        );
    }
}
