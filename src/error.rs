use reqwest::StatusCode;
use thiserror::Error;

/// Longest response body kept inside an error message.
const MAX_ERROR_BODY_LENGTH: usize = 300;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("API rate limit reached")]
    RateLimited,

    #[error("http {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS {
            return ApiError::RateLimited;
        }
        ApiError::Http {
            status: status.as_u16(),
            body: truncate_body(body),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    #[error("database connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Query(String),

    #[error("{0}")]
    Validation(String),

    #[error("database connection is required for this page")]
    Unavailable,
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        DbError::Query(err.to_string())
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DbError::Connect(err.to_string())
            }
            other => DbError::Query(other.to_string()),
        }
    }
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= MAX_ERROR_BODY_LENGTH {
        return trimmed.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes)", &trimmed[..end], trimmed.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_maps_to_rate_limited() {
        let err = ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(err, ApiError::RateLimited));
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundary() {
        let body = "é".repeat(400);
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, &body);
        let ApiError::Http { status, body } = err else {
            panic!("expected http error");
        };
        assert_eq!(status, 502);
        assert!(body.ends_with("(800 bytes)"));
    }
}
