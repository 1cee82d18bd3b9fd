use lambda_http::{http::StatusCode, Body, Error, Response};
use thiserror::Error;

/// API-wide error taxonomy. Services return these; the HTTP layer turns
/// them into `{"error": "..."}` JSON with the matching status.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("User not found")]
    UserNotFound,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("External service failure: {0}")]
    ExternalService(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn store(message: impl std::fmt::Display) -> Self {
        Self::StoreUnavailable(message.to_string())
    }

    pub fn external(message: impl std::fmt::Display) -> Self {
        Self::ExternalService(message.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::UserNotFound | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ExternalService(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Build the error response for a failed request.
pub fn error_response(err: &ApiError) -> Result<Response<Body>, Error> {
    if err.status().is_server_error() {
        tracing::error!("request failed: {}", err);
    }
    Ok(Response::builder()
        .status(err.status())
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(
            serde_json::json!({ "error": err.to_string() })
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            ApiError::InvalidIdentifier("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::NotFound("Product").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::validation("User ID is required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::store("timed out").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::external("ses rejected").status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(ApiError::NotFound("Product").to_string(), "Product not found");
    }
}
