use lambda_http::{Body, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    /// Duplicate friend relationship. Kept at 400 to match the public API
    /// contract, not 409.
    #[error("{0}")]
    Conflict(String),

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => 400,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound => 404,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> Response<Body> {
        let status = self.status_code();
        let message = match &self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = serde_json::json!({ "error": message }).to_string();

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Validation(format!("Invalid JSON: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Validation("x".to_string()).status_code(), 400);
        assert_eq!(ApiError::Conflict("x".to_string()).status_code(), 400);
        assert_eq!(ApiError::Forbidden("x".to_string()).status_code(), 403);
        assert_eq!(ApiError::NotFound.status_code(), 404);
        assert_eq!(ApiError::Internal("x".to_string()).status_code(), 500);
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let resp = ApiError::Internal("table missing".to_string()).into_response();
        assert_eq!(resp.status(), 500);
        let body = match resp.body() {
            Body::Text(text) => text.clone(),
            other => panic!("unexpected body: {other:?}"),
        };
        assert!(!body.contains("table missing"));
        assert!(body.contains("Internal server error"));
    }

    #[test]
    fn test_error_body_shape() {
        let resp = ApiError::NotFound.into_response();
        let body = match resp.body() {
            Body::Text(text) => text.clone(),
            other => panic!("unexpected body: {other:?}"),
        };
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Not found");
    }
}
