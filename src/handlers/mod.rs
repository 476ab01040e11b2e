use lambda_http::{Body, Request, RequestExt, Response};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub mod friends;
pub mod todos;
pub mod users;

pub(crate) fn json_response(
    status: u16,
    body: &impl serde::Serialize,
) -> Result<Response<Body>, ApiError> {
    let json = serde_json::to_string(body).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(json))
        .unwrap())
}

pub(crate) fn read_json<T: DeserializeOwned>(req: &Request) -> Result<T, ApiError> {
    let body_str = match req.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8(b.to_vec())
            .map_err(|_| ApiError::Validation("Invalid UTF-8".to_string()))?,
        Body::Empty => return Err(ApiError::Validation("Empty body".to_string())),
    };

    Ok(serde_json::from_str(&body_str)?)
}

pub(crate) fn require_query_param(req: &Request, name: &str) -> Result<String, ApiError> {
    req.query_string_parameters()
        .first(name)
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Validation(format!("Query parameter '{name}' is required")))
}
