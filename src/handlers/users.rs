use lambda_http::{Body, Request, Response};

use crate::db::DynamoClient;
use crate::error::ApiError;
use crate::handlers::{json_response, read_json};
use crate::models::{UpsertUserRequest, UserProfile};

/// Mirrors the identity provider's record into the table. Idempotent: the
/// provider owns the user lifecycle, we only keep a lookup copy.
pub async fn upsert_user(req: Request, db: &DynamoClient) -> Result<Response<Body>, ApiError> {
    let input: UpsertUserRequest = read_json(&req)?;

    if input.id.trim().is_empty() || input.name.trim().is_empty() {
        return Err(ApiError::Validation("id and name are required".to_string()));
    }

    let user = UserProfile {
        id: input.id,
        name: input.name,
        email: input.email.unwrap_or_default(),
    };

    db.put_user(&user).await?;
    json_response(201, &user)
}

pub async fn get_user(db: &DynamoClient, user_id: &str) -> Result<Response<Body>, ApiError> {
    let user = db.get_user(user_id).await?.ok_or(ApiError::NotFound)?;
    json_response(200, &user)
}
