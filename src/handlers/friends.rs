use lambda_http::{Body, Request, Response};

use crate::db::DynamoClient;
use crate::domain;
use crate::error::ApiError;
use crate::handlers::{json_response, read_json, require_query_param};
use crate::models::{ActingUserRequest, FriendRelationship, FriendStatus, SendFriendRequest};

pub async fn send_request(req: Request, db: &DynamoClient) -> Result<Response<Body>, ApiError> {
    let input: SendFriendRequest = read_json(&req)?;

    let fields = [
        &input.requester_id,
        &input.requester_name,
        &input.recipient_id,
        &input.recipient_name,
    ];
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(ApiError::Validation(
            "requesterId, requesterName, recipientId and recipientName are required".to_string(),
        ));
    }

    if input.requester_id == input.recipient_id {
        return Err(ApiError::Validation(
            "Cannot send a friend request to yourself".to_string(),
        ));
    }

    // Symmetric duplicate guard: one check covers both directions because
    // the record is keyed by the unordered pair. The conditional put inside
    // create_relationship covers the race this check leaves open.
    if let Some(existing) = db
        .find_relationship_by_pair(&input.requester_id, &input.recipient_id)
        .await?
    {
        match existing.status {
            FriendStatus::Accepted => {
                return Err(ApiError::Conflict("Already friends".to_string()));
            }
            FriendStatus::Pending => {
                return Err(ApiError::Conflict(
                    "A friend request is already pending".to_string(),
                ));
            }
            FriendStatus::Rejected => {}
        }
    }

    let now = chrono::Utc::now().to_rfc3339();
    let relationship = FriendRelationship {
        id: ulid::Ulid::new().to_string(),
        requester_id: input.requester_id,
        requester_name: input.requester_name,
        recipient_id: input.recipient_id,
        recipient_name: input.recipient_name,
        status: FriendStatus::Pending,
        created_at: now.clone(),
        updated_at: now,
    };

    db.create_relationship(&relationship).await?;
    json_response(201, &relationship)
}

pub async fn list_pending(req: Request, db: &DynamoClient) -> Result<Response<Body>, ApiError> {
    let user_id = require_query_param(&req, "userId")?;

    let mut pending = db
        .list_relationships_for_user(&user_id, FriendStatus::Pending)
        .await?;
    pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    json_response(200, &pending)
}

pub async fn accept_request(
    req: Request,
    db: &DynamoClient,
    relationship_id: &str,
) -> Result<Response<Body>, ApiError> {
    resolve_request(req, db, relationship_id, FriendStatus::Accepted).await
}

pub async fn reject_request(
    req: Request,
    db: &DynamoClient,
    relationship_id: &str,
) -> Result<Response<Body>, ApiError> {
    resolve_request(req, db, relationship_id, FriendStatus::Rejected).await
}

async fn resolve_request(
    req: Request,
    db: &DynamoClient,
    relationship_id: &str,
    new_status: FriendStatus,
) -> Result<Response<Body>, ApiError> {
    let input: ActingUserRequest = read_json(&req)?;
    if input.user_id.trim().is_empty() {
        return Err(ApiError::Validation("userId is required".to_string()));
    }

    let rel = db
        .find_relationship_by_id(relationship_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    // A caller who is not eligible gets the same NotFound as a missing or
    // already-resolved request; existence is not revealed to outsiders.
    let eligible = match new_status {
        FriendStatus::Accepted => domain::can_accept(&rel, &input.user_id),
        FriendStatus::Rejected => domain::can_reject(&rel, &input.user_id),
        FriendStatus::Pending => false,
    };
    if !eligible {
        return Err(ApiError::NotFound);
    }

    let now = chrono::Utc::now().to_rfc3339();
    let updated = db.resolve_relationship(&rel, new_status, &now).await?;
    json_response(200, &updated)
}

pub async fn list_friends(req: Request, db: &DynamoClient) -> Result<Response<Body>, ApiError> {
    let user_id = require_query_param(&req, "userId")?;

    let mut accepted = db
        .list_relationships_for_user(&user_id, FriendStatus::Accepted)
        .await?;
    accepted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    let friends: Vec<_> = accepted
        .iter()
        .filter_map(|rel| domain::normalize(rel, &user_id))
        .collect();

    json_response(200, &friends)
}

pub async fn friend_detail(
    req: Request,
    db: &DynamoClient,
    relationship_id: &str,
) -> Result<Response<Body>, ApiError> {
    let user_id = require_query_param(&req, "userId")?;

    let rel = db
        .find_relationship_by_id(relationship_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if rel.status != FriendStatus::Accepted {
        return Err(ApiError::NotFound);
    }

    let view = domain::normalize(&rel, &user_id).ok_or_else(|| {
        ApiError::Forbidden("You are not a participant in this friendship".to_string())
    })?;

    json_response(200, &view)
}
