use lambda_http::{Body, Request, Response};

use crate::db::DynamoClient;
use crate::domain::{self, DayStamp};
use crate::error::ApiError;
use crate::handlers::{json_response, read_json, require_query_param};
use crate::models::{CreateTodoRequest, Todo, UpdateTodoRequest};

pub async fn create_todo(req: Request, db: &DynamoClient) -> Result<Response<Body>, ApiError> {
    let input: CreateTodoRequest = read_json(&req)?;

    if input.user_id.trim().is_empty() || input.title.trim().is_empty() {
        return Err(ApiError::Validation(
            "userId and title are required".to_string(),
        ));
    }

    let created_at = match input.created_at.as_deref() {
        Some(raw) => DayStamp::parse(raw).ok_or_else(|| {
            ApiError::Validation("createdAt must be a YYYY-MM-DD date string".to_string())
        })?,
        None => DayStamp::today(),
    };

    let todo = Todo {
        id: ulid::Ulid::new().to_string(),
        user_id: input.user_id,
        title: input.title,
        description: input.description.unwrap_or_default(),
        completed: false,
        created_at: created_at.to_string(),
    };

    db.put_todo(&todo).await?;
    json_response(201, &todo)
}

pub async fn list_todos(db: &DynamoClient, owner_id: &str) -> Result<Response<Body>, ApiError> {
    let todos = db.list_todos(owner_id).await?;
    json_response(200, &todos)
}

pub async fn list_todos_by_date(
    req: Request,
    db: &DynamoClient,
) -> Result<Response<Body>, ApiError> {
    let user_id = require_query_param(&req, "userId")?;
    let date = require_query_param(&req, "date")?;
    let date = DayStamp::parse(&date).ok_or_else(|| {
        ApiError::Validation("date must be a YYYY-MM-DD date string".to_string())
    })?;

    let todos = db.list_todos_by_date(&user_id, date.as_str()).await?;
    json_response(200, &todos)
}

pub async fn update_todo(
    req: Request,
    db: &DynamoClient,
    todo_id: &str,
) -> Result<Response<Body>, ApiError> {
    let input: UpdateTodoRequest = read_json(&req)?;

    if input.user_id.trim().is_empty() {
        return Err(ApiError::Validation("userId is required".to_string()));
    }

    if input.title.is_none() && input.completed.is_none() {
        return Err(ApiError::Validation(
            "At least one of 'title' or 'completed' is required".to_string(),
        ));
    }

    let todo = db
        .update_todo(
            &input.user_id,
            todo_id,
            input.title.as_deref(),
            input.completed,
        )
        .await?;

    json_response(200, &todo)
}

pub async fn delete_todo(
    req: Request,
    db: &DynamoClient,
    todo_id: &str,
) -> Result<Response<Body>, ApiError> {
    let user_id = require_query_param(&req, "userId")?;

    db.delete_todo(&user_id, todo_id).await?;
    Ok(Response::builder().status(204).body(Body::Empty).unwrap())
}

pub async fn monthly_stats(req: Request, db: &DynamoClient) -> Result<Response<Body>, ApiError> {
    let user_id = require_query_param(&req, "userId")?;

    let todos = db.list_todos(&user_id).await?;
    let stats = domain::monthly_stats(&todos);
    json_response(200, &stats)
}
