use lambda_http::{Body, Request, Response};

use crate::db::DynamoClient;
use crate::error::ApiError;
use crate::handlers::{friends, todos, users};

pub async fn route(req: Request, db: &DynamoClient) -> Result<Response<Body>, lambda_http::Error> {
    let path = req.uri().path().to_string();
    let method = req.method().as_str().to_string();

    tracing::info!(path = %path, method = %method, "Incoming request");

    let result = match route_inner(req, db, &path, &method).await {
        Ok(mut resp) => {
            add_cors_headers(&mut resp);
            resp
        }
        Err(e) => {
            tracing::error!(error = %e, path = %path, "Request failed");
            let mut resp = e.into_response();
            add_cors_headers(&mut resp);
            resp
        }
    };

    Ok(result)
}

async fn route_inner(
    req: Request,
    db: &DynamoClient,
    path: &str,
    method: &str,
) -> Result<Response<Body>, ApiError> {
    if method == "OPTIONS" {
        return Ok(Response::builder().status(204).body(Body::Empty).unwrap());
    }

    let segments = path_segments(path);

    match (method, segments.as_slice()) {
        ("POST", ["todos"]) => todos::create_todo(req, db).await,
        ("GET", ["todos", "by-date"]) => todos::list_todos_by_date(req, db).await,
        ("GET", ["todos", "stats", "monthly"]) => todos::monthly_stats(req, db).await,
        ("GET", ["todos", owner_id]) => todos::list_todos(db, owner_id).await,
        ("PUT", ["todos", todo_id]) => todos::update_todo(req, db, todo_id).await,
        ("DELETE", ["todos", todo_id]) => todos::delete_todo(req, db, todo_id).await,
        ("POST", ["friends", "requests"]) => friends::send_request(req, db).await,
        ("GET", ["friends", "requests"]) => friends::list_pending(req, db).await,
        ("POST", ["friends", "requests", id, "accept"]) => {
            friends::accept_request(req, db, id).await
        }
        ("POST", ["friends", "requests", id, "reject"]) => {
            friends::reject_request(req, db, id).await
        }
        ("GET", ["friends"]) => friends::list_friends(req, db).await,
        ("GET", ["friends", id]) => friends::friend_detail(req, db, id).await,
        ("POST", ["users"]) => users::upsert_user(req, db).await,
        ("GET", ["users", user_id]) => users::get_user(db, user_id).await,
        _ => Err(ApiError::NotFound),
    }
}

fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn add_cors_headers(resp: &mut Response<Body>) {
    let headers = resp.headers_mut();
    headers.insert("Access-Control-Allow-Origin", "*".parse().unwrap());
    headers.insert(
        "Access-Control-Allow-Methods",
        "GET,POST,PUT,DELETE,OPTIONS".parse().unwrap(),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        "Content-Type,Authorization".parse().unwrap(),
    );
}
