use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;

use crate::domain::pair_key;
use crate::error::ApiError;
use crate::models::{FriendRelationship, FriendStatus, Todo, UserProfile};

/// Index over `GSI1PK = REL#{relationship id}` for id lookups.
const GSI_RELATIONSHIP_ID: &str = "GSI1";
/// Index over `GSI2PK = USER#{requester id}`.
const GSI_REQUESTER: &str = "GSI2";
/// Index over `GSI3PK = USER#{recipient id}`.
const GSI_RECIPIENT: &str = "GSI3";

/// Single-table client. Constructed once at startup and cloned into the
/// request handler; there is no process-global connection state.
///
/// Key layout:
/// - user profile:  PK=USER#{id}      SK=PROFILE
/// - todo:          PK=USER#{owner}   SK=TODO#{id}
/// - relationship:  PK=PAIR#{a}#{b}   SK=REL   (a, b in lexical order)
///
/// Keying todos under the owner makes every todo mutation owner-scoped at
/// the key level. Keying relationships by the canonical unordered pair lets
/// a single conditional put enforce "at most one live relationship per
/// pair" without transactions.
#[derive(Clone)]
pub struct DynamoClient {
    client: Client,
    table_name: String,
}

impl DynamoClient {
    pub async fn new(table_name: &str) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }

    // ----- users -----

    pub async fn put_user(&self, user: &UserProfile) -> Result<(), ApiError> {
        let pk = format!("USER#{}", user.id);

        self.client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(pk))
            .item("SK", AttributeValue::S("PROFILE".to_string()))
            .item("id", AttributeValue::S(user.id.clone()))
            .item("name", AttributeValue::S(user.name.clone()))
            .item("email", AttributeValue::S(user.email.clone()))
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(())
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, ApiError> {
        let pk = format!("USER#{user_id}");

        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk))
            .key("SK", AttributeValue::S("PROFILE".to_string()))
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(result.item().and_then(item_to_user))
    }

    // ----- todos -----

    pub async fn put_todo(&self, todo: &Todo) -> Result<(), ApiError> {
        let pk = format!("USER#{}", todo.user_id);
        let sk = format!("TODO#{}", todo.id);

        self.client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(pk))
            .item("SK", AttributeValue::S(sk))
            .item("id", AttributeValue::S(todo.id.clone()))
            .item("user_id", AttributeValue::S(todo.user_id.clone()))
            .item("title", AttributeValue::S(todo.title.clone()))
            .item("description", AttributeValue::S(todo.description.clone()))
            .item("completed", AttributeValue::Bool(todo.completed))
            .item("created_at", AttributeValue::S(todo.created_at.clone()))
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(())
    }

    /// All todos for an owner, newest day first.
    pub async fn list_todos(&self, owner_id: &str) -> Result<Vec<Todo>, ApiError> {
        let pk = format!("USER#{owner_id}");

        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
            .expression_attribute_values(":pk", AttributeValue::S(pk))
            .expression_attribute_values(":sk_prefix", AttributeValue::S("TODO#".to_string()))
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let mut todos: Vec<Todo> = result.items().iter().filter_map(item_to_todo).collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(todos)
    }

    /// Todos whose day string equals `date` exactly. Exact string equality
    /// is the query contract; there is no range semantics here.
    pub async fn list_todos_by_date(
        &self,
        owner_id: &str,
        date: &str,
    ) -> Result<Vec<Todo>, ApiError> {
        let pk = format!("USER#{owner_id}");

        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
            .filter_expression("created_at = :date")
            .expression_attribute_values(":pk", AttributeValue::S(pk))
            .expression_attribute_values(":sk_prefix", AttributeValue::S("TODO#".to_string()))
            .expression_attribute_values(":date", AttributeValue::S(date.to_string()))
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(result.items().iter().filter_map(item_to_todo).collect())
    }

    /// Partial update of title/completed. The owner id is part of the item
    /// key, so a caller can only ever touch their own todos; a wrong owner
    /// or unknown id both surface as NotFound.
    pub async fn update_todo(
        &self,
        owner_id: &str,
        todo_id: &str,
        title: Option<&str>,
        completed: Option<bool>,
    ) -> Result<Todo, ApiError> {
        let pk = format!("USER#{owner_id}");
        let sk = format!("TODO#{todo_id}");

        let mut update_parts = Vec::new();
        let mut builder = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk))
            .key("SK", AttributeValue::S(sk))
            .condition_expression("attribute_exists(PK)")
            .return_values(ReturnValue::AllNew);

        if let Some(t) = title {
            update_parts.push("title = :title");
            builder =
                builder.expression_attribute_values(":title", AttributeValue::S(t.to_string()));
        }

        if let Some(c) = completed {
            update_parts.push("completed = :completed");
            builder = builder.expression_attribute_values(":completed", AttributeValue::Bool(c));
        }

        let expression = format!("SET {}", update_parts.join(", "));
        builder = builder.update_expression(expression);

        let result = builder.send().await.map_err(|e| {
            let service_err = e.into_service_error();
            if service_err.is_conditional_check_failed_exception() {
                ApiError::NotFound
            } else {
                ApiError::Internal(service_err.to_string())
            }
        })?;

        let item = result.attributes().ok_or(ApiError::NotFound)?;
        item_to_todo(item)
            .ok_or_else(|| ApiError::Internal("Failed to parse updated item".to_string()))
    }

    /// Idempotent: deleting an absent todo is not an error.
    pub async fn delete_todo(&self, owner_id: &str, todo_id: &str) -> Result<(), ApiError> {
        let pk = format!("USER#{owner_id}");
        let sk = format!("TODO#{todo_id}");

        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk))
            .key("SK", AttributeValue::S(sk))
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(())
    }

    // ----- friend relationships -----

    /// Inserts a pending request for the pair. The conditional expression is
    /// the store-level uniqueness guard: the put succeeds only when no item
    /// exists for the pair or the existing one is rejected (a rejected
    /// record is superseded by the new request). A lost race between two
    /// concurrent requests fails the condition and surfaces as Conflict.
    pub async fn create_relationship(&self, rel: &FriendRelationship) -> Result<(), ApiError> {
        let pk = format!("PAIR#{}", pair_key(&rel.requester_id, &rel.recipient_id));

        self.client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(pk))
            .item("SK", AttributeValue::S("REL".to_string()))
            .item("GSI1PK", AttributeValue::S(format!("REL#{}", rel.id)))
            .item(
                "GSI2PK",
                AttributeValue::S(format!("USER#{}", rel.requester_id)),
            )
            .item(
                "GSI3PK",
                AttributeValue::S(format!("USER#{}", rel.recipient_id)),
            )
            .item("id", AttributeValue::S(rel.id.clone()))
            .item("requester_id", AttributeValue::S(rel.requester_id.clone()))
            .item(
                "requester_name",
                AttributeValue::S(rel.requester_name.clone()),
            )
            .item("recipient_id", AttributeValue::S(rel.recipient_id.clone()))
            .item(
                "recipient_name",
                AttributeValue::S(rel.recipient_name.clone()),
            )
            .item("status", AttributeValue::S(rel.status.as_str().to_string()))
            .item("created_at", AttributeValue::S(rel.created_at.clone()))
            .item("updated_at", AttributeValue::S(rel.updated_at.clone()))
            .condition_expression("attribute_not_exists(PK) OR #status = :rejected")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(
                ":rejected",
                AttributeValue::S(FriendStatus::Rejected.as_str().to_string()),
            )
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_conditional_check_failed_exception() {
                    ApiError::Conflict("A friend request is already pending".to_string())
                } else {
                    ApiError::Internal(service_err.to_string())
                }
            })?;

        Ok(())
    }

    pub async fn find_relationship_by_pair(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> Result<Option<FriendRelationship>, ApiError> {
        let pk = format!("PAIR#{}", pair_key(user_a, user_b));

        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk))
            .key("SK", AttributeValue::S("REL".to_string()))
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(result.item().and_then(item_to_relationship))
    }

    pub async fn find_relationship_by_id(
        &self,
        relationship_id: &str,
    ) -> Result<Option<FriendRelationship>, ApiError> {
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(GSI_RELATIONSHIP_ID)
            .key_condition_expression("GSI1PK = :pk")
            .expression_attribute_values(
                ":pk",
                AttributeValue::S(format!("REL#{relationship_id}")),
            )
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(result.items().iter().find_map(item_to_relationship))
    }

    /// Moves a pending relationship to `accepted` or `rejected`. The
    /// condition on the stored status closes the race between two resolvers:
    /// whoever loses sees NotFound, same as resolving an already-resolved
    /// request.
    pub async fn resolve_relationship(
        &self,
        rel: &FriendRelationship,
        new_status: FriendStatus,
        updated_at: &str,
    ) -> Result<FriendRelationship, ApiError> {
        let pk = format!("PAIR#{}", pair_key(&rel.requester_id, &rel.recipient_id));

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk))
            .key("SK", AttributeValue::S("REL".to_string()))
            .update_expression("SET #status = :status, updated_at = :updated_at")
            .condition_expression("#id = :id AND #status = :pending")
            .expression_attribute_names("#id", "id")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(
                ":status",
                AttributeValue::S(new_status.as_str().to_string()),
            )
            .expression_attribute_values(":updated_at", AttributeValue::S(updated_at.to_string()))
            .expression_attribute_values(":id", AttributeValue::S(rel.id.clone()))
            .expression_attribute_values(
                ":pending",
                AttributeValue::S(FriendStatus::Pending.as_str().to_string()),
            )
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_conditional_check_failed_exception() {
                    ApiError::NotFound
                } else {
                    ApiError::Internal(service_err.to_string())
                }
            })?;

        let item = result.attributes().ok_or(ApiError::NotFound)?;
        item_to_relationship(item)
            .ok_or_else(|| ApiError::Internal("Failed to parse updated item".to_string()))
    }

    /// Relationships with the given status where the user is either party.
    /// A user is never both parties of one record, so the two index queries
    /// cannot overlap.
    pub async fn list_relationships_for_user(
        &self,
        user_id: &str,
        status: FriendStatus,
    ) -> Result<Vec<FriendRelationship>, ApiError> {
        let mut relationships = self
            .query_relationships(GSI_REQUESTER, "GSI2PK", user_id, status)
            .await?;
        let as_recipient = self
            .query_relationships(GSI_RECIPIENT, "GSI3PK", user_id, status)
            .await?;
        relationships.extend(as_recipient);

        Ok(relationships)
    }

    async fn query_relationships(
        &self,
        index: &str,
        index_pk: &str,
        user_id: &str,
        status: FriendStatus,
    ) -> Result<Vec<FriendRelationship>, ApiError> {
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(index)
            .key_condition_expression(format!("{index_pk} = :pk"))
            .filter_expression("#status = :status")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(":pk", AttributeValue::S(format!("USER#{user_id}")))
            .expression_attribute_values(
                ":status",
                AttributeValue::S(status.as_str().to_string()),
            )
            .send()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(result.items().iter().filter_map(item_to_relationship).collect())
    }
}

fn item_to_todo(item: &HashMap<String, AttributeValue>) -> Option<Todo> {
    Some(Todo {
        id: item.get("id")?.as_s().ok()?.clone(),
        user_id: item.get("user_id")?.as_s().ok()?.clone(),
        title: item.get("title")?.as_s().ok()?.clone(),
        description: item
            .get("description")
            .and_then(|v| v.as_s().ok())
            .cloned()
            .unwrap_or_default(),
        completed: *item.get("completed")?.as_bool().ok()?,
        created_at: item.get("created_at")?.as_s().ok()?.clone(),
    })
}

fn item_to_relationship(item: &HashMap<String, AttributeValue>) -> Option<FriendRelationship> {
    Some(FriendRelationship {
        id: item.get("id")?.as_s().ok()?.clone(),
        requester_id: item.get("requester_id")?.as_s().ok()?.clone(),
        requester_name: item.get("requester_name")?.as_s().ok()?.clone(),
        recipient_id: item.get("recipient_id")?.as_s().ok()?.clone(),
        recipient_name: item.get("recipient_name")?.as_s().ok()?.clone(),
        status: FriendStatus::parse(item.get("status")?.as_s().ok()?)?,
        created_at: item.get("created_at")?.as_s().ok()?.clone(),
        updated_at: item.get("updated_at")?.as_s().ok()?.clone(),
    })
}

fn item_to_user(item: &HashMap<String, AttributeValue>) -> Option<UserProfile> {
    Some(UserProfile {
        id: item.get("id")?.as_s().ok()?.clone(),
        name: item.get("name")?.as_s().ok()?.clone(),
        email: item
            .get("email")
            .and_then(|v| v.as_s().ok())
            .cloned()
            .unwrap_or_default(),
    })
}
