use serde::{Deserialize, Serialize};

/// A single to-do item. `created_at` is a plain `YYYY-MM-DD` day string,
/// not a timestamp; it doubles as the partition key for by-day listings
/// and the monthly aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub completed: bool,
    pub created_at: String,
}

/// Mirror of the identity provider's user record, written on first API use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendStatus::Pending => "pending",
            FriendStatus::Accepted => "accepted",
            FriendStatus::Rejected => "rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(FriendStatus::Pending),
            "accepted" => Some(FriendStatus::Accepted),
            "rejected" => Some(FriendStatus::Rejected),
            _ => None,
        }
    }
}

/// A friend connection stored as a directed request record. Once accepted
/// the relation is symmetric; read paths normalize it relative to the
/// viewer (see `domain::normalize`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRelationship {
    pub id: String,
    pub requester_id: String,
    pub requester_name: String,
    pub recipient_id: String,
    pub recipient_name: String,
    pub status: FriendStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Viewer-relative projection of an accepted relationship: always the
/// *other* party's id and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendView {
    pub relationship_id: String,
    pub friend_id: String,
    pub friend_name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStat {
    pub month: String,
    pub total: u32,
    pub completed: u32,
    pub completion_rate: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub user_id: String,
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFriendRequest {
    #[serde(default)]
    pub requester_id: String,
    #[serde(default)]
    pub requester_name: String,
    #[serde(default)]
    pub recipient_id: String,
    #[serde(default)]
    pub recipient_name: String,
}

/// Body of accept/reject calls: the user acting on the request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActingUserRequest {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUserRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friend_status_serializes_lowercase() {
        let json = serde_json::to_string(&FriendStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let back: FriendStatus = serde_json::from_str("\"accepted\"").unwrap();
        assert_eq!(back, FriendStatus::Accepted);
    }

    #[test]
    fn test_friend_status_round_trips_through_as_str() {
        for status in [
            FriendStatus::Pending,
            FriendStatus::Accepted,
            FriendStatus::Rejected,
        ] {
            assert_eq!(FriendStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(FriendStatus::parse("unknown"), None);
    }

    #[test]
    fn test_todo_uses_camel_case_field_names() {
        let todo = Todo {
            id: "01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string(),
            user_id: "user-1".to_string(),
            title: "buy milk".to_string(),
            description: String::new(),
            completed: false,
            created_at: "2025-01-05".to_string(),
        };

        let json = serde_json::to_value(&todo).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("user_id").is_none());
    }
}
