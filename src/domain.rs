use std::collections::BTreeMap;

use crate::models::{FriendRelationship, FriendStatus, FriendView, MonthlyStat, Todo};

/// A calendar day as a `YYYY-MM-DD` string with validated shape.
///
/// Only the shape is checked (digits and dash positions), not the real
/// calendar: day strings are compared by exact string equality everywhere,
/// so an unpadded "2025-3-10" is rejected at construction instead of
/// silently never matching anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayStamp(String);

impl DayStamp {
    pub fn parse(raw: &str) -> Option<Self> {
        let bytes = raw.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return None;
        }
        let digits_ok = bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !digits_ok {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    /// Current server-local calendar date.
    pub fn today() -> Self {
        Self(chrono::Local::now().format("%Y-%m-%d").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `YYYY-MM` prefix used for monthly grouping.
    pub fn month(&self) -> &str {
        &self.0[..7]
    }
}

impl std::fmt::Display for DayStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical key for the unordered user pair of a relationship. Both
/// directions of a request map to the same key, which is what lets the
/// store enforce at most one live relationship per pair with a single
/// conditional write.
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}#{b}")
    } else {
        format!("{b}#{a}")
    }
}

/// Only the recipient of a pending request may accept it.
pub fn can_accept(rel: &FriendRelationship, user_id: &str) -> bool {
    rel.status == FriendStatus::Pending && rel.recipient_id == user_id
}

/// Either party of a pending request may reject it: the recipient declines,
/// the requester cancels. Anyone else is treated as if the request did not
/// exist.
pub fn can_reject(rel: &FriendRelationship, user_id: &str) -> bool {
    rel.status == FriendStatus::Pending
        && (rel.requester_id == user_id || rel.recipient_id == user_id)
}

/// Resolves a directional relationship record into the viewer-relative
/// friend projection. Returns `None` when the viewer is not a party.
pub fn normalize(rel: &FriendRelationship, viewer_id: &str) -> Option<FriendView> {
    let (friend_id, friend_name) = if rel.requester_id == viewer_id {
        (&rel.recipient_id, &rel.recipient_name)
    } else if rel.recipient_id == viewer_id {
        (&rel.requester_id, &rel.requester_name)
    } else {
        return None;
    };

    Some(FriendView {
        relationship_id: rel.id.clone(),
        friend_id: friend_id.clone(),
        friend_name: friend_name.clone(),
        created_at: rel.created_at.clone(),
        updated_at: rel.updated_at.clone(),
    })
}

/// Groups an owner's todos by the `YYYY-MM` prefix of their day string and
/// computes per-month completion, sorted ascending by month.
pub fn monthly_stats(todos: &[Todo]) -> Vec<MonthlyStat> {
    let mut buckets: BTreeMap<&str, (u32, u32)> = BTreeMap::new();

    for todo in todos {
        // Legacy rows may hold day strings shorter than the YYYY-MM prefix.
        let month = todo.created_at.get(..7).unwrap_or(&todo.created_at);
        let entry = buckets.entry(month).or_insert((0, 0));
        entry.0 += 1;
        if todo.completed {
            entry.1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(month, (total, completed))| MonthlyStat {
            month: month.to_string(),
            total,
            completed,
            completion_rate: completion_rate(completed, total),
        })
        .collect()
}

/// Completion percentage rounded to one decimal place; 0 when there are no
/// todos in the bucket.
fn completion_rate(completed: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = f64::from(completed) / f64::from(total) * 100.0;
    (rate * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relationship(requester: &str, recipient: &str, status: FriendStatus) -> FriendRelationship {
        FriendRelationship {
            id: "01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string(),
            requester_id: requester.to_string(),
            requester_name: format!("{requester}-name"),
            recipient_id: recipient.to_string(),
            recipient_name: format!("{recipient}-name"),
            status,
            created_at: "2025-04-01T09:00:00+00:00".to_string(),
            updated_at: "2025-04-02T09:00:00+00:00".to_string(),
        }
    }

    fn todo(created_at: &str, completed: bool) -> Todo {
        Todo {
            id: ulid::Ulid::new().to_string(),
            user_id: "owner".to_string(),
            title: "task".to_string(),
            description: String::new(),
            completed,
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_day_stamp_accepts_padded_dates() {
        let day = DayStamp::parse("2025-03-10").unwrap();
        assert_eq!(day.as_str(), "2025-03-10");
        assert_eq!(day.month(), "2025-03");
    }

    #[test]
    fn test_day_stamp_rejects_unpadded_and_malformed_input() {
        assert!(DayStamp::parse("2025-3-10").is_none());
        assert!(DayStamp::parse("2025-03-1").is_none());
        assert!(DayStamp::parse("2025/03/10").is_none());
        assert!(DayStamp::parse("20250310").is_none());
        assert!(DayStamp::parse("2025-03-10T00:00:00Z").is_none());
        assert!(DayStamp::parse("").is_none());
    }

    #[test]
    fn test_day_stamp_does_not_check_the_real_calendar() {
        // Shape-only validation: the day string is an opaque partition key.
        assert!(DayStamp::parse("2025-13-40").is_some());
    }

    #[test]
    fn test_today_has_day_stamp_shape() {
        let today = DayStamp::today();
        assert!(DayStamp::parse(today.as_str()).is_some());
    }

    #[test]
    fn test_pair_key_is_direction_independent() {
        assert_eq!(pair_key("alice", "bob"), pair_key("bob", "alice"));
        assert_eq!(pair_key("alice", "bob"), "alice#bob");
    }

    #[test]
    fn test_only_recipient_can_accept_pending() {
        let rel = relationship("alice", "bob", FriendStatus::Pending);
        assert!(can_accept(&rel, "bob"));
        assert!(!can_accept(&rel, "alice"));
        assert!(!can_accept(&rel, "carol"));
    }

    #[test]
    fn test_accept_requires_pending_status() {
        let rel = relationship("alice", "bob", FriendStatus::Accepted);
        assert!(!can_accept(&rel, "bob"));
    }

    #[test]
    fn test_either_party_can_reject_but_not_third_parties() {
        let rel = relationship("alice", "bob", FriendStatus::Pending);
        assert!(can_reject(&rel, "bob"));
        assert!(can_reject(&rel, "alice"), "requester cancel must succeed");
        assert!(!can_reject(&rel, "carol"));

        let rejected = relationship("alice", "bob", FriendStatus::Rejected);
        assert!(!can_reject(&rejected, "bob"));
    }

    #[test]
    fn test_normalize_returns_the_other_party() {
        let rel = relationship("alice", "bob", FriendStatus::Accepted);

        let for_alice = normalize(&rel, "alice").unwrap();
        assert_eq!(for_alice.friend_id, "bob");
        assert_eq!(for_alice.friend_name, "bob-name");

        let for_bob = normalize(&rel, "bob").unwrap();
        assert_eq!(for_bob.friend_id, "alice");
        assert_eq!(for_bob.friend_name, "alice-name");

        // Never the viewer's own id, regardless of direction.
        assert_ne!(for_alice.friend_id, "alice");
        assert_ne!(for_bob.friend_id, "bob");
    }

    #[test]
    fn test_normalize_rejects_non_participants() {
        let rel = relationship("alice", "bob", FriendStatus::Accepted);
        assert!(normalize(&rel, "carol").is_none());
    }

    #[test]
    fn test_monthly_stats_groups_and_rounds() {
        let todos = vec![
            todo("2025-01-05", true),
            todo("2025-01-09", false),
            todo("2025-02-01", true),
        ];

        let stats = monthly_stats(&todos);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].month, "2025-01");
        assert_eq!(stats[0].total, 2);
        assert_eq!(stats[0].completed, 1);
        assert_eq!(stats[0].completion_rate, 50.0);
        assert_eq!(stats[1].month, "2025-02");
        assert_eq!(stats[1].total, 1);
        assert_eq!(stats[1].completed, 1);
        assert_eq!(stats[1].completion_rate, 100.0);
    }

    #[test]
    fn test_monthly_stats_sorted_ascending_by_month() {
        let todos = vec![
            todo("2025-12-01", false),
            todo("2025-01-01", false),
            todo("2025-06-15", false),
        ];

        let months: Vec<String> = monthly_stats(&todos).into_iter().map(|s| s.month).collect();
        assert_eq!(months, vec!["2025-01", "2025-06", "2025-12"]);
    }

    #[test]
    fn test_monthly_stats_rounds_to_one_decimal() {
        let todos = vec![
            todo("2025-03-01", true),
            todo("2025-03-02", false),
            todo("2025-03-03", false),
        ];

        let stats = monthly_stats(&todos);
        assert_eq!(stats[0].completion_rate, 33.3);
    }

    #[test]
    fn test_monthly_stats_empty_input() {
        assert!(monthly_stats(&[]).is_empty());
    }
}
