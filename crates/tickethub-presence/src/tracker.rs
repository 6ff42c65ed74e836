//! Presence tracker — which sessions are recently active and what each
//! is looking at.
//!
//! Entries are keyed by session token. A user with several sessions
//! appears once in snapshots (the most recently seen entry wins).
//! Liveness and purge are both timestamp comparisons against the
//! injected clock; last-write-wins races between heartbeats are accepted.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use tickethub_core::config::PresenceConfig;
use tickethub_core::types::id::{TicketId, UserId};
use tickethub_entity::presence::ViewKind;
use tickethub_entity::user::User;

use crate::clock::Clock;

/// One session's presence state.
#[derive(Debug, Clone)]
pub struct PresenceEntry {
    /// Snapshot of the user at their last heartbeat.
    pub user: User,
    /// The view the session is on.
    pub view: ViewKind,
    /// The ticket open in that view, if any.
    pub ticket_id: Option<TicketId>,
    /// Title of that ticket, as reported by the client.
    pub ticket_title: Option<String>,
    /// When the last heartbeat arrived.
    pub last_seen: DateTime<Utc>,
}

/// In-memory registry of active sessions.
#[derive(Debug)]
pub struct PresenceTracker {
    /// Session token → presence entry.
    entries: DashMap<String, PresenceEntry>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Entries older than this are excluded from snapshots.
    online_timeout: Duration,
    /// Entries older than this are purged entirely.
    purge_timeout: Duration,
}

impl PresenceTracker {
    /// Create a new tracker.
    pub fn new(config: &PresenceConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            online_timeout: Duration::seconds(config.online_timeout_seconds as i64),
            purge_timeout: Duration::seconds(config.purge_timeout_seconds as i64),
        }
    }

    /// Upsert a session's presence. Idempotent, infallible.
    pub fn record_heartbeat(
        &self,
        session_token: &str,
        user: User,
        view: ViewKind,
        ticket_id: Option<TicketId>,
        ticket_title: Option<String>,
    ) {
        self.entries.insert(
            session_token.to_string(),
            PresenceEntry {
                user,
                view,
                ticket_id,
                ticket_title,
                last_seen: self.clock.now(),
            },
        );
    }

    /// The liveness-filtered, per-user-deduplicated view of the registry,
    /// most recently seen first.
    pub fn snapshot(&self) -> Vec<PresenceEntry> {
        let now = self.clock.now();
        let mut per_user: HashMap<UserId, PresenceEntry> = HashMap::new();

        for entry in self.entries.iter() {
            if now - entry.last_seen > self.online_timeout {
                continue;
            }
            match per_user.get(&entry.user.id) {
                Some(existing) if existing.last_seen >= entry.last_seen => {}
                _ => {
                    per_user.insert(entry.user.id, entry.value().clone());
                }
            }
        }

        let mut list: Vec<PresenceEntry> = per_user.into_values().collect();
        list.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        list
    }

    /// Remove entries past the hard timeout. Returns the removal count.
    pub fn purge_stale(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now - entry.last_seen <= self.purge_timeout);
        before - self.entries.len()
    }

    /// Number of stored entries, including stale ones not yet purged.
    pub fn stored_len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn test_user(id: i64) -> User {
        User {
            id: UserId(id),
            telegram_id: 1000 + id,
            chat_id: None,
            username: Some(format!("user{id}")),
            first_name: format!("User{id}"),
            last_name: None,
            photo_url: None,
            is_admin: false,
            notify_own: true,
            notify_subscribed: true,
            privacy_hidden: false,
            privacy_hide_online: false,
            privacy_hide_activity: false,
            display_name: None,
            display_avatar: None,
            created_at: Utc::now(),
            last_login: Utc::now(),
        }
    }

    fn tracker() -> (PresenceTracker, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let tracker = PresenceTracker::new(&PresenceConfig::default(), clock.clone());
        (tracker, clock)
    }

    #[test]
    fn test_heartbeat_appears_in_snapshot() {
        let (tracker, _clock) = tracker();
        tracker.record_heartbeat(
            "tok-a",
            test_user(1),
            ViewKind::Ticket,
            Some(TicketId(42)),
            Some("Login bug".to_string()),
        );

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].ticket_id, Some(TicketId(42)));
        assert_eq!(snapshot[0].ticket_title.as_deref(), Some("Login bug"));
    }

    #[test]
    fn test_liveness_expiry_excludes_from_snapshot() {
        let (tracker, clock) = tracker();
        tracker.record_heartbeat("tok-a", test_user(1), ViewKind::List, None, None);

        clock.advance(Duration::seconds(61));
        assert!(tracker.snapshot().is_empty(), "61s-old entry is offline");
        // Past liveness but not yet past the hard timeout: still stored.
        assert_eq!(tracker.stored_len(), 1);
    }

    #[test]
    fn test_hard_timeout_purges_storage() {
        let (tracker, clock) = tracker();
        tracker.record_heartbeat("tok-a", test_user(1), ViewKind::List, None, None);

        clock.advance(Duration::seconds(119));
        assert_eq!(tracker.purge_stale(), 0);
        assert_eq!(tracker.stored_len(), 1);

        clock.advance(Duration::seconds(2));
        assert_eq!(tracker.purge_stale(), 1);
        assert_eq!(tracker.stored_len(), 0);
    }

    #[test]
    fn test_dedup_by_user_keeps_most_recent() {
        let (tracker, clock) = tracker();
        tracker.record_heartbeat("tok-a", test_user(1), ViewKind::List, None, None);
        clock.advance(Duration::seconds(5));
        tracker.record_heartbeat("tok-b", test_user(1), ViewKind::Kanban, None, None);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.len(), 1, "two sessions collapse to one user");
        assert_eq!(snapshot[0].view, ViewKind::Kanban, "newest entry wins");
    }

    #[test]
    fn test_heartbeat_refreshes_liveness() {
        let (tracker, clock) = tracker();
        tracker.record_heartbeat("tok-a", test_user(1), ViewKind::List, None, None);
        clock.advance(Duration::seconds(50));
        tracker.record_heartbeat("tok-a", test_user(1), ViewKind::List, None, None);
        clock.advance(Duration::seconds(50));
        assert_eq!(tracker.snapshot().len(), 1, "refreshed entry stays online");
    }
}
