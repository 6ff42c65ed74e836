//! Typing tracker — short-lived "user is composing" signals per ticket.
//!
//! Entries expire after a few seconds and are pruned lazily on the read
//! path; no timer is needed. Not persisted, not broadcast — peers poll.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use tickethub_core::config::PresenceConfig;
use tickethub_core::types::id::{TicketId, UserId};
use tickethub_entity::user::User;

use crate::clock::Clock;

#[derive(Debug, Clone)]
struct TypingEntry {
    user: User,
    at: DateTime<Utc>,
}

/// In-memory registry of who is typing in which ticket.
#[derive(Debug)]
pub struct TypingTracker {
    /// Ticket → (user → typing entry).
    entries: DashMap<TicketId, HashMap<UserId, TypingEntry>>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Entries older than this are treated as not-typing.
    timeout: Duration,
}

impl TypingTracker {
    /// Create a new typing tracker.
    pub fn new(config: &PresenceConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            timeout: Duration::seconds(config.typing_timeout_seconds as i64),
        }
    }

    /// Record or refresh a typing signal.
    pub fn mark(&self, ticket_id: TicketId, user: User) {
        let at = self.clock.now();
        let user_id = user.id;
        self.entries
            .entry(ticket_id)
            .or_default()
            .insert(user_id, TypingEntry { user, at });
    }

    /// Non-expired typers in a ticket, excluding the given user.
    ///
    /// Expired entries are removed as part of this read, and a ticket
    /// whose map drains empty is dropped from the registry.
    pub fn list(&self, ticket_id: TicketId, exclude: UserId) -> Vec<User> {
        let now = self.clock.now();
        let mut result = Vec::new();
        let mut drained = false;

        if let Some(mut map) = self.entries.get_mut(&ticket_id) {
            map.retain(|_, entry| now - entry.at <= self.timeout);
            for (user_id, entry) in map.iter() {
                if *user_id != exclude {
                    result.push(entry.user.clone());
                }
            }
            drained = map.is_empty();
        }

        if drained {
            self.entries.remove(&ticket_id);
        }

        result
    }

    /// Number of tickets with stored typing state (including not-yet-pruned
    /// expired entries).
    pub fn stored_tickets(&self) -> usize {
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
            username: None,
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

    fn tracker() -> (TypingTracker, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let tracker = TypingTracker::new(&PresenceConfig::default(), clock.clone());
        (tracker, clock)
    }

    #[test]
    fn test_typing_visible_within_timeout() {
        let (tracker, _clock) = tracker();
        tracker.mark(TicketId(1), test_user(1));
        let typers = tracker.list(TicketId(1), UserId(99));
        assert_eq!(typers.len(), 1);
    }

    #[test]
    fn test_typing_expires_and_prunes() {
        let (tracker, clock) = tracker();
        tracker.mark(TicketId(1), test_user(1));

        clock.advance(Duration::seconds(5));
        assert!(tracker.list(TicketId(1), UserId(99)).is_empty());
        // The read removed the expired entry and the empty ticket map.
        assert_eq!(tracker.stored_tickets(), 0);
        // Idempotent: a second read stays empty.
        assert!(tracker.list(TicketId(1), UserId(99)).is_empty());
    }

    #[test]
    fn test_self_exclusion() {
        let (tracker, _clock) = tracker();
        tracker.mark(TicketId(1), test_user(1));
        tracker.mark(TicketId(1), test_user(2));

        let typers = tracker.list(TicketId(1), UserId(1));
        assert_eq!(typers.len(), 1);
        assert_eq!(typers[0].id, UserId(2));
    }

    #[test]
    fn test_mark_refreshes_timestamp() {
        let (tracker, clock) = tracker();
        tracker.mark(TicketId(1), test_user(1));
        clock.advance(Duration::seconds(3));
        tracker.mark(TicketId(1), test_user(1));
        clock.advance(Duration::seconds(3));
        assert_eq!(tracker.list(TicketId(1), UserId(99)).len(), 1);
    }

    #[test]
    fn test_tickets_are_independent() {
        let (tracker, _clock) = tracker();
        tracker.mark(TicketId(1), test_user(1));
        tracker.mark(TicketId(2), test_user(2));
        assert_eq!(tracker.list(TicketId(1), UserId(99)).len(), 1);
        assert_eq!(tracker.list(TicketId(2), UserId(99)).len(), 1);
    }
}
