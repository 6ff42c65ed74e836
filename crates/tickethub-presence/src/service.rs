//! The presence service facade.
//!
//! Owns the presence tracker, the typing tracker, and the SSE broadcast
//! hub. `start()`/`stop()` manage the periodic cleanup-and-broadcast
//! sweep; the sweep body is public so tests can drive it with a manual
//! clock instead of waiting on real timers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use tickethub_core::config::PresenceConfig;
use tickethub_core::types::id::TicketId;
use tickethub_entity::presence::{OnlineUser, PresenceUpdate, ViewKind};
use tickethub_entity::user::{mask_identity, Identity, MaskedIdentity, User};

use crate::broadcast::PresenceBroadcaster;
use crate::clock::Clock;
use crate::tracker::{PresenceEntry, PresenceTracker};
use crate::typing::TypingTracker;

/// Capacity of the broadcast channel per listener.
const BROADCAST_BUFFER: usize = 64;

/// The live-presence facade the HTTP layer talks to.
#[derive(Debug)]
pub struct PresenceService {
    tracker: PresenceTracker,
    typing: TypingTracker,
    broadcaster: PresenceBroadcaster,
    config: PresenceConfig,
    sweep_handle: Mutex<Option<JoinHandle<()>>>,
}

impl PresenceService {
    /// Construct the service with an injected clock.
    pub fn new(config: PresenceConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            tracker: PresenceTracker::new(&config, clock.clone()),
            typing: TypingTracker::new(&config, clock),
            broadcaster: PresenceBroadcaster::new(BROADCAST_BUFFER),
            config,
            sweep_handle: Mutex::new(None),
        }
    }

    // ── Heartbeats & online list ─────────────────────────────

    /// Record a heartbeat and push the updated list to all listeners.
    pub fn heartbeat(
        &self,
        session_token: &str,
        user: User,
        view: ViewKind,
        ticket_id: Option<TicketId>,
        ticket_title: Option<String>,
    ) {
        self.tracker
            .record_heartbeat(session_token, user, view, ticket_id, ticket_title);
        self.broadcast_now();
    }

    /// The online list masked for a specific viewer.
    pub fn online_for_viewer(&self, viewer: &User) -> Vec<OnlineUser> {
        self.tracker
            .snapshot()
            .iter()
            .filter_map(|entry| {
                let identity = Identity::from(&entry.user);
                let is_self = entry.user.id == viewer.id;
                if identity.hidden_from_online(viewer.is_admin, is_self) {
                    return None;
                }
                Some(render_entry(entry, &identity, viewer.is_admin, is_self))
            })
            .collect()
    }

    /// The online list with public masking (what the SSE stream carries).
    pub fn public_online(&self) -> Vec<OnlineUser> {
        self.tracker
            .snapshot()
            .iter()
            .filter_map(|entry| {
                let identity = Identity::from(&entry.user);
                if identity.hidden_from_online(false, false) {
                    return None;
                }
                Some(render_entry(entry, &identity, false, false))
            })
            .collect()
    }

    /// Whether a user id currently appears in the online list for the
    /// given viewer (used by the user directory's online flags).
    pub fn online_user_ids(&self, viewer: &User) -> Vec<tickethub_core::types::id::UserId> {
        self.online_for_viewer(viewer)
            .into_iter()
            .map(|u| u.identity.id)
            .collect()
    }

    // ── Typing ───────────────────────────────────────────────

    /// Record a typing signal.
    pub fn typing_ping(&self, ticket_id: TicketId, user: User) {
        self.typing.mark(ticket_id, user);
    }

    /// Who is typing in a ticket, masked for the viewer and excluding the
    /// viewer themself. Non-admin viewers do not see typers carrying any
    /// privacy flag.
    pub fn typing_for_viewer(&self, ticket_id: TicketId, viewer: &User) -> Vec<MaskedIdentity> {
        self.typing
            .list(ticket_id, viewer.id)
            .iter()
            .filter_map(|user| {
                let identity = Identity::from(user);
                if !viewer.is_admin
                    && (identity.privacy_hidden
                        || identity.privacy_hide_online
                        || identity.privacy_hide_activity)
                {
                    return None;
                }
                Some(mask_identity(&identity, viewer.is_admin, false))
            })
            .collect()
    }

    // ── Broadcast ────────────────────────────────────────────

    /// Register an SSE listener.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.broadcaster.subscribe()
    }

    /// The current publicly-masked payload, for the initial frame of a
    /// new SSE connection.
    pub fn current_payload(&self) -> String {
        let update = PresenceUpdate::new(self.public_online());
        serde_json::to_string(&update).unwrap_or_else(|_| "{}".to_string())
    }

    /// Push the current publicly-masked list to all listeners.
    pub fn broadcast_now(&self) {
        let update = PresenceUpdate::new(self.public_online());
        self.broadcaster.publish(&update);
    }

    // ── Sweep lifecycle ──────────────────────────────────────

    /// One sweep cycle: purge hard-stale entries, then broadcast.
    ///
    /// Two explicit steps of one scheduled task, so tests can advance a
    /// manual clock and invoke this directly.
    pub fn run_sweep(&self) {
        let purged = self.tracker.purge_stale();
        if purged > 0 {
            debug!(purged, "Purged stale presence entries");
        }
        self.broadcast_now();
    }

    /// Spawn the periodic sweep task.
    pub fn start(self: &Arc<Self>) {
        let mut guard = self.sweep_handle.lock().expect("sweep handle lock");
        if guard.is_some() {
            return;
        }

        let service = Arc::clone(self);
        let interval = Duration::from_secs(self.config.sweep_interval_seconds);
        *guard = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so start() is not
            // itself a broadcast.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                service.run_sweep();
            }
        }));
    }

    /// Abort the periodic sweep task.
    pub fn stop(&self) {
        if let Some(handle) = self.sweep_handle.lock().expect("sweep handle lock").take() {
            handle.abort();
        }
    }
}

impl Drop for PresenceService {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Render one presence entry for a viewer, applying identity masking and
/// the activity-hiding rule.
fn render_entry(
    entry: &PresenceEntry,
    identity: &Identity,
    viewer_is_admin: bool,
    is_self: bool,
) -> OnlineUser {
    let hide_activity = identity.activity_hidden_from(viewer_is_admin);
    OnlineUser {
        identity: mask_identity(identity, viewer_is_admin, is_self),
        is_admin: entry.user.is_admin,
        current_view: if hide_activity { None } else { Some(entry.view) },
        current_ticket_id: if hide_activity { None } else { entry.ticket_id },
        current_ticket_title: if hide_activity {
            None
        } else {
            entry.ticket_title.clone()
        },
        last_seen: entry.last_seen.timestamp_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::Utc;
    use tickethub_core::types::id::UserId;

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

    fn admin_user(id: i64) -> User {
        let mut user = test_user(id);
        user.is_admin = true;
        user
    }

    fn service() -> (PresenceService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = PresenceService::new(PresenceConfig::default(), clock.clone());
        (service, clock)
    }

    #[test]
    fn test_end_to_end_heartbeat_then_expiry() {
        let (service, clock) = service();
        service.heartbeat(
            "tok-a",
            test_user(1),
            ViewKind::Ticket,
            Some(TicketId(42)),
            Some("Login bug".to_string()),
        );

        let viewer = test_user(2);
        let online = service.online_for_viewer(&viewer);
        assert_eq!(online.len(), 1);
        assert_eq!(online[0].current_view, Some(ViewKind::Ticket));
        assert_eq!(online[0].current_ticket_id, Some(TicketId(42)));
        assert_eq!(online[0].current_ticket_title.as_deref(), Some("Login bug"));

        clock.advance(chrono::Duration::seconds(61));
        assert!(service.online_for_viewer(&viewer).is_empty());
    }

    #[test]
    fn test_hidden_subject_invisible_to_non_admin_visible_to_admin() {
        let (service, _clock) = service();
        let mut hidden = test_user(1);
        hidden.privacy_hidden = true;
        service.heartbeat("tok-a", hidden, ViewKind::List, None, None);

        assert!(service.online_for_viewer(&test_user(2)).is_empty());

        let admin_view = service.online_for_viewer(&admin_user(3));
        assert_eq!(admin_view.len(), 1);
        let real = admin_view[0].identity.real.as_ref().expect("real block");
        assert!(real.privacy_hidden);
        assert_eq!(real.first_name, "User1");
    }

    #[test]
    fn test_hide_online_vs_hide_activity() {
        let (service, _clock) = service();

        let mut shy = test_user(1);
        shy.privacy_hide_online = true;
        service.heartbeat("tok-a", shy, ViewKind::List, None, None);

        let mut private_activity = test_user(2);
        private_activity.privacy_hide_activity = true;
        service.heartbeat(
            "tok-b",
            private_activity,
            ViewKind::Ticket,
            Some(TicketId(7)),
            Some("Secret".to_string()),
        );

        let online = service.online_for_viewer(&test_user(3));
        assert_eq!(online.len(), 1, "hide_online subject is absent");
        let entry = &online[0];
        assert_eq!(entry.identity.id, UserId(2));
        assert_eq!(entry.current_view, None, "activity nulled");
        assert_eq!(entry.current_ticket_id, None);
        assert_eq!(entry.current_ticket_title, None);

        // Admins see both, with activity intact.
        let admin_view = service.online_for_viewer(&admin_user(4));
        assert_eq!(admin_view.len(), 2);
        let activity_entry = admin_view
            .iter()
            .find(|e| e.identity.id == UserId(2))
            .expect("present");
        assert_eq!(activity_entry.current_ticket_id, Some(TicketId(7)));
    }

    #[test]
    fn test_subject_sees_themself_even_when_hidden() {
        let (service, _clock) = service();
        let mut hidden = test_user(1);
        hidden.privacy_hidden = true;
        service.heartbeat("tok-a", hidden.clone(), ViewKind::List, None, None);

        let own_view = service.online_for_viewer(&hidden);
        assert_eq!(own_view.len(), 1);
        assert!(own_view[0].identity.real.is_none(), "no admin data for self");
    }

    #[test]
    fn test_public_stream_payload_masks_display_overrides() {
        let (service, _clock) = service();
        let mut ghost = test_user(1);
        ghost.display_name = Some("Ghost".to_string());
        ghost.display_avatar = Some("hidden".to_string());
        ghost.photo_url = Some("/uploads/real.jpg".to_string());
        service.heartbeat("tok-a", ghost, ViewKind::List, None, None);

        let public = service.public_online();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].identity.name, "Ghost");
        assert!(public[0].identity.avatar.is_none());
        assert!(public[0].identity.real.is_none());

        let payload = service.current_payload();
        assert!(payload.contains("\"Ghost\""));
        assert!(!payload.contains("real.jpg"), "real avatar never leaks");
    }

    #[test]
    fn test_typing_privacy_filter() {
        let (service, _clock) = service();
        service.typing_ping(TicketId(1), test_user(1));
        let mut flagged = test_user(2);
        flagged.privacy_hide_activity = true;
        service.typing_ping(TicketId(1), flagged);

        let typers = service.typing_for_viewer(TicketId(1), &test_user(3));
        assert_eq!(typers.len(), 1, "flagged typer hidden from non-admin");
        assert_eq!(typers[0].id, UserId(1));

        let admin_typers = service.typing_for_viewer(TicketId(1), &admin_user(4));
        assert_eq!(admin_typers.len(), 2);

        // The excluded viewer never appears even while typing.
        let own_view = service.typing_for_viewer(TicketId(1), &test_user(1));
        assert!(own_view.iter().all(|t| t.id != UserId(1)));
    }

    #[tokio::test]
    async fn test_sweep_purges_and_broadcasts() {
        let (service, clock) = service();
        let mut rx = service.subscribe();

        service.heartbeat("tok-a", test_user(1), ViewKind::List, None, None);
        // Drain the heartbeat broadcast.
        let _ = rx.recv().await.expect("heartbeat frame");

        clock.advance(chrono::Duration::seconds(121));
        service.run_sweep();

        let payload = rx.recv().await.expect("sweep frame");
        assert!(payload.contains("\"count\":0"));
        assert_eq!(service.tracker_stored_len_for_tests(), 0);
    }

    impl PresenceService {
        fn tracker_stored_len_for_tests(&self) -> usize {
            self.tracker.stored_len()
        }
    }
}
