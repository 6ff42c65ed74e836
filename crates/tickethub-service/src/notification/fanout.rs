//! Notification fan-out.
//!
//! Resolves the subscriber list for a ticket event and dispatches through
//! the `Messenger` seam. The messenger is treated as unreliable: every
//! per-recipient send is wrapped so one failure is logged and skipped,
//! never propagated to the caller or to the remaining recipients.

use std::sync::Arc;

use tracing::warn;

use tickethub_core::result::AppResult;
use tickethub_core::types::id::{TicketId, UserId};
use tickethub_database::repositories::subscription::SubscriptionRepository;
use tickethub_database::repositories::user::UserRepository;
use tickethub_entity::user::User;
use tickethub_telegram::types::{InlineButton, ReplyMarkup};
use tickethub_telegram::Messenger;

use super::render::ticket_url;

/// Dispatches ticket-event notifications to subscribers and admin alerts.
#[derive(Debug, Clone)]
pub struct NotificationFanout {
    subscriptions: Arc<SubscriptionRepository>,
    users: Arc<UserRepository>,
    messenger: Arc<dyn Messenger>,
    site_url: String,
    site_is_https: bool,
    admin_telegram_id: i64,
}

impl NotificationFanout {
    /// Create a new fan-out.
    pub fn new(
        subscriptions: Arc<SubscriptionRepository>,
        users: Arc<UserRepository>,
        messenger: Arc<dyn Messenger>,
        site_url: String,
        site_is_https: bool,
        admin_telegram_id: i64,
    ) -> Self {
        Self {
            subscriptions,
            users,
            messenger,
            site_url,
            site_is_https,
            admin_telegram_id,
        }
    }

    /// Notify every subscriber of a ticket about an event caused by
    /// `actor`, except the actor themself.
    pub async fn notify_subscribers(
        &self,
        ticket_id: TicketId,
        ticket_author: UserId,
        actor: UserId,
        text: &str,
    ) -> AppResult<usize> {
        let subscribers = self.subscriptions.subscribers_of(ticket_id).await?;
        Ok(self
            .dispatch_to(&subscribers, ticket_id, ticket_author, actor, text)
            .await)
    }

    /// Apply the delivery rules to a resolved subscriber list and send.
    /// Returns the number of successful sends.
    ///
    /// Skips: the actor (never notify yourself), subscribers with no
    /// linked chat, and subscribers whose category preference disables
    /// this delivery — `notify_own` for the ticket's author,
    /// `notify_subscribed` for everyone else (the author-specific
    /// preference wins over the generic one).
    pub async fn dispatch_to(
        &self,
        subscribers: &[User],
        ticket_id: TicketId,
        ticket_author: UserId,
        actor: UserId,
        text: &str,
    ) -> usize {
        let url = ticket_url(&self.site_url, ticket_id);
        let mut sent = 0;

        for subscriber in subscribers {
            if subscriber.id == actor {
                continue;
            }
            let Some(chat_id) = subscriber.chat_id else {
                continue;
            };

            let wants_it = if subscriber.id == ticket_author {
                subscriber.notify_own
            } else {
                subscriber.notify_subscribed
            };
            if !wants_it {
                continue;
            }

            let markup = ReplyMarkup::single(InlineButton::open(
                "Open ticket",
                &url,
                self.site_is_https,
            ));

            match self.messenger.send_message(chat_id, text, Some(markup)).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    warn!(
                        user_id = %subscriber.id,
                        ticket_id = %ticket_id,
                        error = %e,
                        "Failed to notify subscriber"
                    );
                }
            }
        }

        sent
    }

    /// Notify the designated administrator directly; a no-op when the
    /// admin account is unknown or has no linked chat.
    pub async fn notify_admin(&self, text: &str) -> AppResult<()> {
        let Some(admin) = self
            .users
            .find_by_telegram_id(self.admin_telegram_id)
            .await?
        else {
            return Ok(());
        };
        let Some(chat_id) = admin.chat_id else {
            return Ok(());
        };

        if let Err(e) = self.messenger.send_message(chat_id, text, None).await {
            warn!(error = %e, "Failed to notify admin");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tickethub_core::error::AppError;

    #[derive(Debug, Default)]
    struct MockMessenger {
        sent: Mutex<Vec<(i64, String)>>,
        failing_chats: HashSet<i64>,
    }

    impl MockMessenger {
        fn failing(chats: &[i64]) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failing_chats: chats.iter().copied().collect(),
            }
        }

        fn sent_chats(&self) -> Vec<i64> {
            self.sent
                .lock()
                .expect("mock lock")
                .iter()
                .map(|(chat, _)| *chat)
                .collect()
        }
    }

    #[async_trait]
    impl Messenger for MockMessenger {
        async fn send_message(
            &self,
            chat_id: i64,
            text: &str,
            _reply_markup: Option<ReplyMarkup>,
        ) -> AppResult<()> {
            if self.failing_chats.contains(&chat_id) {
                return Err(AppError::external("delivery refused"));
            }
            self.sent
                .lock()
                .expect("mock lock")
                .push((chat_id, text.to_string()));
            Ok(())
        }
    }

    fn subscriber(id: i64, chat_id: Option<i64>) -> User {
        User {
            id: UserId(id),
            telegram_id: 1000 + id,
            chat_id,
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

    /// Build a fan-out over a mock messenger; the repositories are not
    /// exercised by `dispatch_to`, so any pool-less construction works.
    fn fanout(messenger: Arc<MockMessenger>) -> NotificationFanout {
        let pool = sqlx_stub_pool();
        NotificationFanout::new(
            Arc::new(SubscriptionRepository::new(pool.clone())),
            Arc::new(UserRepository::new(pool)),
            messenger,
            "https://tracker.example".to_string(),
            true,
            0,
        )
    }

    fn sqlx_stub_pool() -> sqlx::SqlitePool {
        sqlx::SqlitePool::connect_lazy("sqlite::memory:").expect("lazy pool")
    }

    #[tokio::test]
    async fn test_actor_is_never_notified() {
        let messenger = Arc::new(MockMessenger::default());
        let fanout = fanout(messenger.clone());

        let subs = vec![subscriber(1, Some(11)), subscriber(2, Some(22))];
        let sent = fanout
            .dispatch_to(&subs, TicketId(5), UserId(9), UserId(1), "hello")
            .await;

        assert_eq!(sent, 1);
        assert_eq!(messenger.sent_chats(), vec![22]);
    }

    #[tokio::test]
    async fn test_unlinked_subscribers_are_skipped() {
        let messenger = Arc::new(MockMessenger::default());
        let fanout = fanout(messenger.clone());

        let subs = vec![subscriber(1, None), subscriber(2, Some(22))];
        let sent = fanout
            .dispatch_to(&subs, TicketId(5), UserId(9), UserId(99), "hello")
            .await;

        assert_eq!(sent, 1);
        assert_eq!(messenger.sent_chats(), vec![22]);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_rest() {
        let messenger = Arc::new(MockMessenger::failing(&[11]));
        let fanout = fanout(messenger.clone());

        let subs = vec![
            subscriber(1, Some(11)),
            subscriber(2, Some(22)),
            subscriber(3, Some(33)),
        ];
        let sent = fanout
            .dispatch_to(&subs, TicketId(5), UserId(9), UserId(99), "hello")
            .await;

        assert_eq!(sent, 2, "failed recipient skipped, rest delivered");
        assert_eq!(messenger.sent_chats(), vec![22, 33]);
    }

    #[tokio::test]
    async fn test_author_preference_wins_over_generic() {
        let messenger = Arc::new(MockMessenger::default());
        let fanout = fanout(messenger.clone());

        // The ticket author disabled own-ticket notifications but kept
        // the generic subscription preference on.
        let mut author = subscriber(1, Some(11));
        author.notify_own = false;
        author.notify_subscribed = true;

        let sent = fanout
            .dispatch_to(&[author], TicketId(5), UserId(1), UserId(99), "hello")
            .await;

        assert_eq!(sent, 0, "notify_own gates the author's delivery");
    }

    #[tokio::test]
    async fn test_subscribed_preference_gates_non_authors() {
        let messenger = Arc::new(MockMessenger::default());
        let fanout = fanout(messenger.clone());

        let mut muted = subscriber(1, Some(11));
        muted.notify_subscribed = false;
        let subs = vec![muted, subscriber(2, Some(22))];

        let sent = fanout
            .dispatch_to(&subs, TicketId(5), UserId(9), UserId(99), "hello")
            .await;

        assert_eq!(sent, 1);
        assert_eq!(messenger.sent_chats(), vec![22]);
    }
}
