//! Inbound bot command loop.
//!
//! Long-polls `getUpdates` and handles the two commands the bot knows:
//! `/start [login-token]` (deep-link auth confirmation) and `/help`.
//! Every inbound message also refreshes the sender's `chat_id`, which is
//! what links the user for notifications.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use tickethub_core::config::{ServerConfig, TelegramConfig};
use tickethub_database::repositories::login_token::LoginTokenRepository;
use tickethub_database::repositories::user::UserRepository;
use tickethub_entity::user::TelegramProfile;

use crate::avatar::AvatarFetcher;
use crate::client::TelegramClient;
use crate::outbound::Messenger;
use crate::types::{BotCommand, IncomingMessage, InlineButton, ReplyMarkup, TgUser, Update};

/// The long-poll update loop.
pub struct UpdatePoller {
    client: Arc<TelegramClient>,
    users: Arc<UserRepository>,
    login_tokens: Arc<LoginTokenRepository>,
    avatars: AvatarFetcher,
    telegram: TelegramConfig,
    server: ServerConfig,
}

impl std::fmt::Debug for UpdatePoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdatePoller").finish()
    }
}

impl UpdatePoller {
    /// Create a new poller.
    pub fn new(
        client: Arc<TelegramClient>,
        users: Arc<UserRepository>,
        login_tokens: Arc<LoginTokenRepository>,
        avatars: AvatarFetcher,
        telegram: TelegramConfig,
        server: ServerConfig,
    ) -> Self {
        Self {
            client,
            users,
            login_tokens,
            avatars,
            telegram,
            server,
        }
    }

    /// Run the poll loop until shutdown is signalled.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("Telegram bot polling started");
        self.announce().await;

        let mut offset: i64 = 0;
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("Telegram bot polling stopped");
                    return;
                }
                result = self.client.get_updates(offset) => {
                    match result {
                        Ok(updates) => {
                            for update in updates {
                                offset = offset.max(update.update_id + 1);
                                self.handle_update(update).await;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Telegram poll failed, backing off");
                            tokio::time::sleep(Duration::from_secs(
                                self.telegram.poll_backoff_seconds,
                            ))
                            .await;
                        }
                    }
                }
            }
        }
    }

    /// Publish commands and the WebApp menu button (best-effort).
    async fn announce(&self) {
        let commands = [
            BotCommand {
                command: "start".to_string(),
                description: "Open the tracker".to_string(),
            },
            BotCommand {
                command: "help".to_string(),
                description: "Help".to_string(),
            },
        ];
        if let Err(e) = self.client.set_my_commands(&commands).await {
            warn!(error = %e, "Failed to publish bot commands");
        }

        // Telegram only accepts WebApp menu buttons for HTTPS sites.
        if self.server.site_is_https() {
            if let Err(e) = self
                .client
                .set_menu_button("TicketHub", &self.server.site_url)
                .await
            {
                warn!(error = %e, "Failed to set menu button");
            }
        } else {
            info!("Site URL is not HTTPS, WebApp menu button disabled");
        }
    }

    async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(text) = message.text.clone() else {
            return;
        };

        if let Err(e) = self.handle_command(&message, text.trim()).await {
            error!(chat_id = message.chat.id, error = %e, "Bot command handling failed");
        }
    }

    async fn handle_command(
        &self,
        message: &IncomingMessage,
        text: &str,
    ) -> tickethub_core::AppResult<()> {
        let chat_id = message.chat.id;
        let Some(from) = &message.from else {
            return Ok(());
        };

        // Keep the chat link fresh for any known sender.
        self.users.update_chat_id(from.id, chat_id).await?;

        if text == "/start" || text.starts_with("/start ") {
            match text.split_whitespace().nth(1) {
                Some(token) => self.confirm_login(chat_id, from, token).await?,
                None => self.send_welcome(chat_id).await?,
            }
        } else if text == "/help" {
            self.send_help(chat_id).await?;
        }

        Ok(())
    }

    /// `/start <token>` — confirm a pending deep-link login.
    async fn confirm_login(
        &self,
        chat_id: i64,
        from: &TgUser,
        token: &str,
    ) -> tickethub_core::AppResult<()> {

        let Some(row) = self.login_tokens.find(token).await? else {
            self.client
                .send_message(
                    chat_id,
                    "This login link has expired. Please request a new one on the site.",
                    None,
                )
                .await?;
            return Ok(());
        };

        if row.confirmed {
            self.client
                .send_message(chat_id, "You are already signed in. Return to the site.", None)
                .await?;
            return Ok(());
        }

        // Best-effort avatar capture; login must not fail on it.
        let photo_url = match self.avatars.fetch(from.id).await {
            Ok(url) => url,
            Err(e) => {
                warn!(telegram_id = from.id, error = %e, "Avatar fetch failed during login");
                None
            }
        };

        let profile = TelegramProfile {
            telegram_id: from.id,
            chat_id: Some(chat_id),
            username: from.username.clone(),
            first_name: from
                .first_name
                .clone()
                .unwrap_or_else(|| "User".to_string()),
            last_name: from.last_name.clone(),
            photo_url,
        };
        self.login_tokens.confirm(token, &profile).await?;

        self.client
            .send_message(
                chat_id,
                "You are signed in to TicketHub!\n\n\
                 Return to the site — it will log you in automatically.\n\
                 You will receive notifications about activity on your tickets.",
                None,
            )
            .await?;
        Ok(())
    }

    /// Bare `/start` — welcome text with an open-tracker button.
    async fn send_welcome(&self, chat_id: i64) -> tickethub_core::AppResult<()> {
        let button = InlineButton::open(
            "Open TicketHub",
            &self.server.site_url,
            self.server.site_is_https(),
        );
        self.client
            .send_message(
                chat_id,
                "Welcome to <b>TicketHub</b>!\n\n\
                 Bug and idea tracker.\n\n\
                 Press the button below to open the tracker.\n\n\
                 Notifications you will receive:\n\
                 • New messages on your tickets\n\
                 • Status changes\n\
                 • Messages on tickets you subscribed to",
                Some(ReplyMarkup::single(button)),
            )
            .await
    }

    /// `/help`.
    async fn send_help(&self, chat_id: i64) -> tickethub_core::AppResult<()> {
        let button = InlineButton::open(
            "Open the tracker",
            &self.server.site_url,
            self.server.site_is_https(),
        );
        self.client
            .send_message(
                chat_id,
                "<b>TicketHub Bot</b>\n\n\
                 Bug and idea tracker.\n\n\
                 Commands:\n\
                 /start — Open the tracker\n\
                 /help — Help",
                Some(ReplyMarkup::single(button)),
            )
            .await
    }
}
