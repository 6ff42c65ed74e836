//! Thin HTTP client for the Telegram Bot API.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use tickethub_core::config::TelegramConfig;
use tickethub_core::error::AppError;
use tickethub_core::result::AppResult;

use crate::outbound::Messenger;
use crate::types::{
    ApiEnvelope, BotCommand, ReplyMarkup, TgChat, TgFile, Update, UserProfilePhotos,
};

/// Thin wrapper over `https://api.telegram.org/bot<token>/<method>`.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramClient {
    /// Create a new Bot API client.
    pub fn new(config: TelegramConfig) -> Self {
        // The long poll holds a request open for `poll_timeout_seconds`,
        // so the transport timeout must sit comfortably above it.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_seconds + 35))
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    /// Call a Bot API method, unwrapping the response envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &impl Serialize,
    ) -> AppResult<T> {
        let url = format!(
            "{}/bot{}/{}",
            self.config.api_base, self.config.bot_token, method
        );

        let response = self
            .http
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(|e| AppError::external(format!("Telegram API {method} failed: {e}")))?;

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| AppError::external(format!("Telegram API {method} bad response: {e}")))?;

        if !envelope.ok {
            return Err(AppError::external(format!(
                "Telegram API {method} rejected: {}",
                envelope.description.unwrap_or_else(|| "unknown".to_string())
            )));
        }

        envelope
            .result
            .ok_or_else(|| AppError::external(format!("Telegram API {method} empty result")))
    }

    /// Long-poll for updates.
    pub async fn get_updates(&self, offset: i64) -> AppResult<Vec<Update>> {
        self.call(
            "getUpdates",
            &serde_json::json!({
                "offset": offset,
                "timeout": self.config.poll_timeout_seconds,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    /// Fetch chat info (fresh name/username for private chats).
    pub async fn get_chat(&self, chat_id: i64) -> AppResult<TgChat> {
        self.call("getChat", &serde_json::json!({ "chat_id": chat_id }))
            .await
    }

    /// Fetch a user's newest profile photo.
    pub async fn get_user_profile_photos(&self, user_id: i64) -> AppResult<UserProfilePhotos> {
        self.call(
            "getUserProfilePhotos",
            &serde_json::json!({ "user_id": user_id, "limit": 1 }),
        )
        .await
    }

    /// Resolve a file ID to a downloadable path.
    pub async fn get_file(&self, file_id: &str) -> AppResult<TgFile> {
        self.call("getFile", &serde_json::json!({ "file_id": file_id }))
            .await
    }

    /// Download a file's bytes by its server-side path.
    pub async fn download_file(&self, file_path: &str) -> AppResult<Vec<u8>> {
        let url = format!(
            "{}/file/bot{}/{}",
            self.config.api_base, self.config.bot_token, file_path
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::external(format!("Telegram file download failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::external(format!(
                "Telegram file download status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::external(format!("Telegram file download read failed: {e}")))?;
        Ok(bytes.to_vec())
    }

    /// Publish the bot's command list.
    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> AppResult<()> {
        let _: bool = self
            .call("setMyCommands", &serde_json::json!({ "commands": commands }))
            .await?;
        Ok(())
    }

    /// Set the chat menu button to open the tracker WebApp.
    pub async fn set_menu_button(&self, text: &str, url: &str) -> AppResult<()> {
        let _: bool = self
            .call(
                "setChatMenuButton",
                &serde_json::json!({
                    "menu_button": {
                        "type": "web_app",
                        "text": text,
                        "web_app": { "url": url },
                    }
                }),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<ReplyMarkup>,
    ) -> AppResult<()> {
        debug!(chat_id, "Sending Telegram message");

        let mut params = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        if let Some(markup) = reply_markup {
            params["reply_markup"] = serde_json::to_value(markup)?;
        }

        let _: serde_json::Value = self.call("sendMessage", &params).await?;
        Ok(())
    }
}
