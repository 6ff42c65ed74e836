//! The outbound messaging seam.

use async_trait::async_trait;

use tickethub_core::result::AppResult;

use crate::types::ReplyMarkup;

/// Outbound message delivery.
///
/// The notification fan-out depends on this trait rather than on the
/// concrete client, so delivery can be mocked in tests and treated as
/// unreliable in production — implementations surface failures as errors
/// and the fan-out decides what to do with them.
#[async_trait]
pub trait Messenger: Send + Sync + std::fmt::Debug {
    /// Send an HTML-formatted message to a chat.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<ReplyMarkup>,
    ) -> AppResult<()>;
}

/// No-op messenger used when the bot integration is disabled — dev mode
/// has nowhere to deliver to.
#[derive(Debug, Default)]
pub struct DisabledMessenger;

#[async_trait]
impl Messenger for DisabledMessenger {
    async fn send_message(
        &self,
        chat_id: i64,
        _text: &str,
        _reply_markup: Option<ReplyMarkup>,
    ) -> AppResult<()> {
        tracing::debug!(chat_id, "Notifications disabled, dropping message");
        Ok(())
    }
}
