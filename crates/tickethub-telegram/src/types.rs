//! Serde models for the slice of the Bot API this service uses.

use serde::{Deserialize, Serialize};

/// The envelope every Bot API method returns.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the call succeeded.
    pub ok: bool,
    /// The method result, when `ok`.
    pub result: Option<T>,
    /// Error description, when not `ok`.
    pub description: Option<String>,
}

/// One long-poll update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update identifier; the next poll offset is `id + 1`.
    pub update_id: i64,
    /// The inbound message, if this update carries one.
    pub message: Option<IncomingMessage>,
}

/// An inbound chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    /// Message identifier.
    pub message_id: i64,
    /// The sender.
    pub from: Option<TgUser>,
    /// The chat the message arrived in.
    pub chat: TgChat,
    /// Text content, if any.
    pub text: Option<String>,
}

/// A Telegram user as seen in updates.
#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    /// Telegram user ID.
    pub id: i64,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Username.
    pub username: Option<String>,
}

/// A chat as seen in updates and `getChat` results.
#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    /// Chat ID (equals the user ID for private chats).
    pub id: i64,
    /// First name (private chats).
    pub first_name: Option<String>,
    /// Last name (private chats).
    pub last_name: Option<String>,
    /// Username (private chats).
    pub username: Option<String>,
}

/// Result of `getUserProfilePhotos`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfilePhotos {
    /// Total photo count the user has.
    pub total_count: i64,
    /// Requested photos; each photo is a list of sizes, smallest first.
    pub photos: Vec<Vec<PhotoSize>>,
}

/// One size variant of a photo.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    /// File identifier for `getFile`.
    pub file_id: String,
    /// Width in pixels.
    pub width: i64,
    /// Height in pixels.
    pub height: i64,
}

/// Result of `getFile`.
#[derive(Debug, Clone, Deserialize)]
pub struct TgFile {
    /// File identifier.
    pub file_id: String,
    /// Server-side path for the download URL.
    pub file_path: Option<String>,
}

/// An inline keyboard attached to an outbound message.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyMarkup {
    /// Button rows.
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

impl ReplyMarkup {
    /// A single-button keyboard.
    pub fn single(button: InlineButton) -> Self {
        Self {
            inline_keyboard: vec![vec![button]],
        }
    }
}

/// One inline button. Telegram requires exactly one action field;
/// WebApp buttons only work for HTTPS sites, plain URLs otherwise.
#[derive(Debug, Clone, Serialize)]
pub struct InlineButton {
    /// Button label.
    pub text: String,
    /// Plain URL action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// WebApp action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_app: Option<WebAppInfo>,
}

impl InlineButton {
    /// A button opening the given URL, as a WebApp when HTTPS allows it.
    pub fn open(text: &str, url: &str, as_web_app: bool) -> Self {
        if as_web_app {
            Self {
                text: text.to_string(),
                url: None,
                web_app: Some(WebAppInfo {
                    url: url.to_string(),
                }),
            }
        } else {
            Self {
                text: text.to_string(),
                url: Some(url.to_string()),
                web_app: None,
            }
        }
    }
}

/// WebApp target of an inline button.
#[derive(Debug, Clone, Serialize)]
pub struct WebAppInfo {
    /// HTTPS URL of the WebApp.
    pub url: String,
}

/// One bot command for `setMyCommands`.
#[derive(Debug, Clone, Serialize)]
pub struct BotCommand {
    /// Command without the leading slash.
    pub command: String,
    /// Short description.
    pub description: String,
}
