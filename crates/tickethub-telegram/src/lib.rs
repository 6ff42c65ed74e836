//! # tickethub-telegram
//!
//! Telegram Bot API integration: the outbound client (and the `Messenger`
//! trait seam used by notification fan-out), the inbound long-poll command
//! loop, and profile-photo download.

pub mod avatar;
pub mod client;
pub mod outbound;
pub mod poller;
pub mod types;

pub use client::TelegramClient;
pub use outbound::Messenger;
