//! # tickethub-service
//!
//! Application services: ticket and message orchestration with the
//! original authorization rules, the notification fan-out, user
//! directory/settings, Telegram profile refresh, and upload handling.

pub mod message;
pub mod notification;
pub mod ticket;
pub mod upload;
pub mod user;
