//! # tickethub-auth
//!
//! Authentication for TicketHub: opaque session tokens, the Telegram
//! WebApp `initData` verification, and the session lifecycle manager
//! with its periodic cleanup.
//!
//! There are no local passwords — identity is delegated to Telegram.

pub mod session;
pub mod token;
pub mod webapp;
