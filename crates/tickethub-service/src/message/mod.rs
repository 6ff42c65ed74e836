//! Message application service.

pub mod service;

pub use service::{MessageService, MessageView};
