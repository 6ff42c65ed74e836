//! Ticket application service.

pub mod service;

pub use service::{TicketService, TicketView};
