//! # tickethub-presence
//!
//! The live-presence subsystem: who is online, where they are, and who is
//! typing. Everything here is in-memory by design — a restart clears it
//! and the next heartbeats rebuild it.
//!
//! [`service::PresenceService`] is the constructed facade the HTTP layer
//! talks to; it owns the trackers, the SSE broadcast hub, and the
//! periodic cleanup sweep.

pub mod broadcast;
pub mod clock;
pub mod service;
pub mod tracker;
pub mod typing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use service::PresenceService;
