//! Session and login-token entities.

pub mod model;

pub use model::{LoginToken, Session};
