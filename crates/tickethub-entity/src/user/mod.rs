//! User entity and identity masking.

pub mod mask;
pub mod model;

pub use mask::{mask_identity, Identity, MaskedIdentity, RealIdentity};
pub use model::{SettingsUpdate, TelegramProfile, User, UserSettings};
