//! Newtype wrappers around `i64` for all domain entity identifiers.
//!
//! The store is SQLite, so every entity is keyed by an integer rowid, and
//! Telegram user/chat identifiers are integers as well. Using distinct
//! types prevents accidentally passing a `UserId` where a `TicketId` is
//! expected. Each ID type is `#[serde(transparent)]` and
//! `#[sqlx(transparent)]`, so it round-trips as a plain integer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Macro to define a newtype ID wrapper around `i64`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Create an identifier from a raw integer.
            pub fn from_i64(value: i64) -> Self {
                Self(value)
            }

            /// Return the inner integer value.
            pub fn into_i64(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a user.
    UserId
);

define_id!(
    /// Unique identifier for a ticket.
    TicketId
);

define_id!(
    /// Unique identifier for a message.
    MessageId
);

define_id!(
    /// Unique identifier for an attachment.
    AttachmentId
);

define_id!(
    /// Unique identifier for a tag.
    TagId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_display() {
        let id = UserId::from_i64(42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_user_id_from_str() {
        let id: UserId = "17".parse().expect("should parse");
        assert_eq!(id, UserId(17));
        assert!("not-a-number".parse::<UserId>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id = TicketId::from_i64(7);
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "7");
        let parsed: TicketId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
