//! Ticket kind enum.

use serde::{Deserialize, Serialize};

/// The kind of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TicketKind {
    /// A defect report.
    Bug,
    /// A free-form idea.
    Idea,
    /// A feature request.
    Feature,
    /// An improvement to existing behavior.
    Improvement,
}

impl TicketKind {
    /// Human-readable label used in notification texts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Idea => "idea",
            Self::Feature => "feature request",
            Self::Improvement => "improvement",
        }
    }
}

impl std::fmt::Display for TicketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Bug => "bug",
            Self::Idea => "idea",
            Self::Feature => "feature",
            Self::Improvement => "improvement",
        };
        write!(f, "{s}")
    }
}
