//! Ticket status enum.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Review,
    Testing,
    Closed,
    Rejected,
    Duplicate,
}

impl TicketStatus {
    /// Ordering rank used by ticket listings and the kanban board.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Open => 1,
            Self::InProgress => 2,
            Self::Review => 3,
            Self::Testing => 4,
            Self::Closed => 5,
            Self::Rejected => 6,
            Self::Duplicate => 7,
        }
    }

    /// Whether the ticket is in a terminal (archived) state.
    ///
    /// Archived tickets reject new messages from non-admins.
    pub fn is_archived(&self) -> bool {
        matches!(self, Self::Closed | Self::Rejected | Self::Duplicate)
    }

    /// Human-readable label used in system messages and notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In progress",
            Self::Review => "In review",
            Self::Testing => "Testing",
            Self::Closed => "Closed",
            Self::Rejected => "Rejected",
            Self::Duplicate => "Duplicate",
        }
    }

    /// The statuses shown as kanban board columns.
    pub fn kanban_columns() -> [Self; 5] {
        [
            Self::Open,
            Self::InProgress,
            Self::Review,
            Self::Testing,
            Self::Closed,
        ]
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Testing => "testing",
            Self::Closed => "closed",
            Self::Rejected => "rejected",
            Self::Duplicate => "duplicate",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archived_states() {
        assert!(TicketStatus::Closed.is_archived());
        assert!(TicketStatus::Rejected.is_archived());
        assert!(TicketStatus::Duplicate.is_archived());
        assert!(!TicketStatus::Open.is_archived());
        assert!(!TicketStatus::InProgress.is_archived());
    }

    #[test]
    fn test_rank_ordering() {
        assert!(TicketStatus::Open.rank() < TicketStatus::InProgress.rank());
        assert!(TicketStatus::Testing.rank() < TicketStatus::Closed.rank());
    }
}
