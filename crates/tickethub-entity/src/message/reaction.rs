//! Message reactions and their aggregation.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tickethub_core::types::id::{MessageId, UserId};

use crate::user::mask::HIDDEN_PLACEHOLDER;

/// A raw reaction row joined with the reacting user's identity fields.
#[derive(Debug, Clone, FromRow)]
pub struct ReactionRecord {
    /// The message reacted to.
    pub message_id: MessageId,
    /// The reacting user.
    pub user_id: UserId,
    /// Reaction emoji.
    pub emoji: String,
    // Identity fields of the reacting user.
    pub first_name: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub privacy_hidden: bool,
}

/// One emoji aggregated over all reacting users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionGroup {
    /// The emoji.
    pub emoji: String,
    /// How many users reacted with it.
    pub count: u32,
    /// The reacting users, masked for the viewer.
    pub users: Vec<ReactionUser>,
    /// Whether the viewer is among them.
    pub user_reacted: bool,
}

/// A reacting user as shown in a reaction tooltip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionUser {
    /// User ID.
    pub id: UserId,
    /// Shown name, masked for the viewer.
    pub name: String,
}

/// Aggregate raw reaction rows into per-emoji groups, applying the
/// viewer's masking: admins see real names; everyone else sees display
/// names, and hidden users collapse to the placeholder.
pub fn aggregate_reactions(
    records: &[ReactionRecord],
    viewer_id: UserId,
    viewer_is_admin: bool,
) -> Vec<ReactionGroup> {
    let mut groups: Vec<ReactionGroup> = Vec::new();

    for record in records {
        let group = match groups.iter_mut().find(|g| g.emoji == record.emoji) {
            Some(existing) => existing,
            None => {
                groups.push(ReactionGroup {
                    emoji: record.emoji.clone(),
                    count: 0,
                    users: Vec::new(),
                    user_reacted: false,
                });
                groups.last_mut().expect("just pushed")
            }
        };

        group.count += 1;

        let is_self = record.user_id == viewer_id;
        let name = if record.privacy_hidden && !viewer_is_admin && !is_self {
            HIDDEN_PLACEHOLDER.to_string()
        } else if viewer_is_admin {
            record.first_name.clone()
        } else {
            record
                .display_name
                .clone()
                .unwrap_or_else(|| record.first_name.clone())
        };

        group.users.push(ReactionUser {
            id: record.user_id,
            name,
        });

        if is_self {
            group.user_reacted = true;
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: i64, emoji: &str, hidden: bool, display: Option<&str>) -> ReactionRecord {
        ReactionRecord {
            message_id: MessageId(1),
            user_id: UserId(user),
            emoji: emoji.to_string(),
            first_name: format!("User{user}"),
            username: None,
            display_name: display.map(str::to_string),
            privacy_hidden: hidden,
        }
    }

    #[test]
    fn test_grouping_and_counts() {
        let records = vec![
            record(1, "👍", false, None),
            record(2, "👍", false, None),
            record(3, "🔥", false, None),
        ];
        let groups = aggregate_reactions(&records, UserId(2), false);
        assert_eq!(groups.len(), 2);
        let thumbs = groups.iter().find(|g| g.emoji == "👍").expect("group");
        assert_eq!(thumbs.count, 2);
        assert!(thumbs.user_reacted);
        let fire = groups.iter().find(|g| g.emoji == "🔥").expect("group");
        assert!(!fire.user_reacted);
    }

    #[test]
    fn test_hidden_reactor_masked_for_non_admin() {
        let records = vec![record(1, "👍", true, None)];
        let groups = aggregate_reactions(&records, UserId(9), false);
        assert_eq!(groups[0].users[0].name, HIDDEN_PLACEHOLDER);

        let admin_view = aggregate_reactions(&records, UserId(9), true);
        assert_eq!(admin_view[0].users[0].name, "User1");
    }

    #[test]
    fn test_display_name_shown_to_non_admin() {
        let records = vec![record(1, "👍", false, Some("Ghost"))];
        let groups = aggregate_reactions(&records, UserId(9), false);
        assert_eq!(groups[0].users[0].name, "Ghost");

        // Admin sees the real name.
        let admin_view = aggregate_reactions(&records, UserId(9), true);
        assert_eq!(admin_view[0].users[0].name, "User1");
    }
}
