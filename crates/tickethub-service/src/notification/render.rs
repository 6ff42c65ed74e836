//! Notification text rendering.
//!
//! Texts are HTML (Telegram's `parse_mode=HTML`), so everything
//! user-controlled goes through [`escape_html`].

use tickethub_core::types::id::TicketId;
use tickethub_entity::ticket::{TicketKind, TicketPriority, TicketStatus};
use tickethub_entity::user::User;

/// Message preview length in notifications.
const PREVIEW_CHARS: usize = 300;

/// Escape the characters Telegram's HTML mode treats specially.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// How a user is referred to in notification texts.
pub fn author_label(user: &User) -> String {
    match &user.username {
        Some(username) => format!("@{username}"),
        None => user.first_name.clone(),
    }
}

/// Deep link to a ticket on the site.
pub fn ticket_url(site_url: &str, ticket_id: TicketId) -> String {
    format!("{site_url}/#ticket-{ticket_id}")
}

/// New message posted on a ticket.
pub fn new_message(ticket_id: TicketId, title: &str, author: &str, content: &str) -> String {
    let preview: String = content.chars().take(PREVIEW_CHARS).collect();
    let body = if preview.is_empty() {
        "[files]".to_string()
    } else {
        escape_html(&preview)
    };
    format!(
        "💬 New message on #{ticket_id}\n<b>{}</b>\nFrom: {author}\n\n{body}",
        escape_html(title)
    )
}

/// Ticket status changed.
pub fn status_changed(
    ticket_id: TicketId,
    title: &str,
    from: TicketStatus,
    to: TicketStatus,
) -> String {
    format!(
        "🔄 Ticket #{ticket_id} status changed\n<b>{}</b>\n{} → {}",
        escape_html(title),
        from.label(),
        to.label()
    )
}

/// Ticket title changed.
pub fn title_changed(ticket_id: TicketId, old_title: &str, new_title: &str) -> String {
    format!(
        "✏️ Ticket #{ticket_id} title changed\n“{}” → “{}”",
        escape_html(old_title),
        escape_html(new_title)
    )
}

/// A new ticket was created (admin alert).
pub fn new_ticket(
    kind: TicketKind,
    title: &str,
    author: &str,
    priority: TicketPriority,
    is_private: bool,
) -> String {
    format!(
        "🆕 New {}: <b>{}</b>\nAuthor: {author}\nPriority: {priority}\n{}",
        kind.label(),
        escape_html(title),
        if is_private {
            "🔒 Private"
        } else {
            "🌐 Public"
        }
    )
}

/// System message recorded in the thread on a status change.
pub fn status_system_message(from: TicketStatus, to: TicketStatus) -> String {
    format!("Status changed: {} → {}", from.label(), to.label())
}

/// System message recorded in the thread on a title change.
pub fn title_system_message(old_title: &str, new_title: &str) -> String {
    format!("Title changed: “{old_title}” → “{new_title}”")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("a <b> & c"),
            "a &lt;b&gt; &amp; c"
        );
    }

    #[test]
    fn test_new_message_escapes_and_truncates() {
        let long = "x".repeat(400);
        let text = new_message(TicketId(7), "<title>", "@alice", &long);
        assert!(text.contains("&lt;title&gt;"));
        assert!(text.contains(&"x".repeat(300)));
        assert!(!text.contains(&"x".repeat(301)));
    }

    #[test]
    fn test_new_message_without_content_mentions_files() {
        let text = new_message(TicketId(7), "T", "@alice", "");
        assert!(text.contains("[files]"));
    }

    #[test]
    fn test_status_changed_uses_labels() {
        let text = status_changed(
            TicketId(1),
            "T",
            TicketStatus::Open,
            TicketStatus::InProgress,
        );
        assert!(text.contains("Open → In progress"));
    }
}
