//! Identity masking.
//!
//! Every place a user identity is rendered to another party — the online
//! list, the typing list, ticket authors, message authors, the user
//! directory, reaction user lists — goes through [`mask_identity`], so the
//! privacy rules cannot drift between call sites.
//!
//! The rules, in order:
//!
//! 1. A `privacy_hidden` subject viewed by a non-admin who is not the
//!    subject renders as the placeholder identity (and is omitted from
//!    online/directory listings entirely — callers use
//!    [`Identity::hidden_from_lists`] / [`Identity::hidden_from_online`]
//!    to filter before rendering).
//! 2. `display_name`/`display_avatar` override the real name/photo for
//!    non-admin viewers *and for the subject's own self-view*; a set
//!    `display_name` also suppresses the username; the literal
//!    `display_avatar == "hidden"` forces no avatar.
//! 3. Admin viewers see the masked fields plus a `real` block with the
//!    underlying identity and privacy flags.

use serde::{Deserialize, Serialize};

use tickethub_core::types::id::UserId;

use super::model::User;

/// Name shown for a hidden subject in author contexts.
pub const HIDDEN_PLACEHOLDER: &str = "Hidden user";

/// Sentinel `display_avatar` value that suppresses the avatar entirely.
pub const AVATAR_HIDDEN: &str = "hidden";

/// The identity-relevant slice of a user, as stored.
///
/// Repositories that join author columns onto other rows build this
/// directly; everywhere else it comes `From<&User>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User ID.
    pub id: UserId,
    /// Real first name.
    pub first_name: String,
    /// Real username.
    pub username: Option<String>,
    /// Real avatar URL.
    pub photo_url: Option<String>,
    /// Shown-name override.
    pub display_name: Option<String>,
    /// Shown-avatar override.
    pub display_avatar: Option<String>,
    /// Fully invisible to non-admins.
    pub privacy_hidden: bool,
    /// Invisible in the online list only.
    pub privacy_hide_online: bool,
    /// Activity context hidden from non-admins.
    pub privacy_hide_activity: bool,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            username: user.username.clone(),
            photo_url: user.photo_url.clone(),
            display_name: user.display_name.clone(),
            display_avatar: user.display_avatar.clone(),
            privacy_hidden: user.privacy_hidden,
            privacy_hide_online: user.privacy_hide_online,
            privacy_hide_activity: user.privacy_hide_activity,
        }
    }
}

impl Identity {
    /// Whether this subject is omitted from directory-style listings for
    /// the given viewer.
    pub fn hidden_from_lists(&self, viewer_is_admin: bool, is_self: bool) -> bool {
        self.privacy_hidden && !viewer_is_admin && !is_self
    }

    /// Whether this subject is omitted from the online list for the given
    /// viewer. `privacy_hide_online` hides from the online list only;
    /// `privacy_hidden` hides everywhere.
    pub fn hidden_from_online(&self, viewer_is_admin: bool, is_self: bool) -> bool {
        (self.privacy_hidden || self.privacy_hide_online) && !viewer_is_admin && !is_self
    }

    /// Whether the subject's view/ticket context must be reported as null
    /// to the given viewer.
    pub fn activity_hidden_from(&self, viewer_is_admin: bool) -> bool {
        self.privacy_hide_activity && !viewer_is_admin
    }

    /// Whether any privacy setting or display override is active.
    pub fn has_privacy_flags(&self) -> bool {
        self.privacy_hidden
            || self.privacy_hide_online
            || self.privacy_hide_activity
            || self.display_name.is_some()
            || self.display_avatar.is_some()
    }

    fn shown_name(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| self.first_name.clone())
    }

    fn shown_avatar(&self) -> Option<String> {
        match self.display_avatar.as_deref() {
            Some(AVATAR_HIDDEN) => None,
            Some(other) => Some(other.to_string()),
            None => self.photo_url.clone(),
        }
    }
}

/// A user identity as permitted for a specific viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskedIdentity {
    /// User ID.
    pub id: UserId,
    /// Shown name.
    pub name: String,
    /// Shown username (suppressed when a display name is set).
    pub username: Option<String>,
    /// Shown avatar URL.
    pub avatar: Option<String>,
    /// The underlying identity — present for admin viewers only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real: Option<RealIdentity>,
}

/// The real identity fields exposed to admin viewers alongside the mask.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealIdentity {
    /// Real first name.
    pub first_name: String,
    /// Real username.
    pub username: Option<String>,
    /// Real avatar URL.
    pub photo_url: Option<String>,
    /// Shown-name override, if any.
    pub display_name: Option<String>,
    /// Shown-avatar override, if any.
    pub display_avatar: Option<String>,
    /// Privacy flags.
    pub privacy_hidden: bool,
    pub privacy_hide_online: bool,
    pub privacy_hide_activity: bool,
}

/// Transform a subject's identity into what the viewer may see.
pub fn mask_identity(subject: &Identity, viewer_is_admin: bool, is_self: bool) -> MaskedIdentity {
    if viewer_is_admin {
        // Admins see the public-facing mask plus the real identity.
        return MaskedIdentity {
            id: subject.id,
            name: subject.shown_name(),
            username: subject.username.clone(),
            avatar: subject.shown_avatar(),
            real: Some(RealIdentity {
                first_name: subject.first_name.clone(),
                username: subject.username.clone(),
                photo_url: subject.photo_url.clone(),
                display_name: subject.display_name.clone(),
                display_avatar: subject.display_avatar.clone(),
                privacy_hidden: subject.privacy_hidden,
                privacy_hide_online: subject.privacy_hide_online,
                privacy_hide_activity: subject.privacy_hide_activity,
            }),
        };
    }

    if subject.privacy_hidden && !is_self {
        // In contexts that cannot omit the subject (e.g. a ticket author),
        // a hidden user renders as the placeholder identity.
        return MaskedIdentity {
            id: subject.id,
            name: HIDDEN_PLACEHOLDER.to_string(),
            username: None,
            avatar: None,
            real: None,
        };
    }

    // Self-view and regular non-admin view both get the display overrides,
    // so a user sees exactly what others see.
    MaskedIdentity {
        id: subject.id,
        name: subject.shown_name(),
        username: if subject.display_name.is_some() {
            None
        } else {
            subject.username.clone()
        },
        avatar: subject.shown_avatar(),
        real: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> Identity {
        Identity {
            id: UserId(1),
            first_name: "Alice".to_string(),
            username: Some("alice".to_string()),
            photo_url: Some("/uploads/avatar_1.jpg".to_string()),
            display_name: None,
            display_avatar: None,
            privacy_hidden: false,
            privacy_hide_online: false,
            privacy_hide_activity: false,
        }
    }

    #[test]
    fn test_plain_subject_passes_through() {
        let masked = mask_identity(&subject(), false, false);
        assert_eq!(masked.name, "Alice");
        assert_eq!(masked.username.as_deref(), Some("alice"));
        assert_eq!(masked.avatar.as_deref(), Some("/uploads/avatar_1.jpg"));
        assert!(masked.real.is_none());
    }

    #[test]
    fn test_hidden_subject_placeholder_for_non_admin() {
        let mut s = subject();
        s.privacy_hidden = true;
        let masked = mask_identity(&s, false, false);
        assert_eq!(masked.name, HIDDEN_PLACEHOLDER);
        assert!(masked.username.is_none());
        assert!(masked.avatar.is_none());
        assert!(masked.real.is_none());
    }

    #[test]
    fn test_hidden_subject_real_fields_for_admin() {
        let mut s = subject();
        s.privacy_hidden = true;
        let masked = mask_identity(&s, true, false);
        assert_eq!(masked.name, "Alice");
        let real = masked.real.expect("admin sees real identity");
        assert_eq!(real.first_name, "Alice");
        assert!(real.privacy_hidden);
    }

    #[test]
    fn test_display_override_round_trip() {
        let mut s = subject();
        s.display_name = Some("Ghost".to_string());
        s.display_avatar = Some(AVATAR_HIDDEN.to_string());

        let masked = mask_identity(&s, false, false);
        assert_eq!(masked.name, "Ghost");
        assert!(masked.username.is_none(), "display name suppresses username");
        assert!(masked.avatar.is_none(), "'hidden' sentinel suppresses avatar");

        let admin_view = mask_identity(&s, true, false);
        assert_eq!(admin_view.name, "Ghost");
        let real = admin_view.real.expect("admin sees real identity");
        assert_eq!(real.first_name, "Alice");
        assert_eq!(real.photo_url.as_deref(), Some("/uploads/avatar_1.jpg"));
        assert_eq!(real.display_name.as_deref(), Some("Ghost"));
    }

    #[test]
    fn test_display_avatar_custom_replaces_photo() {
        let mut s = subject();
        s.display_avatar = Some("/uploads/fake.png".to_string());
        let masked = mask_identity(&s, false, false);
        assert_eq!(masked.avatar.as_deref(), Some("/uploads/fake.png"));
    }

    #[test]
    fn test_self_view_is_masked_without_real_block() {
        let mut s = subject();
        s.display_name = Some("Ghost".to_string());
        s.privacy_hidden = true;
        let masked = mask_identity(&s, false, true);
        // Self sees the same mask others would see, not the raw identity,
        // and never the admin-only real block.
        assert_eq!(masked.name, "Ghost");
        assert!(masked.real.is_none());
    }

    #[test]
    fn test_list_filters() {
        let mut s = subject();
        s.privacy_hide_online = true;
        assert!(s.hidden_from_online(false, false));
        assert!(!s.hidden_from_lists(false, false), "hide_online keeps the user in the directory");
        assert!(!s.hidden_from_online(true, false), "admins see everyone");
        assert!(!s.hidden_from_online(false, true), "you always see yourself");

        let mut h = subject();
        h.privacy_hidden = true;
        assert!(h.hidden_from_online(false, false));
        assert!(h.hidden_from_lists(false, false), "hidden leaves the directory too");
    }

    #[test]
    fn test_activity_hiding() {
        let mut s = subject();
        s.privacy_hide_activity = true;
        assert!(s.activity_hidden_from(false));
        assert!(!s.activity_hidden_from(true));
    }
}
