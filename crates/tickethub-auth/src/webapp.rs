//! Telegram WebApp `initData` verification.
//!
//! Telegram signs the init data it hands to a WebApp with an HMAC chain:
//! the secret key is `HMAC-SHA256(key = "WebAppData", message = bot_token)`,
//! and the `hash` field is `HMAC-SHA256(key = secret, message = dcs)` where
//! `dcs` is the remaining key=value pairs sorted by key and joined with
//! newlines.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// The `user` object embedded in verified init data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebAppUser {
    /// Telegram user ID.
    pub id: i64,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Username.
    #[serde(default)]
    pub username: Option<String>,
    /// Avatar URL, when Telegram includes one.
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Verify a WebApp `initData` string and extract the authenticated user.
///
/// Returns `None` on any mismatch — a wrong hash, a missing hash, or a
/// missing/unparseable `user` field. A `None` must be treated as a
/// forbidden request, never as an anonymous one.
pub fn verify_init_data(bot_token: &str, init_data: &str) -> Option<WebAppUser> {
    if bot_token.is_empty() {
        return None;
    }

    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(init_data.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let hash = pairs.iter().find(|(k, _)| k == "hash")?.1.clone();

    let dcs = data_check_string(&pairs);
    if compute_hash(bot_token, &dcs) != hash {
        return None;
    }

    let user_json = &pairs.iter().find(|(k, _)| k == "user")?.1;
    serde_json::from_str(user_json).ok()
}

/// Build the sorted data-check string from the decoded pairs, excluding
/// the `hash` field itself.
fn data_check_string(pairs: &[(String, String)]) -> String {
    let mut lines: Vec<String> = pairs
        .iter()
        .filter(|(k, _)| k != "hash")
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    lines.sort();
    lines.join("\n")
}

/// Compute the expected hash for a data-check string.
fn compute_hash(bot_token: &str, data_check_string: &str) -> String {
    let mut secret =
        HmacSha256::new_from_slice(b"WebAppData").expect("HMAC accepts any key length");
    secret.update(bot_token.as_bytes());
    let secret_key = secret.finalize().into_bytes();

    let mut mac =
        HmacSha256::new_from_slice(&secret_key).expect("HMAC accepts any key length");
    mac.update(data_check_string.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "12345:TEST_TOKEN";

    /// Build a signed initData string the way Telegram would.
    fn signed_init_data(user_json: &str, auth_date: &str) -> String {
        let pairs = vec![
            ("auth_date".to_string(), auth_date.to_string()),
            ("user".to_string(), user_json.to_string()),
        ];
        let hash = compute_hash(TOKEN, &data_check_string(&pairs));

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &pairs {
            serializer.append_pair(k, v);
        }
        serializer.append_pair("hash", &hash);
        serializer.finish()
    }

    #[test]
    fn test_valid_init_data_round_trip() {
        let init_data = signed_init_data(
            r#"{"id":42,"first_name":"Alice","username":"alice"}"#,
            "1700000000",
        );
        let user = verify_init_data(TOKEN, &init_data).expect("should verify");
        assert_eq!(user.id, 42);
        assert_eq!(user.first_name.as_deref(), Some("Alice"));
        assert_eq!(user.username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_tampered_init_data_rejected() {
        let init_data = signed_init_data(r#"{"id":42,"first_name":"Alice"}"#, "1700000000");
        let tampered = init_data.replace("Alice", "Mallory");
        assert!(verify_init_data(TOKEN, &tampered).is_none());
    }

    #[test]
    fn test_wrong_bot_token_rejected() {
        let init_data = signed_init_data(r#"{"id":42,"first_name":"Alice"}"#, "1700000000");
        assert!(verify_init_data("other:TOKEN", &init_data).is_none());
    }

    #[test]
    fn test_missing_hash_rejected() {
        assert!(verify_init_data(TOKEN, "auth_date=1700000000&user=%7B%22id%22%3A42%7D").is_none());
    }

    #[test]
    fn test_empty_bot_token_rejected() {
        let init_data = signed_init_data(r#"{"id":42}"#, "1700000000");
        assert!(verify_init_data("", &init_data).is_none());
    }
}
