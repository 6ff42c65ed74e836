//! Opaque token generation.

use rand::Rng;

/// Length in bytes of a session token (64 hex chars on the wire).
const SESSION_TOKEN_BYTES: usize = 32;

/// Length in bytes of a deep-link login token (40 hex chars on the wire).
const LOGIN_TOKEN_BYTES: usize = 20;

/// Generate an opaque session token.
pub fn generate_session_token() -> String {
    random_hex(SESSION_TOKEN_BYTES)
}

/// Generate a deep-link login token.
pub fn generate_login_token() -> String {
    random_hex(LOGIN_TOKEN_BYTES)
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_shape() {
        let token = generate_session_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_login_token_shape() {
        let token = generate_login_token();
        assert_eq!(token.len(), 40);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_session_token(), generate_session_token());
    }
}
