//! A string value that should never be printed, the way
//! `strix_crypto::BearerToken` redacts its value.

/// An environment-sourced secret (an API key). `Debug` redacts the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a raw secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The underlying value, for passing to whatever needs it (an LLM
    /// provider's `Authorization` header, for instance).
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_value() {
        let secret = Secret::new("sk-abc123");
        assert_eq!(format!("{secret:?}"), "Secret(<redacted>)");
    }
}
