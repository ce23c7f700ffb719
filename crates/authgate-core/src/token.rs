//! Opaque session credential.

use std::fmt;

use zeroize::Zeroize;

use crate::error::AuthError;

/// Upper bound on accepted credential length, in bytes.
pub const MAX_TOKEN_LEN: usize = 4096;

/// Validated session credential.
///
/// The backing buffer is zeroed on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Validate a raw credential.
    ///
    /// Surrounding whitespace is trimmed. The remainder must be non-empty, at
    /// most [`MAX_TOKEN_LEN`] bytes, and free of whitespace and control
    /// characters.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidCredential` naming the violated rule
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(AuthError::InvalidCredential { reason: "credential is empty" });
        }

        if trimmed.len() > MAX_TOKEN_LEN {
            return Err(AuthError::InvalidCredential { reason: "credential is too long" });
        }

        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AuthError::InvalidCredential {
                reason: "credential contains whitespace or control characters",
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Credential contents. Callers must not log the result.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

// Zero the credential bytes on drop
impl Drop for Token {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}
