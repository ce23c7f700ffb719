//! Fuzz target for credential validation
//!
//! # Invariants
//!
//! - Accepted credentials are trimmed, non-empty, bounded, and free of
//!   whitespace and control characters
//! - Parsing an accepted credential again yields the same credential
//! - `Debug` never prints the credential
//! - Rejections are always `InvalidCredential`

#![no_main]

use authgate_core::{AuthError, MAX_TOKEN_LEN, Token};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|raw: &str| {
    match Token::parse(raw) {
        Ok(token) => {
            let exposed = token.expose();
            assert_eq!(exposed, raw.trim());
            assert!(!exposed.is_empty());
            assert!(exposed.len() <= MAX_TOKEN_LEN);
            assert!(!exposed.chars().any(|c| c.is_whitespace() || c.is_control()));

            assert_eq!(Token::parse(exposed).as_ref(), Ok(&token));
            assert_eq!(format!("{token:?}"), "Token(<redacted>)");
        },
        Err(err) => assert!(matches!(err, AuthError::InvalidCredential { .. })),
    }
});
