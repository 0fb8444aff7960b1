// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password strength rules and hashing.
//!
//! [`validate`] is pure and runs before any account is created. Hashing
//! uses Argon2id with a salt drawn from the system RNG.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use ring::rand::{SecureRandom, SystemRandom};
use serde::Serialize;
use utoipa::ToSchema;

use super::AuthError;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Well-formed Argon2id hash with default parameters that no password
/// matches. Verified against when a login names an unknown account so both
/// failure paths cost one hash computation.
const DECOY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$rjbOBu3ZljnNdzLdl1JmVA$rzR4o9fmp4dZjzMCPNVfHd63/JF6AAt3l4x1/mzapVs";

/// A single password strength rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    Symbol,
}

impl PasswordRule {
    /// Rules in evaluation order.
    pub const ALL: [PasswordRule; 5] = [
        PasswordRule::MinLength,
        PasswordRule::Uppercase,
        PasswordRule::Lowercase,
        PasswordRule::Digit,
        PasswordRule::Symbol,
    ];

    pub fn is_satisfied_by(&self, password: &str) -> bool {
        match self {
            PasswordRule::MinLength => password.chars().count() >= MIN_PASSWORD_LENGTH,
            PasswordRule::Uppercase => password.chars().any(|c| c.is_ascii_uppercase()),
            PasswordRule::Lowercase => password.chars().any(|c| c.is_ascii_lowercase()),
            PasswordRule::Digit => password.chars().any(|c| c.is_ascii_digit()),
            PasswordRule::Symbol => password.chars().any(|c| !c.is_ascii_alphanumeric()),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PasswordRule::MinLength => "Password must be at least 8 characters long",
            PasswordRule::Uppercase => "Password must contain at least one uppercase letter",
            PasswordRule::Lowercase => "Password must contain at least one lowercase letter",
            PasswordRule::Digit => "Password must contain at least one number",
            PasswordRule::Symbol => "Password must contain at least one special character",
        }
    }
}

/// Outcome of a password strength check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PasswordCheck {
    pub valid: bool,
    /// Every unmet rule's message, joined with `"; "`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Unmet rules, in evaluation order.
    pub unmet: Vec<PasswordRule>,
}

/// Check a candidate password against every strength rule.
pub fn validate(password: &str) -> PasswordCheck {
    let unmet: Vec<PasswordRule> = PasswordRule::ALL
        .into_iter()
        .filter(|rule| !rule.is_satisfied_by(password))
        .collect();

    let reason = if unmet.is_empty() {
        None
    } else {
        Some(
            unmet
                .iter()
                .map(PasswordRule::message)
                .collect::<Vec<_>>()
                .join("; "),
        )
    };

    PasswordCheck {
        valid: unmet.is_empty(),
        reason,
        unmet,
    }
}

/// Hash a password into a PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; 16];
    SystemRandom::new()
        .fill(&mut salt_bytes)
        .map_err(|_| AuthError::Internal("system RNG unavailable".to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AuthError::Internal(format!("Failed to encode salt: {e}")))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored PHC hash.
///
/// An unparseable hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Verify a login attempt against an account's stored hash, if any.
///
/// Without an account the decoy hash is checked and the result is always
/// false.
pub fn verify_login(password: &str, stored_hash: Option<&str>) -> bool {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            let _ = verify_password(password, DECOY_PASSWORD_HASH);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG: &str = "Fern#Leaf42";

    #[test]
    fn strong_password_passes() {
        let check = validate(STRONG);
        assert!(check.valid);
        assert!(check.reason.is_none());
        assert!(check.unmet.is_empty());
    }

    #[test]
    fn each_single_rule_failure_is_rejected() {
        let cases = [
            ("Fe#1abc", PasswordRule::MinLength),
            ("fern#leaf42", PasswordRule::Uppercase),
            ("FERN#LEAF42", PasswordRule::Lowercase),
            ("Fern#LeafXY", PasswordRule::Digit),
            ("FernLeaf42", PasswordRule::Symbol),
        ];

        for (password, rule) in cases {
            let check = validate(password);
            assert!(!check.valid, "{password} should be rejected");
            assert_eq!(check.unmet, vec![rule], "{password}");
            assert_eq!(check.reason.as_deref(), Some(rule.message()));
        }
    }

    #[test]
    fn reason_enumerates_every_unmet_rule_in_order() {
        let check = validate("abc");
        assert_eq!(
            check.unmet,
            vec![
                PasswordRule::MinLength,
                PasswordRule::Uppercase,
                PasswordRule::Digit,
                PasswordRule::Symbol,
            ]
        );
        let reason = check.reason.unwrap();
        assert!(reason.starts_with("Password must be at least 8 characters long; "));
        assert_eq!(reason.split("; ").count(), 4);
    }

    #[test]
    fn empty_password_fails_every_rule() {
        let check = validate("");
        assert_eq!(check.unmet.len(), PasswordRule::ALL.len());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 7 characters, well over 8 bytes
        assert!(!PasswordRule::MinLength.is_satisfied_by("Ab1#ééé"));
        assert!(PasswordRule::MinLength.is_satisfied_by("Ab1#éééé"));
    }

    #[test]
    fn whitespace_counts_as_special_character() {
        assert!(validate("Fern Leaf42").valid);
    }

    #[test]
    fn hash_then_verify() {
        let hash = hash_password(STRONG).expect("should hash password");
        assert!(hash.starts_with("$argon2"));
        assert_ne!(hash, STRONG);
        assert!(verify_password(STRONG, &hash));
        assert!(!verify_password("Fern#Leaf43", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password(STRONG, "not-a-phc-string"));
    }

    #[test]
    fn decoy_hash_uses_default_cost() {
        let decoy = PasswordHash::new(DECOY_PASSWORD_HASH).expect("decoy should parse");
        let real_hash = hash_password(STRONG).unwrap();
        let real = PasswordHash::new(&real_hash).unwrap();
        assert_eq!(decoy.algorithm, real.algorithm);
        assert_eq!(decoy.version, real.version);
        assert_eq!(decoy.params, real.params);
    }

    #[test]
    fn login_without_account_never_matches() {
        assert!(!verify_login(STRONG, None));
        assert!(!verify_login("", None));

        let hash = hash_password(STRONG).unwrap();
        assert!(verify_login(STRONG, Some(&hash)));
        assert!(!verify_login("Fern#Leaf43", Some(&hash)));
    }
}
