//! The advanced-mode password gate.
//!
//! A single string comparison against one configured literal, exactly
//! as shallow as it sounds. This is a demo toggle, not access control;
//! the secret is configurable so deployments can at least rotate it.

use std::env;

/// Environment variable that overrides the default secret.
pub const PASSWORD_ENV_VAR: &str = "SENTIANALYZE_ADVANCED_PASSWORD";

const DEFAULT_PASSWORD: &str = "advanced123";

pub struct AccessGate {
    secret: String,
}

impl AccessGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    /// Builds the gate from the environment, falling back to the
    /// well-known default secret.
    pub fn from_env() -> Self {
        match env::var(PASSWORD_ENV_VAR) {
            Ok(secret) if !secret.is_empty() => Self::new(secret),
            _ => {
                log::warn!(
                    "{} not set; advanced mode uses the default password",
                    PASSWORD_ENV_VAR
                );
                Self::new(DEFAULT_PASSWORD)
            }
        }
    }

    pub fn verify(&self, candidate: &str) -> bool {
        candidate == self.secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_password_passes() {
        let gate = AccessGate::new("advanced123");
        assert!(gate.verify("advanced123"));
    }

    #[test]
    fn test_wrong_or_empty_password_fails() {
        let gate = AccessGate::new("advanced123");
        assert!(!gate.verify("advanced124"));
        assert!(!gate.verify(""));
        assert!(!gate.verify("ADVANCED123"));
    }
}
