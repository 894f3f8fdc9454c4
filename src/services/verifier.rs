//! In-memory verification token holder

use super::traits::HumanVerifier;
use std::sync::Mutex;
use tracing::debug;

/// Environment variable a token can be supplied through at startup
pub const TOKEN_ENV_VAR: &str = "CONTACT_WIZARD_VERIFICATION_TOKEN";

/// Holds the token handed over by the verification widget
///
/// The terminal front end fills it from the token prompt. A token in
/// `CONTACT_WIZARD_VERIFICATION_TOKEN` is picked up once at startup and
/// survives resets.
#[derive(Debug, Default)]
pub struct TokenSlot {
    token: Mutex<Option<String>>,
    standing: Option<String>,
}

impl TokenSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot pre-filled from the environment, if set
    pub fn from_env() -> Self {
        Self::with_standing_token(std::env::var(TOKEN_ENV_VAR).ok().as_deref())
    }

    /// Slot that falls back to `token` whenever it is reset
    pub fn with_standing_token(token: Option<&str>) -> Self {
        let standing = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Self {
            token: Mutex::new(standing.clone()),
            standing,
        }
    }

    /// Callback for the verification widget; blank tokens clear the slot
    pub fn set(&self, token: &str) {
        let token = token.trim();
        let mut guard = self.token.lock().unwrap_or_else(|e| e.into_inner());
        *guard = (!token.is_empty()).then(|| token.to_string());
        debug!(present = guard.is_some(), "Verification token updated");
    }
}

impl HumanVerifier for TokenSlot {
    fn token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn reset(&self) {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = self.standing.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_slot_is_unverified() {
        let slot = TokenSlot::new();
        assert!(!slot.is_verified());
        assert!(slot.token().is_none());
    }

    #[test]
    fn test_set_and_reset() {
        let slot = TokenSlot::new();
        slot.set(" abc ");
        assert_eq!(slot.token().as_deref(), Some("abc"));
        assert!(slot.is_verified());

        slot.reset();
        assert!(!slot.is_verified());
    }

    #[test]
    fn test_blank_token_clears() {
        let slot = TokenSlot::new();
        slot.set("abc");
        slot.set("   ");
        assert!(slot.token().is_none());
    }

    #[test]
    fn test_standing_token_survives_reset() {
        let slot = TokenSlot::with_standing_token(Some(" env-token "));
        assert_eq!(slot.token().as_deref(), Some("env-token"));

        slot.set("prompted");
        slot.reset();
        assert_eq!(slot.token().as_deref(), Some("env-token"));
    }

    #[test]
    fn test_blank_standing_token_is_ignored() {
        let slot = TokenSlot::with_standing_token(Some("  "));
        assert!(!slot.is_verified());
    }
}
