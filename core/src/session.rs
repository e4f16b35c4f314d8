//! The signed-in user, passed explicitly to every call that needs it.

use crate::types::AuthOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: String,
}

impl Session {
    /// A session exists only when the auth service reported success *and*
    /// handed back a non-empty user id.
    pub fn from_outcome(outcome: &AuthOutcome) -> Option<Self> {
        if !outcome.success {
            return None;
        }
        let user_id = outcome.user_id.as_deref()?.trim();
        if user_id.is_empty() {
            return None;
        }
        Some(Self {
            user_id: user_id.to_string(),
        })
    }

    /// Resume a session for a known user id, e.g. from the command line.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}
