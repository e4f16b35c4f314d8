//! Request and response payloads for the receipt backend.
//!
//! # Design
//! The backend's records (warranty products, reminders, wallet items,
//! dashboards) are passed through to the caller untouched as `Record` maps.
//! Only the payloads this crate builds, plus the sign-in answer it has to
//! interpret, get concrete types. These are defined independently of the
//! mock-server crate; integration tests catch schema drift.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An untyped JSON object as returned by the backend.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Email and password submitted by the sign-in form.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Payload for creating an account.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// What the auth service says about a sign-in or sign-up attempt.
///
/// `success` and `user_id` are reported independently; a session exists only
/// when both agree (see `Session::from_outcome`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReminderRequest {
    pub user_id: String,
    pub product_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAllRemindersRequest {
    pub user_id: String,
}

/// Kind of Google Wallet pass the backend can issue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PassType {
    Receipt,
    Warranty,
}

impl std::str::FromStr for PassType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "receipt" => Ok(PassType::Receipt),
            "warranty" => Ok(PassType::Warranty),
            other => Err(format!("unknown pass type {other:?}, expected receipt or warranty")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePassRequest {
    pub item_id: String,
    pub pass_type: PassType,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_email: String,
    pub message: String,
    pub message_type: String,
}
