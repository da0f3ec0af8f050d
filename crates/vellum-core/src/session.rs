//! Session and authentication result types.
//!
//! A session is either tied to a signed-in remote identity or secured by a
//! locally held passcode (offline). The identity engine owns the live
//! session; these are the structured results and events it exchanges with
//! the orchestration layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A signed-in user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uuid: Uuid,
    pub email: String,
}

/// Error tag carried by an MFA challenge response.
pub const AUTH_ERROR_TAG_MFA_REQUIRED: &str = "mfa-required";

/// Error tag carried by a rejected MFA code.
pub const AUTH_ERROR_TAG_MFA_INVALID: &str = "mfa-invalid";

/// Structured error returned by login/register.
///
/// MFA challenges arrive through this type as well; they are control flow,
/// not failures, and are distinguished by tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthError {
    /// Machine-readable tag ("mfa-required", "mfa-invalid", ...)
    #[serde(default)]
    pub tag: Option<String>,

    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,

    /// Challenge payload; for MFA this carries the parameter name the
    /// retried request must include (`mfa_key`)
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

impl AuthError {
    /// Whether this error is an MFA challenge rather than a failure.
    pub fn is_mfa_challenge(&self) -> bool {
        matches!(
            self.tag.as_deref(),
            Some(AUTH_ERROR_TAG_MFA_REQUIRED) | Some(AUTH_ERROR_TAG_MFA_INVALID)
        )
    }

    /// The request parameter name an MFA retry must populate, if this is
    /// an MFA challenge.
    pub fn mfa_key(&self) -> Option<&str> {
        self.payload
            .as_ref()
            .and_then(|p| p.get("mfa_key"))
            .and_then(|k| k.as_str())
    }

    /// Message for user presentation, with a fallback for truncated
    /// responses.
    pub fn display_message(&self) -> &str {
        self.message.as_deref().unwrap_or("An unknown error occurred.")
    }
}

/// Response from a login or register attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Present on success
    #[serde(default)]
    pub user: Option<User>,

    /// Present on failure or MFA challenge
    #[serde(default)]
    pub error: Option<AuthError>,
}

impl AuthResponse {
    /// A successful response for the given user.
    pub fn success(user: User) -> Self {
        Self {
            user: Some(user),
            error: None,
        }
    }

    /// A failed response with the given error.
    pub fn failure(error: AuthError) -> Self {
        Self {
            user: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.user.is_some()
    }
}

/// Events emitted by the identity engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityEvent {
    /// The active identity signed out; in-memory items and sync session
    /// state must be purged.
    SignedOut,
}
