//! Verification request, payload, and flow state types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Action identifier registered for entering the dream space.
pub const DEFAULT_ACTION: &str = "enter-dream";

/// User-facing feedback strings shown on the gate screen.
pub mod feedback {
    pub const WELCOME: &str = "Welcome to your Dream Space.";
    pub const PLEASE_VERIFY: &str = "Please verify your humanity to generate your world...";
    pub const CONFIRMING: &str = "Verifying proof...";
    pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";

    /// Feedback shown after a cancelled or failed attempt.
    #[must_use]
    pub fn error(message: &str) -> String {
        format!("Error: {message}")
    }
}

// ============================================================================
// Request
// ============================================================================

/// Opaque action identifier scoping a verification to one application action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionId(String);

#[derive(Debug, Error)]
#[error("action identifier must not be empty")]
pub struct ActionIdError;

impl ActionId {
    pub fn new(value: impl Into<String>) -> Result<Self, ActionIdError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(ActionIdError)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self(DEFAULT_ACTION.to_string())
    }
}

impl TryFrom<String> for ActionId {
    type Error = ActionIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActionId> for String {
    fn from(value: ActionId) -> Self {
        value.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strength of identity proof requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationLevel {
    /// Biometric verification at an Orb. Highest tier.
    #[default]
    Orb,
    Device,
}

impl VerificationLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Orb => "orb",
            Self::Device => "device",
        }
    }
}

/// A single verification request sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub action: ActionId,
    pub verification_level: VerificationLevel,
}

impl VerifyRequest {
    /// Request at the `Orb` level for the given action.
    #[must_use]
    pub fn orb(action: ActionId) -> Self {
        Self {
            action,
            verification_level: VerificationLevel::Orb,
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// Final payload returned by the provider, tagged by `status`.
///
/// The proof fields are carried as-is. Nothing in this crate validates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VerifyPayload {
    Success {
        #[serde(default)]
        proof: String,
        #[serde(default)]
        merkle_root: String,
        #[serde(default)]
        nullifier_hash: String,
        #[serde(default)]
        verification_level: VerificationLevel,
    },
    Error {
        #[serde(default)]
        error_code: Option<String>,
    },
    /// Any other status, such as `cancelled` or `pending`. Not a success.
    #[serde(other)]
    Other,
}

impl VerifyPayload {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Errors surfaced by a verification attempt. None of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("Verification provider unavailable. Make sure the World App bridge is configured.")]
    ProviderUnavailable,
    #[error("Verification was cancelled.")]
    Cancelled,
    #[error("{0}")]
    Failed(String),
}

impl VerificationError {
    /// Feedback line for the gate screen.
    #[must_use]
    pub fn feedback(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            return feedback::UNKNOWN_ERROR.to_string();
        }
        feedback::error(&message)
    }
}

// ============================================================================
// Flow state
// ============================================================================

/// Where the verification flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowPhase {
    #[default]
    Idle,
    Requesting,
    /// Provider reported success; waiting out the confirmation delay.
    Confirming,
    Succeeded,
    Cancelled,
    Failed,
}

impl FlowPhase {
    /// Whether a new attempt may be started from this phase.
    #[must_use]
    pub fn can_trigger(self) -> bool {
        matches!(self, Self::Idle | Self::Cancelled | Self::Failed)
    }
}

/// Transient UI state owned by the verification flow.
///
/// Invariant: `loading` is true only between request dispatch and the
/// terminal response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationState {
    pub verified: bool,
    pub feedback: String,
    pub loading: bool,
}

impl Default for VerificationState {
    fn default() -> Self {
        Self {
            verified: false,
            feedback: feedback::WELCOME.to_string(),
            loading: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ActionId, FlowPhase, VerificationError, VerificationLevel, VerificationState,
        VerifyPayload, VerifyRequest, feedback,
    };

    #[test]
    fn default_state_is_welcome() {
        let state = VerificationState::default();
        assert!(!state.verified);
        assert!(!state.loading);
        assert_eq!(state.feedback, feedback::WELCOME);
    }

    #[test]
    fn action_id_rejects_blank() {
        assert!(ActionId::new("   ").is_err());
        assert_eq!(ActionId::new(" enter-dream ").unwrap().as_str(), "enter-dream");
        assert_eq!(ActionId::default().as_str(), "enter-dream");
    }

    #[test]
    fn request_serializes_lowercase_level() {
        let request = VerifyRequest::orb(ActionId::default());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["action"], "enter-dream");
        assert_eq!(json["verification_level"], "orb");
    }

    #[test]
    fn payload_parses_success() {
        let raw = r#"{
            "status": "success",
            "proof": "0xproof",
            "merkle_root": "0xroot",
            "nullifier_hash": "0xnull",
            "verification_level": "orb"
        }"#;
        let payload: VerifyPayload = serde_json::from_str(raw).unwrap();
        assert!(payload.is_success());
        match payload {
            VerifyPayload::Success {
                verification_level, ..
            } => assert_eq!(verification_level, VerificationLevel::Orb),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn payload_accepts_device_level() {
        let raw = r#"{"status":"success","verification_level":"device"}"#;
        let payload: VerifyPayload = serde_json::from_str(raw).unwrap();
        match payload {
            VerifyPayload::Success {
                verification_level, ..
            } => assert_eq!(verification_level, VerificationLevel::Device),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn payload_parses_error_without_code() {
        let payload: VerifyPayload = serde_json::from_str(r#"{"status":"error"}"#).unwrap();
        assert_eq!(payload, VerifyPayload::Error { error_code: None });
        assert!(!payload.is_success());
    }

    #[test]
    fn unknown_status_is_not_success() {
        for raw in [r#"{"status":"cancelled"}"#, r#"{"status":"pending","extra":1}"#] {
            let payload: VerifyPayload = serde_json::from_str(raw).unwrap();
            assert_eq!(payload, VerifyPayload::Other, "{raw}");
            assert!(!payload.is_success());
        }
    }

    #[test]
    fn payload_without_status_is_rejected() {
        assert!(serde_json::from_str::<VerifyPayload>(r#"{"proof":"0x"}"#).is_err());
    }

    #[test]
    fn error_feedback_is_prefixed() {
        assert_eq!(
            VerificationError::Cancelled.feedback(),
            "Error: Verification was cancelled."
        );
        assert!(
            VerificationError::ProviderUnavailable
                .feedback()
                .contains("unavailable")
        );
        assert_eq!(
            VerificationError::Failed(String::new()).feedback(),
            feedback::UNKNOWN_ERROR
        );
    }

    #[test]
    fn only_settled_failures_can_retrigger() {
        assert!(FlowPhase::Idle.can_trigger());
        assert!(FlowPhase::Cancelled.can_trigger());
        assert!(FlowPhase::Failed.can_trigger());
        assert!(!FlowPhase::Requesting.can_trigger());
        assert!(!FlowPhase::Confirming.can_trigger());
        assert!(!FlowPhase::Succeeded.can_trigger());
    }
}
