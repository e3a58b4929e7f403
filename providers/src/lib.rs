//! Identity verification providers.
//!
//! # Architecture
//!
//! The crate is organized around a single seam:
//!
//! - [`VerificationProvider`] - one suspending call that returns the provider's
//!   final payload or a [`ProviderError`]
//! - [`bridge`] - World App host bridge client (HTTP, `POST {url}/verify`)
//! - [`scripted`] - in-process provider that replays canned responses
//!
//! # Host environment
//!
//! The provider is owned by the host, not by the app. [`HostEnvironment`]
//! models that: it is installed once at startup, and every later
//! [`HostEnvironment::install`] is a no-op that reports
//! [`InstallOutcome::AlreadyInstalled`]. A host with nothing installed is how
//! "provider unavailable" is represented.
//!
//! # Error Handling
//!
//! Providers never interpret the payload. A `status: "error"` payload is a
//! successful call; only transport, HTTP status, and decoding problems are
//! returned as `Err`.

pub mod bridge;
pub mod scripted;

use std::fmt;
use std::sync::{Arc, OnceLock};

use futures_util::future::BoxFuture;
use thiserror::Error;

pub use bridge::{BridgeConfig, HostBridge};
pub use dream_types;
pub use scripted::{Scripted, ScriptedProvider};

use dream_types::{VerifyPayload, VerifyRequest};

const MAX_ERROR_BODY_BYTES: usize = 4 * 1024;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid bridge url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("bridge request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("bridge returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed bridge response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Rejected(String),
}

/// A host-provided identity verification SDK.
pub trait VerificationProvider: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Issue one verification request and wait for the final payload.
    ///
    /// The future owns everything it needs so it can be spawned.
    fn verify(
        &self,
        request: VerifyRequest,
    ) -> BoxFuture<'static, Result<VerifyPayload, ProviderError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    /// A provider was already present; the new one was dropped.
    AlreadyInstalled,
}

/// Process-wide provider slot, filled at most once.
#[derive(Debug, Default)]
pub struct HostEnvironment {
    provider: OnceLock<Arc<dyn VerificationProvider>>,
}

impl HostEnvironment {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            provider: OnceLock::new(),
        }
    }

    /// Install `provider` if the slot is empty.
    ///
    /// Calling this again is a no-op: the first provider stays installed and
    /// [`InstallOutcome::AlreadyInstalled`] is returned.
    pub fn install(&self, provider: Arc<dyn VerificationProvider>) -> InstallOutcome {
        let name = provider.name();
        match self.provider.set(provider) {
            Ok(()) => {
                tracing::info!(provider = name, "Verification provider installed");
                InstallOutcome::Installed
            }
            Err(_) => {
                tracing::debug!(provider = name, "Verification provider already installed");
                InstallOutcome::AlreadyInstalled
            }
        }
    }

    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.provider.get().is_some()
    }

    #[must_use]
    pub fn provider(&self) -> Option<Arc<dyn VerificationProvider>> {
        self.provider.get().cloned()
    }
}

/// The process-wide host environment.
pub fn host() -> &'static HostEnvironment {
    static HOST: HostEnvironment = HostEnvironment::new();
    &HOST
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body.trim().to_string();
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", body[..end].trim())
}
