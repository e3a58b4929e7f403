//! In-process provider that replays canned responses.
//!
//! Used by tests and by `[bridge] scripted = "..."` for running the app
//! without a host.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use futures_util::future::BoxFuture;

use dream_types::{VerificationLevel, VerifyPayload, VerifyRequest};

use crate::{ProviderError, VerificationProvider};

/// One canned response.
#[derive(Debug, Clone)]
pub enum Scripted {
    Payload(VerifyPayload),
    Fail(String),
}

impl Scripted {
    #[must_use]
    pub fn success() -> Self {
        Self::Payload(VerifyPayload::Success {
            proof: "0x0".to_string(),
            merkle_root: "0x0".to_string(),
            nullifier_hash: "0x0".to_string(),
            verification_level: VerificationLevel::Orb,
        })
    }

    #[must_use]
    pub fn cancelled() -> Self {
        Self::Payload(VerifyPayload::Error {
            error_code: Some("user_rejected".to_string()),
        })
    }

    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }
}

#[derive(Debug, Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Scripted>>,
    /// Returned once `responses` runs dry; `None` fails the call.
    repeat: Option<Scripted>,
    latency: Duration,
    requests: Mutex<Vec<VerifyRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Answer every call with `response`.
    #[must_use]
    pub fn always(response: Scripted) -> Self {
        Self {
            repeat: Some(response),
            ..Self::default()
        }
    }

    /// Hold each response for `latency` before returning it.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<VerifyRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn next_response(&self) -> Scripted {
        let queued = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front());
        queued
            .or_else(|| self.repeat.clone())
            .unwrap_or_else(|| Scripted::fail("no scripted response left"))
    }
}

impl VerificationProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn verify(
        &self,
        request: VerifyRequest,
    ) -> BoxFuture<'static, Result<VerifyPayload, ProviderError>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let response = self.next_response();
        let latency = self.latency;
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            match response {
                Scripted::Payload(payload) => Ok(payload),
                Scripted::Fail(message) => Err(ProviderError::Rejected(message)),
            }
        })
    }
}
