//! World App host bridge client.
//!
//! The bridge is a local endpoint exposed by the host. It takes the request
//! as JSON and answers with the final payload once the user has acted:
//!
//! ```text
//! POST {url}/verify
//! {"action":"enter-dream","verification_level":"orb"}
//!
//! 200 {"status":"success","proof":"0x..","merkle_root":"0x..","nullifier_hash":"0x..","verification_level":"orb"}
//! 200 {"status":"error","error_code":"user_rejected"}
//! ```
//!
//! No request timeout is applied: the call lasts as long as the host keeps it
//! open. Only connecting is bounded.

use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::{Client, Url, redirect};

use dream_types::{VerifyPayload, VerifyRequest};

use crate::{ProviderError, VerificationProvider, truncate_body};

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const VERIFY_PATH: &str = "verify";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub url: String,
    pub connect_timeout: Duration,
}

impl BridgeConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HostBridge {
    client: Client,
    endpoint: Url,
}

impl HostBridge {
    pub fn new(config: &BridgeConfig) -> Result<Self, ProviderError> {
        let endpoint = verify_endpoint(&config.url)?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { client, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn verify_endpoint(raw: &str) -> Result<Url, ProviderError> {
    let invalid = |reason: String| ProviderError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let trimmed = raw.trim();
    // Treat the base as a directory so `join` appends rather than replaces.
    let base = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let base = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;
    match base.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {other}"))),
    }
    base.join(VERIFY_PATH).map_err(|e| invalid(e.to_string()))
}

impl VerificationProvider for HostBridge {
    fn name(&self) -> &'static str {
        "world-app-bridge"
    }

    fn verify(
        &self,
        request: VerifyRequest,
    ) -> BoxFuture<'static, Result<VerifyPayload, ProviderError>> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        Box::pin(async move {
            tracing::debug!(
                %endpoint,
                action = %request.action,
                level = request.verification_level.as_str(),
                "Sending verification request to host bridge"
            );

            let response = client.post(endpoint).json(&request).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderError::Status {
                    status: status.as_u16(),
                    body: truncate_body(&body),
                });
            }

            let bytes = response.bytes().await?;
            let payload: VerifyPayload = serde_json::from_slice(&bytes)?;
            Ok(payload)
        })
    }
}
