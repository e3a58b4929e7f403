//! Provider installation at startup.

use std::sync::Arc;

use dream_providers::{HostBridge, HostEnvironment, InstallOutcome, ScriptedProvider};

use crate::config::{DreamConfig, ProviderChoice};

/// Install the provider `config` asks for into `host`.
///
/// Returns `None` when nothing was installed: no provider configured, or the
/// bridge could not be built. Both leave verification reporting the provider
/// as unavailable.
pub fn install_provider(config: &DreamConfig, host: &HostEnvironment) -> Option<InstallOutcome> {
    match config.provider_choice() {
        ProviderChoice::Bridge(bridge) => match HostBridge::new(&bridge) {
            Ok(client) => {
                tracing::info!(endpoint = %client.endpoint(), "Using World App host bridge");
                Some(host.install(Arc::new(client)))
            }
            Err(err) => {
                tracing::warn!("Host bridge unavailable: {err}");
                None
            }
        },
        ProviderChoice::Scripted(response) => {
            tracing::info!(?response, "Using scripted verification provider");
            Some(host.install(Arc::new(ScriptedProvider::always(response))))
        }
        ProviderChoice::Absent => {
            tracing::info!("No verification provider configured");
            None
        }
    }
}
