use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

use dream_providers::{BridgeConfig, Scripted};
use dream_types::{ActionId, ui::UiOptions};

/// Overrides `[bridge].url`.
pub const BRIDGE_URL_ENV: &str = "DREAM_BRIDGE_URL";

pub const DEFAULT_CONFIRM_DELAY_MS: u64 = 1000;

#[derive(Debug, Default, Deserialize)]
pub struct DreamConfig {
    pub app: Option<AppConfig>,
    pub verification: Option<VerificationConfig>,
    /// Host bridge the verification provider is reached through.
    pub bridge: Option<BridgeSection>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for stars, the light, and spinners.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Freeze the spinner, star twinkle, and light pulse.
    #[serde(default)]
    pub reduced_motion: bool,
}

/// Verification request defaults.
///
/// ```toml
/// [verification]
/// action = "enter-dream"
/// confirm_delay_ms = 1000
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct VerificationConfig {
    /// Action identifier registered with the identity provider.
    pub action: Option<String>,
    /// Pause between provider success and entering the scene.
    pub confirm_delay_ms: Option<u64>,
}

/// Host bridge configuration.
///
/// ```toml
/// [bridge]
/// url = "http://127.0.0.1:7717"
/// connect_timeout_seconds = 10
/// ```
///
/// `scripted = "success"` (or `"cancel"`) replaces the bridge with a canned
/// provider for running without a host.
#[derive(Debug, Default, Deserialize)]
pub struct BridgeSection {
    pub url: Option<String>,
    pub connect_timeout_seconds: Option<u64>,
    pub scripted: Option<String>,
}

/// Which provider the host environment should get.
#[derive(Debug, Clone)]
pub enum ProviderChoice {
    Bridge(BridgeConfig),
    Scripted(Scripted),
    /// Nothing configured; verification reports the provider as unavailable.
    Absent,
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unclosed: keep the remainder verbatim.
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

impl DreamConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from `path`; a missing file is `Ok(None)`.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.app
            .as_ref()
            .map(|app| UiOptions {
                ascii_only: app.ascii_only,
                high_contrast: app.high_contrast,
                reduced_motion: app.reduced_motion,
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn action(&self) -> ActionId {
        let Some(raw) = self
            .verification
            .as_ref()
            .and_then(|verification| verification.action.as_ref())
        else {
            return ActionId::default();
        };
        ActionId::new(raw.as_str()).unwrap_or_else(|err| {
            tracing::warn!("Ignoring configured action: {err}");
            ActionId::default()
        })
    }

    #[must_use]
    pub fn confirm_delay(&self) -> Duration {
        let ms = self
            .verification
            .as_ref()
            .and_then(|verification| verification.confirm_delay_ms)
            .unwrap_or(DEFAULT_CONFIRM_DELAY_MS);
        Duration::from_millis(ms)
    }

    /// Resolve the provider from `[bridge]`, with `DREAM_BRIDGE_URL` taking
    /// precedence over the configured URL.
    #[must_use]
    pub fn provider_choice(&self) -> ProviderChoice {
        self.provider_choice_with(env::var(BRIDGE_URL_ENV).ok())
    }

    fn provider_choice_with(&self, env_url: Option<String>) -> ProviderChoice {
        let bridge = self.bridge.as_ref();

        let url = env_url
            .or_else(|| bridge.and_then(|b| b.url.as_deref()).map(expand_env_vars))
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        if let Some(url) = url {
            let mut config = BridgeConfig::new(url);
            if let Some(secs) = bridge.and_then(|b| b.connect_timeout_seconds) {
                config.connect_timeout = Duration::from_secs(secs);
            }
            return ProviderChoice::Bridge(config);
        }

        match bridge
            .and_then(|b| b.scripted.as_deref())
            .map(|raw| raw.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("success") => ProviderChoice::Scripted(Scripted::success()),
            Some("cancel" | "cancelled") => ProviderChoice::Scripted(Scripted::cancelled()),
            Some(other) => {
                tracing::warn!("Unknown scripted provider in config: {}", other);
                ProviderChoice::Absent
            }
            None => ProviderChoice::Absent,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".dream-explorer").join("config.toml"))
}
