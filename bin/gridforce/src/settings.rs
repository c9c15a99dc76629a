use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use gridforce_deploy::{
    ConfirmationPolicy, DEFAULT_ARTIFACTS_DIR, DEFAULT_COMPILER_VERSION, DEFAULT_CONTRACT,
    LocalNodeConfig,
};
use serde::{Deserialize, Serialize};

/// The default name of the project settings file.
pub const SETTINGS_FILENAME: &str = "gridforce.toml";

/// Prefix of the environment variables overriding the settings file.
const ENV_PREFIX: &str = "GRIDFORCE_";

/// Project settings: defaults, then `gridforce.toml`, then `GRIDFORCE_*` variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Expected compiler version of the artifacts.
    pub solidity: String,
    /// Directory holding the compiled artifacts.
    pub artifacts: PathBuf,
    /// Contract to deploy.
    pub contract: String,
    pub confirmation: ConfirmationPolicy,
    pub local: LocalNodeConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            solidity: DEFAULT_COMPILER_VERSION.to_string(),
            artifacts: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            contract: DEFAULT_CONTRACT.to_string(),
            confirmation: ConfirmationPolicy::default(),
            local: LocalNodeConfig::default(),
        }
    }
}

impl Settings {
    /// Load the settings.
    ///
    /// An explicit `path` must exist. Without one, `./gridforce.toml` is read
    /// when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Settings file not found: {}", path.display());
                }
                path
            }
            None => Path::new(SETTINGS_FILENAME),
        };

        let settings: Self = Self::figment(path)
            .extract()
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;

        tracing::debug!(path = %path.display(), ?settings, "Settings loaded");
        Ok(settings)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
