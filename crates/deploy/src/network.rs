//! Network profiles and their resolution from environment-style inputs.

use std::fmt;

use url::Url;

use crate::DeployError;

/// The compiler version the contract artifacts are expected to be built with.
pub const DEFAULT_COMPILER_VERSION: &str = "0.8.20";

/// Chain id of the local dev node.
pub const LOCAL_CHAIN_ID: u64 = 31337;

/// The networks a contract can be deployed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum NetworkName {
    /// An ephemeral dev node started for the invocation.
    #[strum(to_string = "local", serialize = "hardhat")]
    Local,
    Sepolia,
    Mainnet,
}

impl NetworkName {
    pub fn chain_id(&self) -> u64 {
        match self {
            NetworkName::Local => LOCAL_CHAIN_ID,
            NetworkName::Sepolia => 11155111,
            NetworkName::Mainnet => 1,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, NetworkName::Local)
    }

    /// The environment key holding the RPC endpoint of this network.
    pub fn rpc_url_key(&self) -> Option<&'static str> {
        match self {
            NetworkName::Local => None,
            NetworkName::Sepolia => Some("SEPOLIA_RPC_URL"),
            NetworkName::Mainnet => Some("MAINNET_RPC_URL"),
        }
    }

    /// The environment keys holding the signing credentials of this network.
    pub fn private_key_key(&self) -> Option<&'static str> {
        match self {
            NetworkName::Local => None,
            NetworkName::Sepolia => Some("SEPOLIA_PRIVATE_KEY (or PRIVATE_KEY)"),
            NetworkName::Mainnet => Some("MAINNET_PRIVATE_KEY (or PRIVATE_KEY)"),
        }
    }
}

/// A hex-encoded private key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Raw endpoint parameters for one external network.
#[derive(Debug, Clone, Default)]
pub struct EndpointInputs {
    pub rpc_url: Option<String>,
    pub private_keys: Vec<String>,
}

/// Environment-style inputs for every external network.
#[derive(Debug, Clone, Default)]
pub struct NetworkInputs {
    pub sepolia: EndpointInputs,
    pub mainnet: EndpointInputs,
    /// Keys shared by all networks that have none of their own.
    pub private_keys: Vec<String>,
}

impl NetworkInputs {
    fn endpoint(&self, name: NetworkName) -> Option<&EndpointInputs> {
        match name {
            NetworkName::Local => None,
            NetworkName::Sepolia => Some(&self.sepolia),
            NetworkName::Mainnet => Some(&self.mainnet),
        }
    }
}

/// Everything needed to reach and sign for one network.
///
/// Built only through [`NetworkProfile::resolve`], so a non-local profile always
/// carries an endpoint and at least one credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    name: NetworkName,
    rpc_endpoint: Option<Url>,
    signing_credentials: Option<Vec<SecretKey>>,
    compiler_version: String,
    chain_id: u64,
}

impl NetworkProfile {
    /// Resolve the profile for `name` from `inputs`.
    ///
    /// Fails with [`DeployError::MissingConfiguration`] when an external network
    /// lacks its RPC URL or signing credentials. Empty values count as missing.
    pub fn resolve(
        name: NetworkName,
        inputs: &NetworkInputs,
        compiler_version: impl Into<String>,
    ) -> Result<Self, DeployError> {
        let compiler_version = compiler_version.into();

        let Some(endpoint) = inputs.endpoint(name) else {
            return Ok(Self::local(compiler_version));
        };

        let rpc_url = endpoint
            .rpc_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(DeployError::MissingConfiguration {
                network: name,
                key: name.rpc_url_key().unwrap_or("RPC_URL"),
            })?;

        let rpc_endpoint = Url::parse(rpc_url).map_err(|e| DeployError::InvalidConfiguration {
            network: name,
            reason: format!("invalid RPC URL: {}", e),
        })?;

        let own_keys = non_empty(&endpoint.private_keys);
        let keys = if own_keys.is_empty() {
            non_empty(&inputs.private_keys)
        } else {
            own_keys
        };

        if keys.is_empty() {
            return Err(DeployError::MissingConfiguration {
                network: name,
                key: name.private_key_key().unwrap_or("PRIVATE_KEY"),
            });
        }

        tracing::debug!(
            network = %name,
            rpc_endpoint = %rpc_endpoint,
            credentials = keys.len(),
            "Resolved network profile"
        );

        Ok(Self {
            name,
            rpc_endpoint: Some(rpc_endpoint),
            signing_credentials: Some(keys),
            compiler_version,
            chain_id: name.chain_id(),
        })
    }

    fn local(compiler_version: String) -> Self {
        Self {
            name: NetworkName::Local,
            rpc_endpoint: None,
            signing_credentials: None,
            compiler_version,
            chain_id: LOCAL_CHAIN_ID,
        }
    }

    pub fn name(&self) -> NetworkName {
        self.name
    }

    pub fn rpc_endpoint(&self) -> Option<&Url> {
        self.rpc_endpoint.as_ref()
    }

    pub fn signing_credentials(&self) -> Option<&[SecretKey]> {
        self.signing_credentials.as_deref()
    }

    pub fn compiler_version(&self) -> &str {
        &self.compiler_version
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn is_local(&self) -> bool {
        self.name.is_local()
    }
}

fn non_empty(keys: &[String]) -> Vec<SecretKey> {
    keys.iter()
        .map(|key| key.trim())
        .filter(|key| !key.is_empty())
        .map(SecretKey::new)
        .collect()
}
