//! Builder module for creating a [`Deployer`] configuration.
//!
//! The builder collects the target network, the raw configuration inputs and
//! the deployment options, and resolves them into a [`Deployer`]. Resolution
//! happens entirely offline, so a missing RPC URL or credential is reported
//! before anything is loaded, spawned or sent.

use std::path::PathBuf;

use crate::{
    ConfirmationPolicy, DEFAULT_COMPILER_VERSION, DeployError, Deployer, LocalNodeConfig,
    NetworkInputs, NetworkName, NetworkProfile,
};

/// Contract deployed when none is named.
pub const DEFAULT_CONTRACT: &str = "GridToken";

/// Directory holding the compiled artifacts when none is given.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Builder for creating a [`Deployer`] configuration.
///
/// # Example
///
/// ```no_run
/// use gridforce_deploy::{CancelSignal, DeployerBuilder, NetworkName, StdoutReporter};
///
/// # async fn example() -> anyhow::Result<()> {
/// let deployer = DeployerBuilder::new(NetworkName::Local)
///     .contract("GridToken")
///     .artifacts_dir("blockchain/artifacts")
///     .build()?;
///
/// let result = deployer
///     .deploy(&mut StdoutReporter, CancelSignal::never())
///     .await?;
/// println!("{}", result.contract_address);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DeployerBuilder {
    /// The target network (required).
    network: NetworkName,
    /// RPC URLs and credentials read from the environment.
    inputs: NetworkInputs,
    /// Compiler version the artifacts are expected to be built with.
    compiler_version: Option<String>,
    artifacts_dir: Option<PathBuf>,
    contract: Option<String>,
    confirmation: ConfirmationPolicy,
    local: LocalNodeConfig,
}

impl DeployerBuilder {
    /// Create a new [`DeployerBuilder`] targeting `network`.
    pub fn new(network: NetworkName) -> Self {
        Self {
            network,
            inputs: NetworkInputs::default(),
            compiler_version: None,
            artifacts_dir: None,
            contract: None,
            confirmation: ConfirmationPolicy::default(),
            local: LocalNodeConfig::default(),
        }
    }

    /// Set the RPC URLs and signing credentials available to external networks.
    pub fn inputs(mut self, inputs: NetworkInputs) -> Self {
        self.inputs = inputs;
        self
    }

    /// Set the expected compiler version.
    ///
    /// Defaults to [`DEFAULT_COMPILER_VERSION`].
    pub fn compiler_version(mut self, version: impl Into<String>) -> Self {
        self.compiler_version = Some(version.into());
        self
    }

    /// Set the directory holding the compiled artifacts.
    ///
    /// Defaults to `./artifacts`.
    pub fn artifacts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(path.into());
        self
    }

    /// Set the name of the contract to deploy.
    ///
    /// Defaults to `GridToken`.
    pub fn contract(mut self, name: impl Into<String>) -> Self {
        self.contract = Some(name.into());
        self
    }

    pub fn confirmation(mut self, policy: ConfirmationPolicy) -> Self {
        self.confirmation = policy;
        self
    }

    /// Configure the dev node used for [`NetworkName::Local`].
    pub fn local(mut self, config: LocalNodeConfig) -> Self {
        self.local = config;
        self
    }

    /// Build the [`Deployer`] configuration.
    ///
    /// Fails with [`DeployError::MissingConfiguration`] or
    /// [`DeployError::InvalidConfiguration`] when the network profile cannot be
    /// resolved.
    pub fn build(self) -> Result<Deployer, DeployError> {
        let compiler_version = self
            .compiler_version
            .unwrap_or_else(|| DEFAULT_COMPILER_VERSION.to_string());

        let contract = self
            .contract
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTRACT.to_string());

        let artifacts_dir = self
            .artifacts_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR));

        let profile = NetworkProfile::resolve(self.network, &self.inputs, compiler_version)?;

        tracing::info!(
            network = %profile.name(),
            chain_id = profile.chain_id(),
            contract,
            artifacts_dir = %artifacts_dir.display(),
            "Building deployer configuration..."
        );

        Ok(Deployer {
            profile,
            contract,
            artifacts_dir,
            confirmation: self.confirmation,
            local: self.local,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::EndpointInputs;

    #[test]
    fn test_builder_defaults() {
        let builder = DeployerBuilder::new(NetworkName::Local);
        assert_eq!(builder.network, NetworkName::Local);
        assert!(builder.compiler_version.is_none());
        assert!(builder.artifacts_dir.is_none());
        assert!(builder.contract.is_none());
        assert_eq!(builder.confirmation, ConfirmationPolicy::default());

        let deployer = builder.build().unwrap();
        assert_eq!(deployer.contract, "GridToken");
        assert_eq!(deployer.artifacts_dir, PathBuf::from("artifacts"));
        assert_eq!(deployer.profile.compiler_version(), "0.8.20");
        assert!(deployer.profile.is_local());
    }

    #[test]
    fn test_builder_with_options() {
        let policy = ConfirmationPolicy {
            poll_interval: Duration::from_millis(500),
            max_wait: Duration::from_secs(30),
            confirmations: 2,
        };

        let deployer = DeployerBuilder::new(NetworkName::Local)
            .contract("Registry")
            .artifacts_dir("blockchain/artifacts")
            .compiler_version("0.8.24")
            .confirmation(policy)
            .local(LocalNodeConfig {
                chain_id: 1337,
                ..Default::default()
            })
            .build()
            .unwrap();

        assert_eq!(deployer.contract, "Registry");
        assert_eq!(deployer.artifacts_dir, PathBuf::from("blockchain/artifacts"));
        assert_eq!(deployer.profile.compiler_version(), "0.8.24");
        assert_eq!(deployer.confirmation, policy);
        assert_eq!(deployer.local.chain_id, 1337);
    }

    #[test]
    fn test_blank_contract_falls_back_to_default() {
        let deployer = DeployerBuilder::new(NetworkName::Local)
            .contract("  ")
            .build()
            .unwrap();
        assert_eq!(deployer.contract, DEFAULT_CONTRACT);
    }

    #[test]
    fn test_build_fails_fast_on_missing_configuration() {
        let err = DeployerBuilder::new(NetworkName::Sepolia)
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            DeployError::MissingConfiguration {
                network: NetworkName::Sepolia,
                key: "SEPOLIA_RPC_URL"
            }
        ));
    }

    #[test]
    fn test_build_external_network() {
        let inputs = NetworkInputs {
            mainnet: EndpointInputs {
                rpc_url: Some("https://eth.example.org".to_string()),
                private_keys: vec![],
            },
            private_keys: vec!["0x01".to_string()],
            ..Default::default()
        };

        let deployer = DeployerBuilder::new(NetworkName::Mainnet)
            .inputs(inputs)
            .build()
            .unwrap();

        assert_eq!(deployer.profile.name(), NetworkName::Mainnet);
        assert_eq!(deployer.profile.chain_id(), 1);
        assert_eq!(
            deployer.profile.rpc_endpoint().map(|u| u.as_str()),
            Some("https://eth.example.org/")
        );
    }
}
