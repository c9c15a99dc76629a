//! Orchestration of a single deployment: artifact, connection, driver.

use std::path::PathBuf;

use crate::{
    CancelSignal, ConfirmationPolicy, ContractArtifact, DeployError, DeploymentDriver,
    DeploymentResult, LocalNode, LocalNodeConfig, NetworkProfile, Reporter, RpcChainClient,
};

/// A resolved, ready-to-run deployment of one contract to one network.
///
/// Built by [`DeployerBuilder`](crate::DeployerBuilder).
#[derive(Debug, Clone)]
pub struct Deployer {
    /// The target network.
    pub profile: NetworkProfile,
    /// Name of the contract to deploy.
    pub contract: String,
    /// Directory holding the compiled artifacts.
    pub artifacts_dir: PathBuf,
    pub confirmation: ConfirmationPolicy,
    /// Dev node settings, used only for the local network.
    pub local: LocalNodeConfig,
}

impl Deployer {
    /// Run the deployment.
    ///
    /// Loads the artifact, connects to the network (starting a dev node for the
    /// local network) and drives a single creation transaction to confirmation.
    pub async fn deploy(
        self,
        reporter: &mut dyn Reporter,
        cancel: CancelSignal,
    ) -> Result<DeploymentResult, DeployError> {
        tracing::info!(
            network = %self.profile.name(),
            contract = %self.contract,
            "Starting deployment process..."
        );

        let artifact = ContractArtifact::load(&self.artifacts_dir, &self.contract)?;
        self.check_compiler_version(&artifact);

        if cancel.is_cancelled() {
            return Err(DeployError::Interrupted);
        }

        if self.profile.is_local() {
            // Keep the node alive until the driver is done with it.
            let node = LocalNode::spawn(&self.local)?;
            let signer = node.dev_signer()?;
            let client = RpcChainClient::with_signer(&node.endpoint(), signer)
                .map_err(DeployError::LocalNetwork)?;

            DeploymentDriver::new(&client, self.confirmation, cancel)
                .expect_chain(self.profile.name(), node.chain_id())
                .deploy(&artifact, reporter)
                .await
        } else {
            let client = self.connect()?;

            DeploymentDriver::new(&client, self.confirmation, cancel)
                .expect_chain(self.profile.name(), self.profile.chain_id())
                .deploy(&artifact, reporter)
                .await
        }
    }

    fn connect(&self) -> Result<RpcChainClient, DeployError> {
        let network = self.profile.name();
        let missing = |key: Option<&'static str>| DeployError::MissingConfiguration {
            network,
            key: key.unwrap_or("RPC_URL"),
        };

        let endpoint = self
            .profile
            .rpc_endpoint()
            .ok_or_else(|| missing(network.rpc_url_key()))?;
        let credential = self
            .profile
            .signing_credentials()
            .and_then(|keys| keys.first())
            .ok_or_else(|| missing(network.private_key_key()))?;

        RpcChainClient::connect(endpoint, credential)
    }

    fn check_compiler_version(&self, artifact: &ContractArtifact) {
        let expected = self.profile.compiler_version();

        match artifact.compiler_version.as_deref() {
            Some(found) if !found.starts_with(expected) => {
                tracing::warn!(
                    contract = %artifact.name,
                    expected,
                    found,
                    "Artifact was built with a different compiler version"
                );
            }
            Some(_) => {}
            None => {
                tracing::debug!(
                    contract = %artifact.name,
                    "Artifact does not record its compiler version"
                );
            }
        }
    }
}
