//! Ephemeral local network backed by an `anvil` dev node.

use std::path::PathBuf;

use alloy_node_bindings::{Anvil, AnvilInstance};
use alloy_signer_local::PrivateKeySigner;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{DeployError, LOCAL_CHAIN_ID};

/// Configuration for the local dev node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalNodeConfig {
    /// Path to the `anvil` binary. Looked up on `PATH` when not set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anvil: Option<PathBuf>,
    /// Chain id the node runs with.
    pub chain_id: u64,
}

impl Default for LocalNodeConfig {
    fn default() -> Self {
        Self {
            anvil: None,
            chain_id: LOCAL_CHAIN_ID,
        }
    }
}

/// Handle for a running dev node. The node is killed on drop.
pub struct LocalNode {
    instance: AnvilInstance,
}

impl LocalNode {
    /// Spawn a fresh dev node with funded accounts.
    pub fn spawn(config: &LocalNodeConfig) -> Result<Self, DeployError> {
        let mut anvil = Anvil::new().chain_id(config.chain_id);
        if let Some(path) = &config.anvil {
            anvil = anvil.path(path);
        }

        let instance = anvil
            .try_spawn()
            .context("Failed to spawn anvil; is it installed and on PATH?")
            .map_err(DeployError::LocalNetwork)?;

        tracing::info!(
            endpoint = %instance.endpoint_url(),
            chain_id = instance.chain_id(),
            accounts = instance.addresses().len(),
            "Local network started"
        );

        Ok(Self { instance })
    }

    pub fn endpoint(&self) -> Url {
        self.instance.endpoint_url()
    }

    pub fn chain_id(&self) -> u64 {
        self.instance.chain_id()
    }

    /// Signer for the first funded dev account.
    pub fn dev_signer(&self) -> Result<PrivateKeySigner, DeployError> {
        self.instance
            .keys()
            .first()
            .cloned()
            .map(PrivateKeySigner::from)
            .context("Local network exposes no dev accounts")
            .map_err(DeployError::LocalNetwork)
    }
}
