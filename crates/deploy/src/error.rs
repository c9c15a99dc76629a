//! Errors surfaced by the deployment pipeline.

use std::time::Duration;

use alloy_core::primitives::TxHash;

use crate::NetworkName;

/// Every way a deployment can stop short of a confirmed contract.
///
/// Variants before [`DeployError::Submission`] are raised before any
/// transaction leaves the process.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// A network that needs external parameters is missing one of them.
    #[error("missing configuration for network `{network}`: {key} is not set")]
    MissingConfiguration {
        network: NetworkName,
        key: &'static str,
    },

    /// A network parameter is present but unusable.
    #[error("invalid configuration for network `{network}`: {reason}")]
    InvalidConfiguration { network: NetworkName, reason: String },

    /// The contract artifact could not be loaded.
    #[error("failed to load artifact for contract `{contract}`")]
    Artifact {
        contract: String,
        #[source]
        source: anyhow::Error,
    },

    /// The ephemeral local network could not be started.
    #[error("failed to start the local network")]
    LocalNetwork(#[source] anyhow::Error),

    /// Cancellation was requested before the creation transaction was sent.
    #[error("deployment cancelled before the creation transaction was sent")]
    Interrupted,

    /// The endpoint serves a different chain than the selected network.
    #[error("connected to chain {actual} but network `{network}` expects chain {expected}")]
    ChainMismatch {
        network: NetworkName,
        expected: u64,
        actual: u64,
    },

    /// The creation transaction could not be transmitted.
    #[error("failed to submit the creation transaction")]
    Submission(#[source] anyhow::Error),

    /// The network rejected the transaction or its confirmation could not be read.
    #[error("failed to confirm creation transaction {tx_hash}")]
    Confirmation {
        tx_hash: TxHash,
        #[source]
        source: anyhow::Error,
    },

    /// The transaction was not confirmed in time.
    #[error("creation transaction {tx_hash} not confirmed after {waited:?} ({polls} polls)")]
    Timeout {
        tx_hash: TxHash,
        waited: Duration,
        polls: u32,
    },

    /// Waiting for confirmation was interrupted.
    #[error("cancelled while waiting for creation transaction {tx_hash}")]
    Cancelled { tx_hash: TxHash },
}

impl DeployError {
    /// Whether the failure happened before anything was sent to the network.
    pub fn is_pre_submission(&self) -> bool {
        matches!(
            self,
            Self::MissingConfiguration { .. }
                | Self::InvalidConfiguration { .. }
                | Self::Artifact { .. }
                | Self::LocalNetwork(_)
                | Self::Interrupted
                | Self::ChainMismatch { .. }
        )
    }
}
