//! The one-shot deployment lifecycle: submit, await confirmation, report.

use std::time::Duration;

use alloy_core::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

use crate::{
    CancelSignal, ChainClient, ContractArtifact, CreationReceipt, DeployError, NetworkName,
    rpc::{self, PollError},
};

/// How long and how often to wait for the creation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationPolicy {
    /// Delay between two receipt lookups.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Give up once this much time has passed since submission.
    #[serde(with = "humantime_serde")]
    pub max_wait: Duration,
    /// Blocks, including the inclusion block, required before the deployment counts.
    pub confirmations: u64,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: rpc::DEFAULT_POLL_INTERVAL,
            max_wait: Duration::from_secs(300),
            confirmations: 1,
        }
    }
}

/// A confirmed deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    pub contract_address: Address,
    pub transaction_hash: TxHash,
    pub block_number: u64,
    pub confirmed: bool,
}

/// Lifecycle stages, as they appear in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DeploymentStage {
    Initiated,
    Submitted,
    Confirmed,
    Failed,
}

/// Receives the human-readable progress of a deployment.
pub trait Reporter {
    /// Called once, right before the creation transaction is sent.
    fn deploying(&mut self, contract: &str);

    /// Called once the deployment is confirmed.
    fn deployed(&mut self, contract: &str, result: &DeploymentResult);
}

/// Prints progress to stdout.
#[derive(Debug, Default)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn deploying(&mut self, contract: &str) {
        println!("Deploying {}...", contract);
    }

    fn deployed(&mut self, contract: &str, result: &DeploymentResult) {
        println!("{} deployed to: {}", contract, result.contract_address);
    }
}

/// Drives a single contract deployment through a [`ChainClient`].
///
/// At most one creation transaction is sent per call to [`deploy`](Self::deploy),
/// and failures are never retried.
pub struct DeploymentDriver<'a, C: ?Sized> {
    client: &'a C,
    policy: ConfirmationPolicy,
    cancel: CancelSignal,
    expected_chain: Option<(NetworkName, u64)>,
}

impl<'a, C> DeploymentDriver<'a, C>
where
    C: ChainClient + ?Sized,
{
    pub fn new(client: &'a C, policy: ConfirmationPolicy, cancel: CancelSignal) -> Self {
        Self {
            client,
            policy,
            cancel,
            expected_chain: None,
        }
    }

    /// Refuse to submit unless the endpoint reports `chain_id`.
    pub fn expect_chain(mut self, network: NetworkName, chain_id: u64) -> Self {
        self.expected_chain = Some((network, chain_id));
        self
    }

    /// Deploy `artifact` and wait for its confirmation.
    pub async fn deploy(
        &self,
        artifact: &ContractArtifact,
        reporter: &mut dyn Reporter,
    ) -> Result<DeploymentResult, DeployError> {
        let result = self.run(artifact, reporter).await;

        if let Err(err) = &result {
            tracing::error!(
                stage = %DeploymentStage::Failed,
                contract = %artifact.name,
                error = %err,
                "Deployment failed"
            );
        }

        result
    }

    async fn run(
        &self,
        artifact: &ContractArtifact,
        reporter: &mut dyn Reporter,
    ) -> Result<DeploymentResult, DeployError> {
        let deployer = self.client.deployer();

        tracing::info!(
            stage = %DeploymentStage::Initiated,
            contract = %artifact.name,
            %deployer,
            bytecode_len = artifact.bytecode.len(),
            "Preparing creation transaction"
        );

        self.check_chain().await?;

        let nonce = self.client.nonce().await.map_err(DeployError::Submission)?;

        // Last point where nothing has been broadcast yet.
        if self.cancel.is_cancelled() {
            return Err(DeployError::Interrupted);
        }

        reporter.deploying(&artifact.name);

        let tx_hash = self
            .client
            .send_creation(artifact.bytecode.clone())
            .await
            .map_err(DeployError::Submission)?;

        tracing::info!(
            stage = %DeploymentStage::Submitted,
            %tx_hash,
            nonce,
            predicted_address = %deployer.create(nonce),
            "Creation transaction submitted, waiting for confirmation..."
        );

        let receipt = self.await_confirmation(tx_hash).await?;
        let block_number = receipt.block_number.unwrap_or_default();

        let contract_address = receipt.contract_address.ok_or_else(|| {
            DeployError::Confirmation {
                tx_hash,
                source: anyhow::anyhow!("Receipt carries no contract address"),
            }
        })?;

        let code = self
            .client
            .code_at(contract_address)
            .await
            .map_err(|source| DeployError::Confirmation { tx_hash, source })?;
        if code.is_empty() {
            return Err(DeployError::Confirmation {
                tx_hash,
                source: anyhow::anyhow!("No code deployed at {}", contract_address),
            });
        }

        let result = DeploymentResult {
            contract_address,
            transaction_hash: tx_hash,
            block_number,
            confirmed: true,
        };

        tracing::info!(
            stage = %DeploymentStage::Confirmed,
            contract = %artifact.name,
            address = %contract_address,
            %tx_hash,
            block_number,
            code_len = code.len(),
            "Contract deployed"
        );

        reporter.deployed(&artifact.name, &result);

        Ok(result)
    }

    async fn check_chain(&self) -> Result<(), DeployError> {
        let Some((network, expected)) = self.expected_chain else {
            return Ok(());
        };

        let actual = self
            .client
            .chain_id()
            .await
            .map_err(DeployError::Submission)?;

        if actual != expected {
            return Err(DeployError::ChainMismatch {
                network,
                expected,
                actual,
            });
        }

        Ok(())
    }

    async fn await_confirmation(&self, tx_hash: TxHash) -> Result<CreationReceipt, DeployError> {
        let client = self.client;
        let confirmations = self.policy.confirmations.max(1);

        rpc::poll_until(
            "creation receipt",
            self.policy.poll_interval,
            self.policy.max_wait,
            &self.cancel,
            move || async move {
                let Some(receipt) = client.receipt(tx_hash).await? else {
                    return Ok(None);
                };

                if receipt.transaction_hash != tx_hash {
                    anyhow::bail!(
                        "Endpoint returned the receipt of {} instead",
                        receipt.transaction_hash
                    );
                }

                if !receipt.success {
                    anyhow::bail!(
                        "Transaction reverted in block {}",
                        receipt
                            .block_number
                            .map_or_else(|| "unknown".to_string(), |n| n.to_string())
                    );
                }

                let Some(mined_in) = receipt.block_number else {
                    return Ok(None);
                };

                if confirmations > 1 {
                    let head = client.block_number().await?;
                    let depth = head.saturating_sub(mined_in) + 1;
                    if depth < confirmations {
                        tracing::debug!(%tx_hash, depth, confirmations, "Waiting for more confirmations");
                        return Ok(None);
                    }
                }

                Ok(Some(receipt))
            },
        )
        .await
        .map_err(|err| match err {
            PollError::Failed(source) => DeployError::Confirmation { tx_hash, source },
            PollError::TimedOut { polls, waited } => DeployError::Timeout {
                tx_hash,
                waited,
                polls,
            },
            PollError::Cancelled => DeployError::Cancelled { tx_hash },
        })
    }
}
