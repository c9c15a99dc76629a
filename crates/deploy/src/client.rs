//! The signing and RPC capability consumed by the deployment driver.

use alloy_core::primitives::{Address, Bytes, TxHash};
use alloy_network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport_http::Http;
use anyhow::Context;
use async_trait::async_trait;
use url::Url;

use crate::{DeployError, SecretKey, rpc};

/// The parts of a transaction receipt the deployment cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationReceipt {
    pub transaction_hash: TxHash,
    /// Block the transaction was included in, if already mined.
    pub block_number: Option<u64>,
    /// Whether execution succeeded.
    pub success: bool,
    pub contract_address: Option<Address>,
}

/// A connection to a chain with an account able to send transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the account that signs the creation transaction.
    fn deployer(&self) -> Address;

    async fn chain_id(&self) -> anyhow::Result<u64>;

    /// Next nonce of the deployer account.
    async fn nonce(&self) -> anyhow::Result<u64>;

    /// Sign and broadcast a contract-creation transaction.
    async fn send_creation(&self, bytecode: Bytes) -> anyhow::Result<TxHash>;

    /// Fetch the receipt of `tx_hash`, `None` while it is still pending.
    async fn receipt(&self, tx_hash: TxHash) -> anyhow::Result<Option<CreationReceipt>>;

    async fn block_number(&self) -> anyhow::Result<u64>;

    async fn code_at(&self, address: Address) -> anyhow::Result<Bytes>;
}

/// [`ChainClient`] backed by a JSON-RPC endpoint and a local private key.
pub struct RpcChainClient {
    provider: DynProvider,
    deployer: Address,
}

impl RpcChainClient {
    /// Connect to `endpoint`, signing with `credential`.
    ///
    /// Nothing is sent to the endpoint yet. A credential that is not a valid
    /// secp256k1 private key fails with [`DeployError::Submission`].
    pub fn connect(endpoint: &Url, credential: &SecretKey) -> Result<Self, DeployError> {
        let signer: PrivateKeySigner = credential
            .expose()
            .parse()
            .context("Malformed signing credential")
            .map_err(DeployError::Submission)?;

        Self::with_signer(endpoint, signer).map_err(DeployError::Submission)
    }

    /// Connect to `endpoint` with an already decoded signer.
    pub fn with_signer(endpoint: &Url, signer: PrivateKeySigner) -> anyhow::Result<Self> {
        let deployer = signer.address();

        let transport = Http::with_client(rpc::create_client()?, endpoint.clone());
        let client = RpcClient::new(transport, false);

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_client(client)
            .erased();

        tracing::debug!(endpoint = %endpoint, %deployer, "Chain client ready");

        Ok(Self { provider, deployer })
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    fn deployer(&self) -> Address {
        self.deployer
    }

    async fn chain_id(&self) -> anyhow::Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .context("Failed to fetch chain id")
    }

    async fn nonce(&self) -> anyhow::Result<u64> {
        self.provider
            .get_transaction_count(self.deployer)
            .await
            .context("Failed to fetch deployer nonce")
    }

    async fn send_creation(&self, bytecode: Bytes) -> anyhow::Result<TxHash> {
        let tx = TransactionRequest::default()
            .with_from(self.deployer)
            .with_deploy_code(bytecode);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .context("Failed to send creation transaction")?;

        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, tx_hash: TxHash) -> anyhow::Result<Option<CreationReceipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .with_context(|| format!("Failed to fetch receipt for {}", tx_hash))?;

        Ok(receipt.map(|receipt| CreationReceipt {
            transaction_hash: ReceiptResponse::transaction_hash(&receipt),
            block_number: ReceiptResponse::block_number(&receipt),
            success: ReceiptResponse::status(&receipt),
            contract_address: ReceiptResponse::contract_address(&receipt),
        }))
    }

    async fn block_number(&self) -> anyhow::Result<u64> {
        self.provider
            .get_block_number()
            .await
            .context("Failed to fetch block number")
    }

    async fn code_at(&self, address: Address) -> anyhow::Result<Bytes> {
        self.provider
            .get_code_at(address)
            .await
            .with_context(|| format!("Failed to fetch code at {}", address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_malformed_credential() {
        let endpoint = Url::parse("http://localhost:8545").unwrap();

        for key in ["not-hex", "0x1234", ""] {
            let result = RpcChainClient::connect(&endpoint, &SecretKey::new(key));
            assert!(
                matches!(result, Err(DeployError::Submission(_))),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_connect_derives_deployer_address() {
        let endpoint = Url::parse("http://localhost:8545").unwrap();
        // First anvil/hardhat dev account.
        let key = SecretKey::new(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        );

        let client = RpcChainClient::connect(&endpoint, &key).unwrap();
        assert_eq!(
            client.deployer(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
                .parse::<Address>()
                .unwrap()
        );
    }
}
