//! gridforce-deploy - Deployment library for the GridForce token contract.
//!
//! This crate resolves a target network from environment-style inputs, loads a
//! compiled contract artifact and drives a single contract-creation transaction
//! to confirmation, either against an ephemeral local dev node or an external
//! JSON-RPC endpoint.

mod artifact;
pub use artifact::ContractArtifact;

mod builder;
pub use builder::{DEFAULT_ARTIFACTS_DIR, DEFAULT_CONTRACT, DeployerBuilder};

mod cancel;
pub use cancel::{CancelHandle, CancelSignal};

mod client;
pub use client::{ChainClient, CreationReceipt, RpcChainClient};

mod deployer;
pub use deployer::Deployer;

mod driver;
pub use driver::{
    ConfirmationPolicy, DeploymentDriver, DeploymentResult, DeploymentStage, Reporter,
    StdoutReporter,
};

mod error;
pub use error::DeployError;

mod local;
pub use local::{LocalNode, LocalNodeConfig};

mod network;
pub use network::{
    DEFAULT_COMPILER_VERSION, EndpointInputs, LOCAL_CHAIN_ID, NetworkInputs, NetworkName,
    NetworkProfile, SecretKey,
};

pub mod rpc;
