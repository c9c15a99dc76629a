use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gridforce_deploy::{EndpointInputs, NetworkInputs, NetworkName};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "gridforce")]
#[command(
    author,
    version,
    about = "Deploy the GridForce token contract to a local dev node or a public network"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "GRIDFORCE_VERBOSITY", default_value_t = LevelFilter::INFO, global = true)]
    pub verbosity: LevelFilter,

    /// Path to the project settings file.
    ///
    /// If not provided, `./gridforce.toml` is used when it exists.
    #[arg(long, alias = "conf", env = "GRIDFORCE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy the contract and wait for its confirmation.
    Deploy(DeployArgs),
}

#[derive(Debug, Clone, Args)]
pub struct DeployArgs {
    /// The target network.
    ///
    /// `local` (alias `hardhat`) starts an ephemeral anvil node for the invocation.
    #[arg(short, long, env = "GRIDFORCE_NETWORK", default_value_t = NetworkName::Local)]
    pub network: NetworkName,

    /// Name of the contract to deploy. Overrides the `contract` setting.
    #[arg(short, long)]
    pub contract: Option<String>,

    /// Directory holding the compiled artifacts. Overrides the `artifacts` setting.
    #[arg(long, alias = "artifacts-dir")]
    pub artifacts: Option<PathBuf>,

    #[clap(flatten)]
    pub secrets: NetworkSecrets,
}

/// RPC endpoints and signing keys of the external networks.
#[derive(Debug, Clone, Args)]
pub struct NetworkSecrets {
    /// RPC endpoint of the Sepolia network.
    #[arg(long, env = "SEPOLIA_RPC_URL", hide_env_values = true)]
    pub sepolia_rpc_url: Option<String>,

    /// Private key(s) used on Sepolia, comma separated.
    #[arg(long, env = "SEPOLIA_PRIVATE_KEY", value_delimiter = ',', hide_env_values = true)]
    pub sepolia_private_key: Vec<String>,

    /// RPC endpoint of Ethereum mainnet.
    #[arg(long, env = "MAINNET_RPC_URL", hide_env_values = true)]
    pub mainnet_rpc_url: Option<String>,

    /// Private key(s) used on mainnet, comma separated.
    #[arg(long, env = "MAINNET_PRIVATE_KEY", value_delimiter = ',', hide_env_values = true)]
    pub mainnet_private_key: Vec<String>,

    /// Private key(s) used by any external network without keys of its own.
    #[arg(long, env = "PRIVATE_KEY", value_delimiter = ',', hide_env_values = true)]
    pub private_key: Vec<String>,
}

impl From<NetworkSecrets> for NetworkInputs {
    fn from(secrets: NetworkSecrets) -> Self {
        NetworkInputs {
            sepolia: EndpointInputs {
                rpc_url: secrets.sepolia_rpc_url,
                private_keys: secrets.sepolia_private_key,
            },
            mainnet: EndpointInputs {
                rpc_url: secrets.mainnet_rpc_url,
                private_keys: secrets.mainnet_private_key,
            },
            private_keys: secrets.private_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_deploy() {
        let cli = Cli::try_parse_from([
            "gridforce",
            "--verbosity",
            "debug",
            "deploy",
            "--network",
            "hardhat",
            "--contract",
            "Registry",
            "--artifacts",
            "blockchain/artifacts",
        ])
        .unwrap();

        assert_eq!(cli.verbosity, LevelFilter::DEBUG);
        let Command::Deploy(args) = cli.command;
        assert_eq!(args.network, NetworkName::Local);
        assert_eq!(args.contract.as_deref(), Some("Registry"));
        assert_eq!(args.artifacts, Some(PathBuf::from("blockchain/artifacts")));
    }

    #[test]
    fn test_unknown_network_is_rejected() {
        assert!(Cli::try_parse_from(["gridforce", "deploy", "--network", "goerli"]).is_err());
    }

    #[test]
    fn test_secrets_into_inputs() {
        let cli = Cli::try_parse_from([
            "gridforce",
            "deploy",
            "--network",
            "sepolia",
            "--sepolia-rpc-url",
            "https://sepolia.example.org",
            "--private-key",
            "0x01,0x02",
        ])
        .unwrap();

        let Command::Deploy(args) = cli.command;
        assert_eq!(args.network, NetworkName::Sepolia);

        let inputs = NetworkInputs::from(args.secrets);
        assert_eq!(
            inputs.sepolia.rpc_url.as_deref(),
            Some("https://sepolia.example.org")
        );
        assert_eq!(inputs.private_keys, vec!["0x01", "0x02"]);
    }
}
