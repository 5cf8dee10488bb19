use std::path::PathBuf;

use clap::Parser;

pub mod private_key;

pub use private_key::PrivateKey;
use reqwest::Url;

#[derive(Debug, Clone, Parser)]
#[clap(rename_all = "kebab-case")]
pub struct Args {
    /// Deploy the market and reward contracts alongside flow and mine
    ///
    /// Only the literal `true` (any case) enables the market
    #[clap(long, env, default_value = "false")]
    pub enable_market: String,

    /// Epoch length of the flow contract, in blocks
    #[clap(long, env, default_value = "1000000000")]
    pub blocks_per_epoch: String,

    /// Lifetime of market and reward contracts, in months
    #[clap(long, env, default_value = "3")]
    pub lifetime_month: String,

    /// Initial hash rate of the mine contract
    #[clap(long, env, default_value = "1000")]
    pub init_hash_rate: String,

    /// Private key to use for the deployment
    #[clap(short, long, env)]
    pub private_key: PrivateKey,

    /// The RPC Url to use for the deployment
    #[clap(short, long, env)]
    pub rpc_url: Url,

    /// Root of the forge project holding the contracts
    #[clap(long, env, default_value = ".")]
    pub contracts_dir: PathBuf,

    /// Where the deployed addresses are written
    #[clap(short, long, env, default_value = "./deploy/localtest.py")]
    pub output_path: PathBuf,

    /// Where the full deployment report is written
    #[clap(long, env, default_value = "./deploy/report.yml")]
    pub report_path: PathBuf,

    /// The etherscan API key to use
    #[clap(short, long, env)]
    pub etherscan_api_key: Option<String>,

    /// Verifier to pass to forge when verifying contracts
    #[clap(long, env)]
    pub verifier: Option<String>,

    /// Verifier url to pass to forge when verifying contracts
    #[clap(long, env)]
    pub verifier_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use clap::CommandFactory;

    use super::*;

    const KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn tunables_default_when_absent() {
        let args = Args::try_parse_from([
            "flow-deployer",
            "--private-key",
            KEY,
            "--rpc-url",
            "http://localhost:8545",
        ])
        .unwrap();

        assert_eq!(args.enable_market, "false");
        assert_eq!(args.blocks_per_epoch, "1000000000");
        assert_eq!(args.lifetime_month, "3");
        assert_eq!(args.init_hash_rate, "1000");
        assert_eq!(args.output_path, PathBuf::from("./deploy/localtest.py"));
        assert!(args.etherscan_api_key.is_none());
    }

    #[test]
    fn tunables_accept_malformed_values() {
        let args = Args::try_parse_from([
            "flow-deployer",
            "--private-key",
            KEY,
            "--rpc-url",
            "http://localhost:8545",
            "--enable-market",
            "yes",
            "--blocks-per-epoch",
            "many",
        ])
        .unwrap();

        assert_eq!(args.enable_market, "yes");
        assert_eq!(args.blocks_per_epoch, "many");
    }

    #[test]
    fn tunables_read_their_env_vars() {
        let command = Args::command();

        for (id, env) in [
            ("enable_market", "ENABLE_MARKET"),
            ("blocks_per_epoch", "BLOCKS_PER_EPOCH"),
            ("lifetime_month", "LIFETIME_MONTH"),
            ("init_hash_rate", "INIT_HASH_RATE"),
            ("private_key", "PRIVATE_KEY"),
            ("rpc_url", "RPC_URL"),
        ] {
            let arg = command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .unwrap_or_else(|| panic!("no argument {id}"));

            assert_eq!(arg.get_env(), Some(OsStr::new(env)), "{id}");
        }
    }
}
