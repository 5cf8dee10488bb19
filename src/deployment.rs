use std::sync::Arc;

use ethers::prelude::SignerMiddleware;
use ethers::providers::{Middleware, Provider};
use ethers::signers::{Signer, Wallet};
use eyre::WrapErr;
use tracing::info;

use self::plan::DeploymentPlan;
use self::predictor::CreateAddressPredictor;
use self::sequencer::Sequencer;
use crate::cli::Args;
use crate::common_keys::RpcSigner;
use crate::config::DeployConfig;
use crate::report::ContractAddressSet;

pub mod deployment_context;
pub mod plan;
pub mod predictor;
pub mod sequencer;

pub use self::deployment_context::DeploymentContext;

pub async fn run_deployment(cmd: Args) -> eyre::Result<()> {
    let config = DeployConfig::from_args(&cmd)?;
    let topology = config.topology();

    info!(%topology, ?config, "Starting deployment");

    let provider = Provider::try_from(cmd.rpc_url.as_str())?;
    let chain_id = provider
        .get_chainid()
        .await
        .wrap_err_with(|| format!("Connecting to {}", cmd.rpc_url))?;
    let wallet = Wallet::from(cmd.private_key.key.clone())
        .with_chain_id(chain_id.as_u64());

    let signer = SignerMiddleware::new(provider, wallet);

    let context = DeploymentContext {
        contracts_dir: cmd.contracts_dir,
        private_key: cmd.private_key,
        rpc_url: cmd.rpc_url,
        rpc_signer: RpcSigner(Arc::new(signer)),
        etherscan_api_key: cmd.etherscan_api_key,
        verifier: cmd.verifier,
        verifier_url: cmd.verifier_url,
    };

    let plan = DeploymentPlan::for_topology(topology, &config);

    let report = Sequencer::new(CreateAddressPredictor, &context)
        .run(&plan, &config)
        .await?;

    report.write(&cmd.report_path).await?;

    let addresses = ContractAddressSet::from_report(&report)?;

    println!("{}", addresses.render());

    addresses.write(&cmd.output_path).await?;

    info!(
        output = %cmd.output_path.display(),
        report = %cmd.report_path.display(),
        "Deployment finished"
    );

    Ok(())
}
