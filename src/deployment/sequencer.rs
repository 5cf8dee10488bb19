use ethers::types::Address;
use eyre::{bail, ensure, WrapErr};
use tracing::{info, instrument};

use super::plan::{ConstructorValue, ContractKind, DeploymentPlan};
use super::predictor::{predict_addresses, AddressPredictor};
use crate::config::DeployConfig;
use crate::report::{ContractDeployment, DeployedContract, Report};
use crate::types::BlockNumber;

/// The chain as seen by the sequencer.
///
/// Every call returns only once the chain has confirmed it, and nothing else
/// may submit transactions for the deployer while a sequence runs.
pub trait DeploymentBackend {
    async fn deployer_address(&self) -> eyre::Result<Address>;

    async fn transaction_count(&self, address: Address) -> eyre::Result<u64>;

    /// Creates `kind` from the deployer account using exactly `nonce`
    async fn deploy(
        &self,
        kind: ContractKind,
        args: &[ConstructorValue],
        nonce: u64,
    ) -> eyre::Result<ContractDeployment>;

    async fn block_number(&self) -> eyre::Result<BlockNumber>;
}

pub struct Sequencer<P, B> {
    predictor: P,
    backend: B,
}

impl<P, B> Sequencer<P, B>
where
    P: AddressPredictor,
    B: DeploymentBackend,
{
    pub fn new(predictor: P, backend: B) -> Self {
        Self { predictor, backend }
    }

    #[instrument(name = "sequencer", skip_all, fields(topology = %plan.topology))]
    pub async fn run(
        &self,
        plan: &DeploymentPlan,
        config: &DeployConfig,
    ) -> eyre::Result<Report> {
        ensure!(!plan.is_empty(), "Nothing to deploy");

        let deployer = self.backend.deployer_address().await?;
        let start_nonce = self
            .backend
            .transaction_count(deployer)
            .await
            .wrap_err("Reading deployer nonce")?;

        info!(state = "init", ?deployer, start_nonce);

        let predicted =
            predict_addresses(&self.predictor, deployer, start_nonce, plan.len());

        ensure!(
            predicted.len() == plan.len(),
            "Predicted {} addresses for {} contracts",
            predicted.len(),
            plan.len()
        );

        info!(state = "predicted", ?predicted);

        let mut contracts: Vec<DeployedContract> = Vec::with_capacity(plan.len());

        for (position, planned) in plan.deployments.iter().enumerate() {
            let nonce = start_nonce + position as u64;
            let predicted_address = predicted[position];

            let args = plan.resolve_args(position, &predicted, &contracts)?;

            info!(
                state = "deploying",
                position,
                contract = %planned.kind,
                nonce,
                ?predicted_address
            );

            let deployment = self
                .backend
                .deploy(planned.kind, &args, nonce)
                .await
                .wrap_err_with(|| format!("Deploying {}", planned.kind))?;

            if deployment.address != predicted_address {
                bail!(
                    "{} was deployed at {:?} but {:?} was predicted, \
                     the deployer nonce moved during the deployment",
                    planned.kind,
                    deployment.address,
                    predicted_address
                );
            }

            contracts.push(DeployedContract {
                role: planned.role,
                kind: planned.kind,
                nonce,
                predicted_address,
                deployment,
            });
        }

        let block_number = self
            .backend
            .block_number()
            .await
            .wrap_err("Reading block number")?;

        info!(state = "done", %block_number);

        Ok(Report {
            topology: plan.topology,
            config: config.clone(),
            deployer,
            start_nonce,
            block_number,
            contracts,
        })
    }
}
