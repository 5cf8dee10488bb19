use std::path::PathBuf;

use ethers::providers::Middleware;
use ethers::types::Address;
use reqwest::Url;
use tracing::instrument;

use super::plan::{ConstructorValue, ContractKind};
use super::sequencer::DeploymentBackend;
use crate::cli::PrivateKey;
use crate::common_keys::RpcSigner;
use crate::forge_utils::{ContractSpec, ForgeCreate};
use crate::report::ContractDeployment;
use crate::types::BlockNumber;

#[derive(Debug)]
pub struct DeploymentContext {
    pub contracts_dir: PathBuf,
    pub private_key: PrivateKey,
    pub rpc_url: Url,
    pub rpc_signer: RpcSigner,
    pub etherscan_api_key: Option<String>,
    pub verifier: Option<String>,
    pub verifier_url: Option<String>,
}

impl DeploymentContext {
    pub fn forge_create(
        &self,
        contract_spec: ContractSpec,
        nonce: u64,
    ) -> ForgeCreate {
        let mut forge_create = ForgeCreate::new(contract_spec)
            .with_cwd(&self.contracts_dir)
            .with_private_key(self.private_key.clone())
            .with_rpc_url(self.rpc_url.to_string())
            .with_override_nonce(nonce);

        if let Some(etherscan_api_key) = self.etherscan_api_key.as_ref() {
            forge_create = forge_create
                .with_verification_api_key(etherscan_api_key.clone());
        }

        if let Some(verifier) = self.verifier.as_ref() {
            forge_create = forge_create.with_verifier(verifier);
        }

        if let Some(verifier_url) = self.verifier_url.as_ref() {
            forge_create = forge_create.with_verifier_url(verifier_url);
        }

        forge_create
    }
}

impl DeploymentBackend for &DeploymentContext {
    async fn deployer_address(&self) -> eyre::Result<Address> {
        Ok(self.rpc_signer.0.address())
    }

    async fn transaction_count(&self, address: Address) -> eyre::Result<u64> {
        let nonce = self
            .rpc_signer
            .0
            .get_transaction_count(address, None)
            .await?;

        Ok(nonce.as_u64())
    }

    #[instrument(skip(self, args))]
    async fn deploy(
        &self,
        kind: ContractKind,
        args: &[ConstructorValue],
        nonce: u64,
    ) -> eyre::Result<ContractDeployment> {
        let forge_create = args.iter().fold(
            self.forge_create(kind.contract_spec(), nonce),
            |forge_create, arg| forge_create.with_constructor_arg(arg),
        );

        let output = forge_create.run().await?;

        Ok(output.into())
    }

    async fn block_number(&self) -> eyre::Result<BlockNumber> {
        let block_number = self.rpc_signer.0.get_block_number().await?;

        Ok(BlockNumber(block_number.as_u64()))
    }
}
