use std::path::{Path, PathBuf};

use ethers::types::{Address, H256};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::common::ContractSpec;
use crate::cli::PrivateKey;

#[derive(Debug)]
pub struct ForgeCreate {
    cwd: Option<PathBuf>,
    contract_spec: ContractSpec,
    private_key: Option<PrivateKey>,
    rpc_url: Option<String>,
    override_nonce: Option<u64>,
    constructor_args: Vec<String>,
    verification_args: ForgeCreateVerificationArgs,
}

#[derive(Debug, Default)]
pub struct ForgeCreateVerificationArgs {
    pub verification_api_key: Option<String>,
    pub verifier: Option<String>,
    pub verifier_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeOutput {
    pub deployer: Address,
    pub deployed_to: Address,
    pub transaction_hash: H256,
}

impl ForgeCreate {
    pub fn new(contract_spec: ContractSpec) -> Self {
        Self {
            cwd: None,
            contract_spec,
            override_nonce: None,
            private_key: None,
            rpc_url: None,
            constructor_args: vec![],
            verification_args: ForgeCreateVerificationArgs::default(),
        }
    }

    pub fn with_verification_api_key(
        mut self,
        verification_api_key: impl ToString,
    ) -> Self {
        self.verification_args.verification_api_key =
            Some(verification_api_key.to_string());
        self
    }

    pub fn with_verifier(mut self, verifier: impl ToString) -> Self {
        self.verification_args.verifier = Some(verifier.to_string());
        self
    }

    pub fn with_verifier_url(mut self, verifier_url: impl ToString) -> Self {
        self.verification_args.verifier_url = Some(verifier_url.to_string());
        self
    }

    pub fn with_cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_owned());
        self
    }

    pub fn with_override_nonce(mut self, override_nonce: u64) -> Self {
        self.override_nonce = Some(override_nonce);
        self
    }

    pub fn with_private_key(mut self, private_key: PrivateKey) -> Self {
        self.private_key = Some(private_key);
        self
    }

    pub fn with_rpc_url(mut self, rpc_url: String) -> Self {
        self.rpc_url = Some(rpc_url);
        self
    }

    pub fn with_constructor_arg(mut self, arg: impl ToString) -> Self {
        self.constructor_args.push(arg.to_string());
        self
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["create".to_string(), self.contract_spec.to_string()];

        if let Some(private_key) = &self.private_key {
            args.push("--private-key".to_string());
            args.push(format!("{private_key:#}"));
        }

        if let Some(rpc_url) = &self.rpc_url {
            args.push("--rpc-url".to_string());
            args.push(rpc_url.clone());
        }

        if let Some(nonce) = self.override_nonce {
            args.push("--nonce".to_string());
            args.push(nonce.to_string());
        }

        let mut should_verify = false;

        if let Some(verification_api_key) =
            &self.verification_args.verification_api_key
        {
            should_verify = true;

            args.push("--etherscan-api-key".to_string());
            args.push(verification_api_key.clone());
        }

        if let Some(verifier) = &self.verification_args.verifier {
            should_verify = true;

            args.push("--verifier".to_string());
            args.push(verifier.clone());
        }

        if let Some(verifier_url) = &self.verification_args.verifier_url {
            should_verify = true;

            args.push("--verifier-url".to_string());
            args.push(verifier_url.clone());
        }

        if should_verify {
            args.push("--verify".to_string());
        }

        args.push("--broadcast".to_string());
        args.push("--json".to_string());

        // Variadic in forge, so it goes last
        if !self.constructor_args.is_empty() {
            args.push("--constructor-args".to_string());
            args.extend(self.constructor_args.iter().cloned());
        }

        args
    }

    #[instrument(name = "forge_create", skip_all, fields(contract = %self.contract_spec))]
    pub async fn run(&self) -> eyre::Result<ForgeOutput> {
        let mut cmd = tokio::process::Command::new("forge");
        cmd.args(self.args());

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        info!(
            nonce = ?self.override_nonce,
            constructor_args = ?self.constructor_args,
            "Creating contract"
        );

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            eyre::bail!(
                "forge create {} failed: {}",
                self.contract_spec,
                stderr
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let s = strip_non_json(&stdout);

        let output: ForgeOutput = serde_json::from_str(s)?;

        info!("Created: {output:?}");

        Ok(output)
    }
}

fn strip_non_json(s: &str) -> &str {
    let s = match s.find('{') {
        Some(first_opening_brace) => &s[first_opening_brace..],
        None => s,
    };

    if let Some(last_closing_brace) = s.rfind('}') {
        &s[..=last_closing_brace]
    } else {
        s
    }
}
