use std::path::Path;

use ethers::types::Address;
use ethers::utils::to_checksum;
use eyre::{ContextCompat, WrapErr};
use serde::{Deserialize, Serialize};

use crate::config::{DeployConfig, Topology};
use crate::deployment::plan::{ContractKind, ContractRole};
use crate::serde_utils;
use crate::types::BlockNumber;
use crate::utils::create_parent_dir;

pub mod contract_deployment;

pub use self::contract_deployment::ContractDeployment;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployedContract {
    pub role: ContractRole,
    pub kind: ContractKind,
    pub nonce: u64,
    pub predicted_address: Address,
    #[serde(flatten)]
    pub deployment: ContractDeployment,
}

/// Everything a finished run produced
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Report {
    pub topology: Topology,
    pub config: DeployConfig,
    pub deployer: Address,
    pub start_nonce: u64,
    pub block_number: BlockNumber,
    pub contracts: Vec<DeployedContract>,
}

impl Report {
    pub fn address_of(&self, role: ContractRole) -> Option<Address> {
        self.contracts
            .iter()
            .find(|contract| contract.role == role)
            .map(|contract| contract.deployment.address)
    }

    pub async fn write(&self, path: impl AsRef<Path>) -> eyre::Result<()> {
        let path = path.as_ref();

        create_parent_dir(path).await?;
        serde_utils::write_serialize(path, self).await
    }
}

/// The addresses other tooling picks up after a deployment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractAddressSet {
    pub flow: Address,
    pub pora_mine: Address,
    pub market: Option<Address>,
    pub reward: Option<Address>,
    pub block_number: BlockNumber,
    pub account: Address,
}

impl ContractAddressSet {
    pub fn from_report(report: &Report) -> eyre::Result<Self> {
        Ok(Self {
            flow: report
                .address_of(ContractRole::Flow)
                .context("Flow contract missing from report")?,
            pora_mine: report
                .address_of(ContractRole::Mine)
                .context("Mine contract missing from report")?,
            market: report.address_of(ContractRole::Market),
            reward: report.address_of(ContractRole::Reward),
            block_number: report.block_number,
            account: report.deployer,
        })
    }

    /// One `name = 'value'` pair per line
    pub fn render(&self) -> String {
        let address_line = |name: &str, address: &Address| {
            format!("{name} = '{}'", to_checksum(address, None))
        };

        let mut lines = vec![
            address_line("flow", &self.flow),
            address_line("PoraMine", &self.pora_mine),
        ];

        if let Some(market) = &self.market {
            lines.push(address_line("market", market));
        }

        if let Some(reward) = &self.reward {
            lines.push(address_line("reward", reward));
        }

        lines.push(format!("blockNumber = {}", self.block_number));
        lines.push(address_line("account", &self.account));

        lines.join("\n")
    }

    /// Overwrites `path`, creating its parent directory if needed
    pub async fn write(&self, path: impl AsRef<Path>) -> eyre::Result<()> {
        let path = path.as_ref();

        create_parent_dir(path).await?;

        tokio::fs::write(path, self.render())
            .await
            .wrap_err_with(|| format!("Writing to {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ethers::types::{H160, H256};
    use hex_literal::hex;
    use indoc::indoc;

    use super::*;

    const ACCOUNT: Address =
        H160(hex!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"));

    fn contract(
        role: ContractRole,
        kind: ContractKind,
        nonce: u64,
        address: [u8; 20],
    ) -> DeployedContract {
        DeployedContract {
            role,
            kind,
            nonce,
            predicted_address: Address::from(address),
            deployment: ContractDeployment {
                address: Address::from(address),
                transaction_hash: H256::zero(),
            },
        }
    }

    fn no_market_report() -> Report {
        Report {
            topology: Topology::NoMarket,
            config: DeployConfig::default(),
            deployer: ACCOUNT,
            start_nonce: 0,
            block_number: BlockNumber(3),
            contracts: vec![
                contract(
                    ContractRole::AddressBook,
                    ContractKind::AddressBook,
                    0,
                    hex!("5fbdb2315678afecb367f032d93f642f64180aa3"),
                ),
                contract(
                    ContractRole::Flow,
                    ContractKind::Flow,
                    1,
                    hex!("e7f1725e7734ce288f8367e1bb143e90bb3f0512"),
                ),
                contract(
                    ContractRole::Mine,
                    ContractKind::PoraMineTest,
                    2,
                    hex!("9fe46736679d2d9a65f0992f2272de9f3c7fa6e0"),
                ),
            ],
        }
    }

    #[test]
    fn renders_no_market_addresses() {
        let addresses =
            ContractAddressSet::from_report(&no_market_report()).unwrap();

        assert_eq!(
            addresses.render(),
            indoc! {"
                flow = '0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512'
                PoraMine = '0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0'
                blockNumber = 3
                account = '0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266'"
            }
        );
    }

    #[test]
    fn renders_market_and_reward_when_present() {
        let addresses = ContractAddressSet {
            flow: Address::from_low_u64_be(1),
            pora_mine: Address::from_low_u64_be(2),
            market: Some(Address::from_low_u64_be(3)),
            reward: Some(Address::from_low_u64_be(4)),
            block_number: BlockNumber(10),
            account: ACCOUNT,
        };

        let keys: Vec<_> = addresses
            .render()
            .lines()
            .map(|line| line.split(" = ").next().unwrap().to_string())
            .collect();

        assert_eq!(
            keys,
            vec!["flow", "PoraMine", "market", "reward", "blockNumber", "account"]
        );
    }

    #[test]
    fn render_has_no_trailing_newline() {
        let addresses =
            ContractAddressSet::from_report(&no_market_report()).unwrap();
        let rendered = addresses.render();

        assert!(rendered.ends_with("account = '0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266'"));
        assert_eq!(rendered.lines().count(), 4);
    }

    #[test]
    fn missing_flow_is_an_error() {
        let mut report = no_market_report();
        report.contracts.retain(|c| c.role != ContractRole::Flow);

        assert!(ContractAddressSet::from_report(&report).is_err());
    }

    #[tokio::test]
    async fn write_creates_dir_and_overwrites() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("deploy").join("localtest.py");

        let first = ContractAddressSet::from_report(&no_market_report())?;
        first.write(&path).await?;

        let second = ContractAddressSet {
            market: Some(Address::from_low_u64_be(3)),
            reward: Some(Address::from_low_u64_be(4)),
            block_number: BlockNumber(99),
            ..first.clone()
        };
        second.write(&path).await?;

        let content = tokio::fs::read_to_string(&path).await?;

        assert_eq!(content, second.render());
        assert_eq!(content.matches("flow = ").count(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn yaml_report_round_trips_addresses() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("report.yml");

        let report = no_market_report();
        report.write(&path).await?;

        let content = tokio::fs::read_to_string(&path).await?;
        let parsed: Report = serde_yaml::from_str(&content)?;

        assert_eq!(parsed.contracts, report.contracts);
        assert_eq!(parsed.topology, Topology::NoMarket);

        Ok(())
    }
}
