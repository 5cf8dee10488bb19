use std::fmt;

use ethers::types::{Address, U256};
use eyre::ContextCompat;
use serde::{Deserialize, Serialize};

use crate::config::{DeployConfig, Topology};
use crate::forge_utils::ContractSpec;
use crate::report::DeployedContract;

/// Mine difficulty adjustment ratio handed to `PoraMine`
pub const MINE_ADJUST_RATIO: u64 = 20;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
pub enum ContractKind {
    AddressBook,
    PoraMine,
    PoraMineTest,
    FixedPrice,
    OnePoolReward,
    FixedPriceFlow,
    Flow,
}

impl ContractKind {
    pub fn contract_spec(&self) -> ContractSpec {
        ContractSpec::name(self)
    }
}

/// The part a contract plays in the system, independent of which
/// implementation the topology picks for it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContractRole {
    AddressBook,
    Flow,
    Mine,
    Market,
    Reward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorArg {
    /// Address the role's contract will be created at
    Predicted(ContractRole),
    /// Confirmed address of a role deployed earlier in the plan
    Deployed(ContractRole),
    Address(Address),
    Uint(U256),
}

impl ConstructorArg {
    pub fn uint(value: u64) -> Self {
        Self::Uint(U256::from(value))
    }

    pub fn zero_address() -> Self {
        Self::Address(Address::zero())
    }
}

/// A constructor argument with every reference resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstructorValue {
    Address(Address),
    Uint(U256),
}

impl fmt::Display for ConstructorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(address) => write!(f, "{address:?}"),
            Self::Uint(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDeployment {
    pub role: ContractRole,
    pub kind: ContractKind,
    pub args: Vec<ConstructorArg>,
}

impl PlannedDeployment {
    fn new(
        role: ContractRole,
        kind: ContractKind,
        args: Vec<ConstructorArg>,
    ) -> Self {
        Self { role, kind, args }
    }
}

/// Ordered deployments for one topology. Position `i` is created with
/// nonce `start_nonce + i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    pub topology: Topology,
    pub deployments: Vec<PlannedDeployment>,
}

impl DeploymentPlan {
    pub fn for_topology(topology: Topology, config: &DeployConfig) -> Self {
        let blocks_per_epoch = ConstructorArg::Uint(config.blocks_per_epoch.0);
        let lifetime_month = ConstructorArg::Uint(config.lifetime_month.0);

        let deployments = match topology {
            Topology::WithMarket => vec![
                PlannedDeployment::new(
                    ContractRole::AddressBook,
                    ContractKind::AddressBook,
                    vec![
                        ConstructorArg::Predicted(ContractRole::Flow),
                        ConstructorArg::Predicted(ContractRole::Market),
                        ConstructorArg::Predicted(ContractRole::Reward),
                        ConstructorArg::Predicted(ContractRole::Mine),
                    ],
                ),
                PlannedDeployment::new(
                    ContractRole::Mine,
                    ContractKind::PoraMine,
                    vec![
                        ConstructorArg::Deployed(ContractRole::AddressBook),
                        ConstructorArg::Uint(config.init_hash_rate.0),
                        ConstructorArg::uint(MINE_ADJUST_RATIO),
                        ConstructorArg::uint(0),
                    ],
                ),
                PlannedDeployment::new(
                    ContractRole::Market,
                    ContractKind::FixedPrice,
                    vec![
                        ConstructorArg::Deployed(ContractRole::AddressBook),
                        lifetime_month.clone(),
                    ],
                ),
                PlannedDeployment::new(
                    ContractRole::Reward,
                    ContractKind::OnePoolReward,
                    vec![
                        ConstructorArg::Deployed(ContractRole::AddressBook),
                        lifetime_month,
                    ],
                ),
                PlannedDeployment::new(
                    ContractRole::Flow,
                    ContractKind::FixedPriceFlow,
                    vec![
                        ConstructorArg::Deployed(ContractRole::AddressBook),
                        blocks_per_epoch,
                        ConstructorArg::uint(0),
                    ],
                ),
            ],
            Topology::NoMarket => vec![
                PlannedDeployment::new(
                    ContractRole::AddressBook,
                    ContractKind::AddressBook,
                    vec![
                        ConstructorArg::Predicted(ContractRole::Flow),
                        ConstructorArg::zero_address(),
                        ConstructorArg::zero_address(),
                        ConstructorArg::Predicted(ContractRole::Mine),
                    ],
                ),
                PlannedDeployment::new(
                    ContractRole::Flow,
                    ContractKind::Flow,
                    vec![
                        ConstructorArg::Deployed(ContractRole::AddressBook),
                        blocks_per_epoch,
                        ConstructorArg::uint(0),
                    ],
                ),
                PlannedDeployment::new(
                    ContractRole::Mine,
                    ContractKind::PoraMineTest,
                    vec![
                        ConstructorArg::Deployed(ContractRole::AddressBook),
                        ConstructorArg::uint(0),
                    ],
                ),
            ],
        };

        Self {
            topology,
            deployments,
        }
    }

    pub fn len(&self) -> usize {
        self.deployments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty()
    }

    pub fn position_of(&self, role: ContractRole) -> Option<usize> {
        self.deployments.iter().position(|d| d.role == role)
    }

    /// Resolves the constructor arguments of the deployment at `position`.
    ///
    /// `predicted` holds one address per plan position, `deployed` the
    /// contracts confirmed so far.
    pub fn resolve_args(
        &self,
        position: usize,
        predicted: &[Address],
        deployed: &[DeployedContract],
    ) -> eyre::Result<Vec<ConstructorValue>> {
        let deployment = self
            .deployments
            .get(position)
            .with_context(|| format!("No deployment at position {position}"))?;

        deployment
            .args
            .iter()
            .map(|arg| -> eyre::Result<ConstructorValue> {
                let value = match arg {
                    ConstructorArg::Predicted(role) => {
                        let role_position =
                            self.position_of(*role).with_context(|| {
                                format!(
                                    "{role} is not deployed in the {} topology",
                                    self.topology
                                )
                            })?;

                        let address = predicted
                            .get(role_position)
                            .with_context(|| {
                                format!("Missing predicted address for {role}")
                            })?;

                        ConstructorValue::Address(*address)
                    }
                    ConstructorArg::Deployed(role) => {
                        let contract = deployed
                            .iter()
                            .find(|contract| contract.role == *role)
                            .with_context(|| {
                                format!(
                                    "{} needs {role} which is not deployed yet",
                                    deployment.kind
                                )
                            })?;

                        ConstructorValue::Address(contract.deployment.address)
                    }
                    ConstructorArg::Address(address) => {
                        ConstructorValue::Address(*address)
                    }
                    ConstructorArg::Uint(value) => ConstructorValue::Uint(*value),
                };

                Ok(value)
            })
            .collect()
    }
}
