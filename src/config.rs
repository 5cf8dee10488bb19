use ethers::types::U256;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cli::Args;
use crate::types::{BlocksPerEpoch, HashRate, LifetimeMonths};

pub const DEFAULT_BLOCKS_PER_EPOCH: u64 = 1_000_000_000;
pub const DEFAULT_LIFETIME_MONTH: u64 = 3;
pub const DEFAULT_INIT_HASH_RATE: u64 = 1000;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Topology {
    WithMarket,
    NoMarket,
}

impl Topology {
    pub fn from_enable_market(enable_market: bool) -> Self {
        if enable_market {
            Self::WithMarket
        } else {
            Self::NoMarket
        }
    }
}

/// Tunables for a single run, built once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    pub enable_market: bool,
    pub blocks_per_epoch: BlocksPerEpoch,
    pub lifetime_month: LifetimeMonths,
    pub init_hash_rate: HashRate,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            enable_market: false,
            blocks_per_epoch: BlocksPerEpoch(U256::from(DEFAULT_BLOCKS_PER_EPOCH)),
            lifetime_month: LifetimeMonths(U256::from(DEFAULT_LIFETIME_MONTH)),
            init_hash_rate: HashRate(U256::from(DEFAULT_INIT_HASH_RATE)),
        }
    }
}

impl DeployConfig {
    pub fn from_args(args: &Args) -> eyre::Result<Self> {
        Ok(Self {
            enable_market: parse_flag(&args.enable_market),
            blocks_per_epoch: BlocksPerEpoch(parse_int_or(
                "BLOCKS_PER_EPOCH",
                &args.blocks_per_epoch,
                DEFAULT_BLOCKS_PER_EPOCH,
            )?),
            lifetime_month: LifetimeMonths(parse_int_or(
                "LIFETIME_MONTH",
                &args.lifetime_month,
                DEFAULT_LIFETIME_MONTH,
            )?),
            init_hash_rate: HashRate(parse_int_or(
                "INIT_HASH_RATE",
                &args.init_hash_rate,
                DEFAULT_INIT_HASH_RATE,
            )?),
        })
    }

    pub fn topology(&self) -> Topology {
        Topology::from_enable_market(self.enable_market)
    }
}

/// Case-insensitive match against `true`, no surrounding whitespace allowed
pub fn parse_flag(s: &str) -> bool {
    s.eq_ignore_ascii_case("true")
}

/// Reads the leading decimal digits of `s`, ignoring anything after them.
///
/// Returns `Ok(None)` when there are no leading digits and an error when
/// the digits do not fit in a uint256 constructor argument.
pub fn parse_int_prefix(s: &str) -> eyre::Result<Option<U256>> {
    let s = s.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);

    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());

    let digits = &s[..end];
    if digits.is_empty() {
        return Ok(None);
    }

    let value = U256::from_dec_str(digits)
        .map_err(|err| eyre::eyre!("{digits} does not fit in uint256: {err}"))?;

    Ok(Some(value))
}

fn parse_int_or(name: &str, s: &str, default: u64) -> eyre::Result<U256> {
    let value = parse_int_prefix(s).wrap_err_with(|| format!("Invalid {name}"))?;

    Ok(value.unwrap_or_else(|| {
        warn!("{name} = {s:?} has no leading digits, using {default}");
        U256::from(default)
    }))
}
