//! Chain identifiers and per-chain platform deployments.

use crate::common::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric identifier of an EVM network.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
	pub const ETHEREUM: Self = Self(1);
	pub const OPTIMISM: Self = Self(10);
	pub const POLYGON: Self = Self(137);
	pub const BASE: Self = Self(8453);
	pub const ARBITRUM: Self = Self(42161);
	/// Local hardhat/anvil style development network.
	pub const LOCAL: Self = Self(1337);
}

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for ChainId {
	type Err = std::num::ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(ChainId(s.trim().parse()?))
	}
}

impl From<u64> for ChainId {
	fn from(id: u64) -> Self {
		ChainId(id)
	}
}

/// Addresses of one liquidity platform's contracts on one chain.
///
/// A deployment is usable only when `enabled` is set; a disabled deployment
/// must look exactly like an absent one to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDeployment {
	/// The platform's pool factory.
	pub factory_address: Address,
	/// The platform's position manager (NFT positions for concentrated liquidity).
	pub position_manager_address: Address,
	#[serde(default)]
	pub enabled: bool,
}
