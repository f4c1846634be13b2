//! Configuration types for the vault client.

use crate::serde_helpers::{deserialize_chain_id_map, serialize_chain_id_map};
use alloy::json_abi::JsonAbi;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;
use vault_types::{Address, ChainId, PlatformDeployment};

/// Complete client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VaultConfig {
	/// Client identity and data file locations.
	pub client: ClientSettings,
	/// Confirmation waiting policy.
	#[serde(default)]
	pub confirmation: ConfirmationSettings,
	/// Per-network configuration.
	#[serde(
		deserialize_with = "deserialize_chain_id_map",
		serialize_with = "serialize_chain_id_map"
	)]
	pub chains: HashMap<ChainId, ChainSettings>,
}

/// Client-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientSettings {
	/// Name used in log output.
	pub name: String,
	/// Default tracing filter directive.
	#[serde(default = "default_log_level")]
	pub log_level: String,
	/// Network assumed when a connection cannot report its own chain id.
	///
	/// Left unset in production configurations so that an unidentifiable
	/// connection is an error instead of a guess.
	#[serde(default)]
	pub default_network_id: Option<ChainId>,
	/// Path of the JSON contract artifact file.
	pub contracts_path: PathBuf,
}

fn default_log_level() -> String {
	"info".to_string()
}

/// How long and how often to poll for a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfirmationSettings {
	/// Maximum time to wait for confirmation, in seconds.
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
	/// Receipt polling interval, in milliseconds.
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	/// Blocks required, counting the inclusion block itself.
	#[serde(default = "default_confirmations")]
	pub confirmations: u64,
}

fn default_timeout_secs() -> u64 {
	120
}

fn default_poll_interval_ms() -> u64 {
	2_000
}

fn default_confirmations() -> u64 {
	1
}

impl Default for ConfirmationSettings {
	fn default() -> Self {
		Self {
			timeout_secs: default_timeout_secs(),
			poll_interval_ms: default_poll_interval_ms(),
			confirmations: default_confirmations(),
		}
	}
}

impl ConfirmationSettings {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}
}

/// Chain-specific configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainSettings {
	/// Human readable chain name.
	pub name: String,
	/// RPC endpoint URL.
	pub rpc_url: String,
	/// Automation executor allowed to act on vaults, if deployed.
	#[serde(default)]
	pub executor_address: Option<Address>,
	/// Liquidity platform deployments keyed by platform id.
	#[serde(default)]
	pub platforms: BTreeMap<String, PlatformDeployment>,
}

/// One entry of the contract artifact file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContractArtifact {
	/// JSON ABI of the contract.
	pub abi: JsonAbi,
	/// Deployed address per network.
	#[serde(
		default,
		deserialize_with = "deserialize_chain_id_map",
		serialize_with = "serialize_chain_id_map"
	)]
	pub addresses: HashMap<ChainId, Address>,
}

/// Contract artifacts keyed by logical contract name.
pub type ContractArtifacts = BTreeMap<String, ContractArtifact>;
