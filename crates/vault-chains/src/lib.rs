//! Chain registry for the vault client.
//!
//! Maps network identifiers to their RPC endpoint, executor address and the
//! liquidity platforms deployed on them. The registry is filled once from
//! static configuration and is read-only afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use tracing::info;
use vault_config::VaultConfig;
use vault_types::{Address, ChainId, PlatformDeployment};

/// Errors raised by the chain registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
	/// A chain with the same id was already loaded.
	#[error("Chain {0} already registered")]
	DuplicateChain(ChainId),
	/// The chain is not present in the registry.
	#[error("Chain {0} is not supported")]
	UnsupportedChain(ChainId),
}

/// Static configuration of one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
	pub network_id: ChainId,
	pub display_name: String,
	pub rpc_url: String,
	pub executor_address: Option<Address>,
	/// Every configured deployment, enabled or not.
	pub platform_addresses: BTreeMap<String, PlatformDeployment>,
}

/// Read-only lookup of chain configurations keyed by network id.
#[derive(Clone, Default)]
pub struct ChainRegistry {
	chains: BTreeMap<ChainId, ChainConfig>,
}

impl ChainRegistry {
	/// Creates a new empty registry.
	pub fn new() -> Self {
		Self {
			chains: BTreeMap::new(),
		}
	}

	/// Builds the registry from the `[chains]` section of the configuration.
	pub fn from_config(config: &VaultConfig) -> Result<Self, ChainError> {
		let mut registry = Self::new();

		for (chain_id, settings) in &config.chains {
			registry.register(ChainConfig {
				network_id: *chain_id,
				display_name: settings.name.clone(),
				rpc_url: settings.rpc_url.clone(),
				executor_address: settings.executor_address,
				platform_addresses: settings.platforms.clone(),
			})?;
		}

		Ok(registry)
	}

	/// Adds a chain.
	///
	/// Network ids are immutable once loaded, so registering the same id
	/// twice is an error rather than an overwrite.
	pub fn register(&mut self, config: ChainConfig) -> Result<(), ChainError> {
		let chain_id = config.network_id;
		if self.chains.contains_key(&chain_id) {
			return Err(ChainError::DuplicateChain(chain_id));
		}

		info!(
			"Registering chain {} ({}) with {} platform deployment(s)",
			chain_id,
			config.display_name,
			config.platform_addresses.len()
		);
		self.chains.insert(chain_id, config);
		Ok(())
	}

	/// Returns the configuration of a chain, if supported.
	pub fn get_chain_config(&self, chain_id: ChainId) -> Option<&ChainConfig> {
		self.chains.get(&chain_id)
	}

	/// Like [`get_chain_config`](Self::get_chain_config) but returns an error
	/// for unsupported chains.
	pub fn get_required(&self, chain_id: ChainId) -> Result<&ChainConfig, ChainError> {
		self.get_chain_config(chain_id)
			.ok_or(ChainError::UnsupportedChain(chain_id))
	}

	pub fn is_supported(&self, chain_id: ChainId) -> bool {
		self.chains.contains_key(&chain_id)
	}

	pub fn supported_chain_ids(&self) -> BTreeSet<ChainId> {
		self.chains.keys().copied().collect()
	}

	/// Display name of a chain, or `"Unknown Chain"`.
	pub fn chain_name(&self, chain_id: ChainId) -> &str {
		self.chains
			.get(&chain_id)
			.map(|chain| chain.display_name.as_str())
			.unwrap_or("Unknown Chain")
	}

	pub fn rpc_url(&self, chain_id: ChainId) -> Option<&str> {
		self.chains.get(&chain_id).map(|chain| chain.rpc_url.as_str())
	}

	pub fn executor_address(&self, chain_id: ChainId) -> Option<Address> {
		self.chains
			.get(&chain_id)
			.and_then(|chain| chain.executor_address)
	}

	/// Returns a platform deployment only when it exists and is enabled.
	///
	/// Disabled deployments are reported exactly like missing ones.
	pub fn platform_deployment(
		&self,
		chain_id: ChainId,
		platform_id: &str,
	) -> Option<&PlatformDeployment> {
		self.chains
			.get(&chain_id)?
			.platform_addresses
			.get(platform_id)
			.filter(|deployment| deployment.enabled)
	}

	/// Ids of the platforms enabled on a chain, in lexical order.
	pub fn chain_platform_ids(&self, chain_id: ChainId) -> Vec<String> {
		self.chains
			.get(&chain_id)
			.map(|chain| {
				chain
					.platform_addresses
					.iter()
					.filter(|(_, deployment)| deployment.enabled)
					.map(|(id, _)| id.clone())
					.collect()
			})
			.unwrap_or_default()
	}
}

impl fmt::Debug for ChainRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ChainRegistry")
			.field("chains", &self.chains.keys().collect::<Vec<_>>())
			.finish()
	}
}
