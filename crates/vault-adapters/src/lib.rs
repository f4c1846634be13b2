//! Liquidity platform adapters.
//!
//! Each supported platform (Uniswap V3, ...) gets an adapter that knows
//! where the platform is deployed on a network and what it supports.
//! Adapters are built on demand by constructors held in an explicit
//! [`AdapterRegistry`]; the registry starts with the built-in platforms and
//! accepts new ones at runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};
use vault_chains::ChainRegistry;
use vault_contracts::Connection;
use vault_types::{ChainId, PlatformDeployment};

/// Re-export implementations
pub mod implementations {
	pub mod uniswap_v3;
}

pub use implementations::uniswap_v3::UniswapV3Adapter;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
	/// The platform is not deployed, or not enabled, on the network.
	#[error("Platform {platform_id} is not available on network {chain_id}")]
	PlatformUnavailable {
		platform_id: String,
		chain_id: ChainId,
	},

	/// The adapter was created without a network to work on.
	#[error("Adapter for {0} is not scoped to a network")]
	NoNetwork(String),

	#[error("Invalid adapter registration: {0}")]
	InvalidRegistration(String),
}

/// Everything an adapter is built from.
#[derive(Clone)]
pub struct AdapterContext {
	pub chains: Arc<ChainRegistry>,
	pub connection: Connection,
	/// Network the adapter is scoped to, when the caller knows it.
	pub chain_id: Option<ChainId>,
}

/// Trait defining a liquidity platform adapter.
pub trait AdapterInterface: Send + Sync {
	fn platform_id(&self) -> &str;

	/// Human readable platform name.
	fn platform_name(&self) -> &str;

	/// Network this adapter was scoped to, if any.
	fn chain_id(&self) -> Option<ChainId>;

	/// Pool fee tiers supported by the platform, in hundredths of a basis point.
	fn fee_tiers(&self) -> &[u32];

	/// Looks up the platform's contracts on a network.
	fn deployment_on(&self, chain_id: ChainId) -> Result<PlatformDeployment, AdapterError>;

	/// Looks up the platform's contracts on the adapter's own network.
	fn deployment(&self) -> Result<PlatformDeployment, AdapterError> {
		let chain_id = self
			.chain_id()
			.ok_or_else(|| AdapterError::NoNetwork(self.platform_id().to_string()))?;
		self.deployment_on(chain_id)
	}
}

/// Shared deployment lookup through the chain registry.
pub fn lookup_deployment(
	chains: &ChainRegistry,
	platform_id: &str,
	chain_id: ChainId,
) -> Result<PlatformDeployment, AdapterError> {
	chains
		.platform_deployment(chain_id, platform_id)
		.cloned()
		.ok_or_else(|| AdapterError::PlatformUnavailable {
			platform_id: platform_id.to_string(),
			chain_id,
		})
}

/// Builds an adapter for a connection.
pub type AdapterConstructor = Arc<dyn Fn(AdapterContext) -> Box<dyn AdapterInterface> + Send + Sync>;

/// Registry of platform adapter constructors.
pub struct AdapterRegistry {
	chains: Arc<ChainRegistry>,
	constructors: BTreeMap<String, AdapterConstructor>,
}

impl AdapterRegistry {
	/// Creates a registry with no platforms.
	pub fn new(chains: Arc<ChainRegistry>) -> Self {
		Self {
			chains,
			constructors: BTreeMap::new(),
		}
	}

	/// Creates a registry preloaded with the built-in platforms.
	pub fn with_builtin(chains: Arc<ChainRegistry>) -> Self {
		let mut registry = Self::new(chains);
		registry.constructors.insert(
			UniswapV3Adapter::PLATFORM_ID.to_string(),
			Arc::new(|context| Box::new(UniswapV3Adapter::new(context)) as Box<dyn AdapterInterface>),
		);
		registry
	}

	pub fn chains(&self) -> &Arc<ChainRegistry> {
		&self.chains
	}

	/// Registers a constructor for a platform. A later registration for the
	/// same id replaces the earlier one.
	pub fn register<F>(&mut self, platform_id: &str, constructor: F) -> Result<(), AdapterError>
	where
		F: Fn(AdapterContext) -> Box<dyn AdapterInterface> + Send + Sync + 'static,
	{
		if platform_id.trim().is_empty() {
			return Err(AdapterError::InvalidRegistration(
				"platform id is required".to_string(),
			));
		}

		if self
			.constructors
			.insert(platform_id.to_string(), Arc::new(constructor))
			.is_some()
		{
			info!(platform_id, "Replaced adapter registration");
		} else {
			info!(platform_id, "Registered adapter");
		}
		Ok(())
	}

	/// Builds the adapter for a platform scoped to `chain_id`, or `None` when
	/// nothing is registered.
	pub fn get(
		&self,
		platform_id: &str,
		chain_id: Option<ChainId>,
		connection: &Connection,
	) -> Option<Box<dyn AdapterInterface>> {
		let Some(constructor) = self.constructors.get(platform_id) else {
			error!(platform_id, "No adapter available for platform");
			return None;
		};
		Some(self.build(constructor, connection, chain_id))
	}

	/// Builds one adapter for every platform that is both registered and
	/// enabled on the network. Unknown networks yield nothing.
	pub fn get_all_for_chain(
		&self,
		chain_id: ChainId,
		connection: &Connection,
	) -> Vec<Box<dyn AdapterInterface>> {
		self.chains
			.chain_platform_ids(chain_id)
			.iter()
			.filter_map(|platform_id| match self.constructors.get(platform_id) {
				Some(constructor) => Some(self.build(constructor, connection, Some(chain_id))),
				None => {
					debug!(platform_id = %platform_id, chain_id = %chain_id, "Enabled platform has no adapter");
					None
				}
			})
			.collect()
	}

	/// Registered platform ids, in lexical order.
	pub fn supported_platform_ids(&self) -> Vec<String> {
		self.constructors.keys().cloned().collect()
	}

	pub fn has_adapter(&self, platform_id: &str) -> bool {
		self.constructors.contains_key(platform_id)
	}

	fn build(
		&self,
		constructor: &AdapterConstructor,
		connection: &Connection,
		chain_id: Option<ChainId>,
	) -> Box<dyn AdapterInterface> {
		constructor(AdapterContext {
			chains: self.chains.clone(),
			connection: connection.clone(),
			chain_id,
		})
	}
}

impl fmt::Debug for AdapterRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AdapterRegistry")
			.field("platforms", &self.constructors.keys().collect::<Vec<_>>())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use vault_chains::ChainConfig;
	use vault_provider::{LogFilter, ProviderError, ProviderInterface};
	use vault_types::{
		Address, BlockNumber, Bytes, Log, TransactionHash, TransactionReceipt,
	};

	struct NullProvider;

	#[async_trait]
	impl ProviderInterface for NullProvider {
		async fn chain_id(&self) -> Result<ChainId, ProviderError> {
			Ok(ChainId::ETHEREUM)
		}
		async fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, ProviderError> {
			Ok(Bytes::new())
		}
		async fn get_logs(&self, _filter: &LogFilter) -> Result<Vec<Log>, ProviderError> {
			Ok(Vec::new())
		}
		async fn get_transaction_receipt(
			&self,
			_hash: TransactionHash,
		) -> Result<Option<TransactionReceipt>, ProviderError> {
			Ok(None)
		}
		async fn get_block_number(&self) -> Result<BlockNumber, ProviderError> {
			Ok(0)
		}
	}

	struct CustomAdapter {
		name: &'static str,
		chain_id: Option<ChainId>,
	}

	impl AdapterInterface for CustomAdapter {
		fn platform_id(&self) -> &str {
			"custom"
		}
		fn platform_name(&self) -> &str {
			self.name
		}
		fn chain_id(&self) -> Option<ChainId> {
			self.chain_id
		}
		fn fee_tiers(&self) -> &[u32] {
			&[]
		}
		fn deployment_on(&self, chain_id: ChainId) -> Result<PlatformDeployment, AdapterError> {
			Err(AdapterError::PlatformUnavailable {
				platform_id: "custom".to_string(),
				chain_id,
			})
		}
	}

	fn deployment(enabled: bool) -> PlatformDeployment {
		PlatformDeployment {
			factory_address: Address::repeat_byte(0x1f),
			position_manager_address: Address::repeat_byte(0xc3),
			enabled,
		}
	}

	fn chains() -> Arc<ChainRegistry> {
		let mut registry = ChainRegistry::new();
		registry
			.register(ChainConfig {
				network_id: ChainId::ETHEREUM,
				display_name: "Ethereum".to_string(),
				rpc_url: "https://eth.example.com".to_string(),
				executor_address: None,
				platform_addresses: [
					("uniswapV3".to_string(), deployment(true)),
					("sushiswap".to_string(), deployment(true)),
				]
				.into_iter()
				.collect(),
			})
			.unwrap();
		registry
			.register(ChainConfig {
				network_id: ChainId::ARBITRUM,
				display_name: "Arbitrum One".to_string(),
				rpc_url: "https://arb.example.com".to_string(),
				executor_address: None,
				platform_addresses: [("uniswapV3".to_string(), deployment(false))]
					.into_iter()
					.collect(),
			})
			.unwrap();
		Arc::new(registry)
	}

	fn connection() -> Connection {
		Connection::Provider(Arc::new(NullProvider))
	}

	#[test]
	fn test_builtin_adapters_for_chain() {
		let registry = AdapterRegistry::with_builtin(chains());

		let adapters = registry.get_all_for_chain(ChainId::ETHEREUM, &connection());

		assert_eq!(adapters.len(), 1);
		assert_eq!(adapters[0].platform_id(), "uniswapV3");
		assert_eq!(adapters[0].chain_id(), Some(ChainId::ETHEREUM));
		assert_eq!(
			adapters[0].deployment().unwrap().factory_address,
			Address::repeat_byte(0x1f)
		);
	}

	#[test]
	fn test_unknown_chain_yields_no_adapters() {
		let registry = AdapterRegistry::with_builtin(chains());
		assert!(registry.get_all_for_chain(ChainId(999), &connection()).is_empty());
	}

	#[test]
	fn test_disabled_platform_is_skipped() {
		let registry = AdapterRegistry::with_builtin(chains());
		assert!(registry
			.get_all_for_chain(ChainId::ARBITRUM, &connection())
			.is_empty());
	}

	#[test]
	fn test_get_unregistered_platform() {
		let registry = AdapterRegistry::with_builtin(chains());
		assert!(registry.get("sushiswap", None, &connection()).is_none());
		assert!(!registry.has_adapter("sushiswap"));
	}

	#[test]
	fn test_get_builtin_without_network() {
		let registry = AdapterRegistry::with_builtin(chains());
		let adapter = registry.get("uniswapV3", None, &connection()).unwrap();

		assert_eq!(adapter.platform_name(), "Uniswap V3");
		assert_eq!(adapter.chain_id(), None);
		assert_eq!(
			adapter.deployment(),
			Err(AdapterError::NoNetwork("uniswapV3".to_string()))
		);
		assert!(adapter.deployment_on(ChainId::ETHEREUM).is_ok());
		assert_eq!(
			adapter.deployment_on(ChainId::ARBITRUM),
			Err(AdapterError::PlatformUnavailable {
				platform_id: "uniswapV3".to_string(),
				chain_id: ChainId::ARBITRUM,
			})
		);
	}

	#[test]
	fn test_get_scoped_to_network() {
		let registry = AdapterRegistry::with_builtin(chains());
		let adapter = registry
			.get("uniswapV3", Some(ChainId::ETHEREUM), &connection())
			.unwrap();

		assert_eq!(adapter.chain_id(), Some(ChainId::ETHEREUM));
		assert_eq!(adapter.deployment(), Ok(deployment(true)));

		let disabled = registry
			.get("uniswapV3", Some(ChainId::ARBITRUM), &connection())
			.unwrap();
		assert!(matches!(
			disabled.deployment(),
			Err(AdapterError::PlatformUnavailable { chain_id: ChainId::ARBITRUM, .. })
		));
	}

	#[test]
	fn test_registration_extends_chain_lookup() {
		let mut registry = AdapterRegistry::with_builtin(chains());
		registry
			.register("sushiswap", |context| {
				Box::new(CustomAdapter {
					name: "Sushi",
					chain_id: context.chain_id,
				})
			})
			.unwrap();

		let adapters = registry.get_all_for_chain(ChainId::ETHEREUM, &connection());
		let names: Vec<&str> = adapters.iter().map(|a| a.platform_name()).collect();
		assert_eq!(names, vec!["Sushi", "Uniswap V3"]);
	}

	#[test]
	fn test_last_registration_wins() {
		let mut registry = AdapterRegistry::with_builtin(chains());
		registry
			.register("uniswapV3", |context| {
				Box::new(CustomAdapter {
					name: "first",
					chain_id: context.chain_id,
				})
			})
			.unwrap();
		registry
			.register("uniswapV3", |context| {
				Box::new(CustomAdapter {
					name: "second",
					chain_id: context.chain_id,
				})
			})
			.unwrap();

		let adapter = registry.get("uniswapV3", None, &connection()).unwrap();
		assert_eq!(adapter.platform_name(), "second");
		assert_eq!(registry.supported_platform_ids(), vec!["uniswapV3".to_string()]);
	}

	#[test]
	fn test_empty_platform_id_is_rejected() {
		let mut registry = AdapterRegistry::new(chains());
		let result = registry.register("  ", |context| {
			Box::new(CustomAdapter {
				name: "blank",
				chain_id: context.chain_id,
			})
		});

		assert!(matches!(result, Err(AdapterError::InvalidRegistration(_))));
		assert!(registry.supported_platform_ids().is_empty());
	}
}
