//! Public entry point of the vault client.
//!
//! [`VaultClient`] ties the chain registry, contract resolver, adapter
//! registry and delivery service together behind the operations an
//! application needs: resolving contracts, looking up platform adapters,
//! executing multi-call transactions and reading vault state.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use vault_account::AccountInterface;
use vault_adapters::{AdapterContext, AdapterError, AdapterInterface, AdapterRegistry};
use vault_chains::{ChainError, ChainRegistry};
use vault_config::{load_contract_artifacts, ConfigError, ContractArtifacts, VaultConfig};
use vault_contracts::{
	Connection, ContractError, ContractHandle, ContractResolver, DecodedEvent, DynSolValue,
	EventDecoder, POSITION_VAULT, VAULT_FACTORY,
};
use vault_delivery::{ConfirmationPolicy, DeliveryError, DeliveryService, TransactionResult};
use vault_provider::{create_provider, LogFilter, ProviderError};
use vault_types::{Address, BlockNumber, ChainId, TransactionRequest, U256};

const VAULT_CREATED_EVENT: &str = "VaultCreated";

#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Configuration error: {0}")]
	Config(#[from] ConfigError),
	#[error("Chain error: {0}")]
	Chain(#[from] ChainError),
	#[error("Contract error: {0}")]
	Contract(#[from] ContractError),
	#[error("Adapter error: {0}")]
	Adapter(#[from] AdapterError),
	#[error("Delivery error: {0}")]
	Delivery(#[from] DeliveryError),
	#[error("Provider error: {0}")]
	Provider(#[from] ProviderError),
	#[error("Failed to find {0} event in transaction logs")]
	MissingEvent(String),
	#[error("Unexpected output from {0}")]
	UnexpectedOutput(String),
}

/// Vault metadata as recorded by the factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultInfo {
	pub owner: Address,
	pub name: String,
	/// Unix timestamp of creation, in seconds.
	pub creation_time: u64,
}

/// Builder for [`VaultClient`].
pub struct VaultClientBuilder {
	config: VaultConfig,
	artifacts: Option<ContractArtifacts>,
	policy: Option<ConfirmationPolicy>,
}

impl VaultClientBuilder {
	pub fn new(config: VaultConfig) -> Self {
		Self {
			config,
			artifacts: None,
			policy: None,
		}
	}

	pub fn with_artifacts(mut self, artifacts: ContractArtifacts) -> Self {
		self.artifacts = Some(artifacts);
		self
	}

	/// Overrides the confirmation policy derived from configuration.
	pub fn with_confirmation_policy(mut self, policy: ConfirmationPolicy) -> Self {
		self.policy = Some(policy);
		self
	}

	pub fn build(self) -> Result<VaultClient, ClientError> {
		let artifacts = self.artifacts.ok_or_else(|| {
			ConfigError::ValidationError("Contract artifacts not provided".to_string())
		})?;

		let chains = Arc::new(ChainRegistry::from_config(&self.config)?);
		let resolver = Arc::new(
			ContractResolver::new(artifacts).with_default_network(self.config.client.default_network_id),
		);
		let policy = self
			.policy
			.unwrap_or_else(|| ConfirmationPolicy::from(&self.config.confirmation));
		let delivery = DeliveryService::new(resolver.clone(), policy);
		let adapters = AdapterRegistry::with_builtin(chains.clone());

		info!(
			client = %self.config.client.name,
			chains = chains.supported_chain_ids().len(),
			contracts = resolver.contract_names().count(),
			"Vault client ready"
		);

		Ok(VaultClient {
			config: self.config,
			chains,
			resolver,
			adapters,
			delivery,
		})
	}
}

/// Orchestration client for vault contracts across networks.
pub struct VaultClient {
	config: VaultConfig,
	chains: Arc<ChainRegistry>,
	resolver: Arc<ContractResolver>,
	adapters: AdapterRegistry,
	delivery: DeliveryService,
}

impl VaultClient {
	/// Builds a client, reading contract artifacts from the configured path.
	pub async fn from_config(config: VaultConfig) -> Result<Self, ClientError> {
		let artifacts = load_contract_artifacts(&config.client.contracts_path).await?;
		VaultClientBuilder::new(config)
			.with_artifacts(artifacts)
			.build()
	}

	pub fn config(&self) -> &VaultConfig {
		&self.config
	}

	pub fn chains(&self) -> &ChainRegistry {
		&self.chains
	}

	pub fn resolver(&self) -> &ContractResolver {
		&self.resolver
	}

	pub fn adapters(&self) -> &AdapterRegistry {
		&self.adapters
	}

	/// Opens a read-only connection to a configured network.
	pub fn connect(&self, chain_id: ChainId) -> Result<Connection, ClientError> {
		let rpc_url = self
			.chains
			.rpc_url(chain_id)
			.ok_or(ChainError::UnsupportedChain(chain_id))?;
		Ok(Connection::Provider(create_provider(rpc_url)?))
	}

	pub async fn resolve(
		&self,
		name: &str,
		network_id: Option<ChainId>,
		connection: &Connection,
	) -> Result<ContractHandle, ClientError> {
		Ok(self.resolver.resolve(name, network_id, connection).await?)
	}

	/// Builds a platform adapter scoped to the connection's active network.
	///
	/// The network is chosen the same way as for [`resolve`](Self::resolve).
	/// `Ok(None)` means no adapter is registered for the platform.
	pub async fn get_adapter(
		&self,
		platform_id: &str,
		network_id: Option<ChainId>,
		connection: &Connection,
	) -> Result<Option<Box<dyn AdapterInterface>>, ClientError> {
		let chain_id = self.resolver.network_id(network_id, connection).await?;
		Ok(self.adapters.get(platform_id, Some(chain_id), connection))
	}

	pub fn get_adapters_for_chain(
		&self,
		chain_id: ChainId,
		connection: &Connection,
	) -> Vec<Box<dyn AdapterInterface>> {
		self.adapters.get_all_for_chain(chain_id, connection)
	}

	pub fn register_adapter<F>(&mut self, platform_id: &str, constructor: F) -> Result<(), ClientError>
	where
		F: Fn(AdapterContext) -> Box<dyn AdapterInterface> + Send + Sync + 'static,
	{
		Ok(self.adapters.register(platform_id, constructor)?)
	}

	pub async fn execute_vault_transactions(
		&self,
		vault: Address,
		request: &TransactionRequest,
		signer: Arc<dyn AccountInterface>,
		network_id: Option<ChainId>,
	) -> Result<TransactionResult, ClientError> {
		Ok(self
			.delivery
			.execute_vault_transactions(vault, request, signer, network_id)
			.await?)
	}

	pub async fn execute_batch_transactions(
		&self,
		request: &TransactionRequest,
		signer: Arc<dyn AccountInterface>,
		network_id: Option<ChainId>,
	) -> Result<TransactionResult, ClientError> {
		Ok(self
			.delivery
			.execute_batch_transactions(request, signer, network_id)
			.await?)
	}

	pub async fn get_vault_info(
		&self,
		vault: Address,
		connection: &Connection,
		network_id: Option<ChainId>,
	) -> Result<VaultInfo, ClientError> {
		let factory = self.resolver.resolve(VAULT_FACTORY, network_id, connection).await?;
		let output = factory
			.call("getVaultInfo", &[DynSolValue::Address(vault)])
			.await?;

		match output.as_slice() {
			[DynSolValue::Address(owner), DynSolValue::String(name), DynSolValue::Uint(created, _)] => {
				let creation_time = u64::try_from(*created)
					.map_err(|_| ClientError::UnexpectedOutput("getVaultInfo".to_string()))?;
				Ok(VaultInfo {
					owner: *owner,
					name: name.clone(),
					creation_time,
				})
			}
			_ => Err(ClientError::UnexpectedOutput("getVaultInfo".to_string())),
		}
	}

	pub async fn get_user_vaults(
		&self,
		user: Address,
		connection: &Connection,
		network_id: Option<ChainId>,
	) -> Result<Vec<Address>, ClientError> {
		let factory = self.resolver.resolve(VAULT_FACTORY, network_id, connection).await?;
		let output = factory
			.call("getVaults", &[DynSolValue::Address(user)])
			.await?;

		output
			.first()
			.and_then(DynSolValue::as_array)
			.map(|values| values.iter().filter_map(DynSolValue::as_address).collect())
			.ok_or_else(|| ClientError::UnexpectedOutput("getVaults".to_string()))
	}

	/// Deploys a vault through the factory and returns its address.
	pub async fn create_vault(
		&self,
		name: &str,
		signer: Arc<dyn AccountInterface>,
		network_id: Option<ChainId>,
	) -> Result<Address, ClientError> {
		let provider = signer.provider().ok_or(DeliveryError::SignerBinding)?;

		let connection = Connection::Signer(signer.clone());
		let factory = self.resolver.resolve(VAULT_FACTORY, network_id, &connection).await?;
		let tx = factory.transaction(
			"createVault",
			&[DynSolValue::String(name.to_string())],
			U256::ZERO,
		)?;

		let receipt = self
			.delivery
			.submit_and_confirm(&tx, signer.as_ref(), provider.as_ref())
			.await?;

		let vault = EventDecoder::new(vec![factory.event_candidate()])
			.decode(&receipt.logs)
			.into_iter()
			.find(|event| event.name == VAULT_CREATED_EVENT)
			.and_then(|event| event.value(1).and_then(DynSolValue::as_address))
			.ok_or_else(|| ClientError::MissingEvent(VAULT_CREATED_EVENT.to_string()))?;

		info!(vault = %vault, name, "Created vault");
		Ok(vault)
	}

	/// Decoded events emitted by a vault over a block range.
	pub async fn get_vault_history(
		&self,
		vault: Address,
		from_block: BlockNumber,
		to_block: Option<BlockNumber>,
		connection: &Connection,
		network_id: Option<ChainId>,
	) -> Result<Vec<DecodedEvent>, ClientError> {
		let provider = connection.provider().ok_or(ContractError::MissingProvider)?;
		let chain_id = self.resolver.network_id(network_id, connection).await?;
		let handle = self.resolver.at(POSITION_VAULT, vault, chain_id, connection)?;

		let mut filter = LogFilter::new(from_block).address(vault);
		if let Some(to_block) = to_block {
			filter = filter.to_block(to_block);
		}

		let logs = provider.get_logs(&filter).await?;
		let events = EventDecoder::new(vec![handle.event_candidate()]).decode(&logs);

		debug!(
			vault = %vault,
			logs = logs.len(),
			events = events.len(),
			"Fetched vault history"
		);
		Ok(events)
	}
}
