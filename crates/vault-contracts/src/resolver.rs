//! Maps logical contract names to deployed, connected handles.

use crate::{Connection, ContractError, ContractHandle};
use alloy::json_abi::JsonAbi;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};
use vault_config::ContractArtifacts;
use vault_types::{Address, ChainId};

/// ABI and deployment addresses for one logical contract.
#[derive(Debug, Clone)]
pub struct ContractDescriptor {
	pub name: String,
	pub abi: Arc<JsonAbi>,
	pub addresses: HashMap<ChainId, Address>,
}

impl ContractDescriptor {
	pub fn new(name: impl Into<String>, abi: JsonAbi, addresses: HashMap<ChainId, Address>) -> Self {
		Self {
			name: name.into(),
			abi: Arc::new(abi),
			addresses,
		}
	}

	/// Deployed address on a network. There is no fallback address.
	pub fn address(&self, chain_id: ChainId) -> Option<Address> {
		self.addresses.get(&chain_id).copied()
	}
}

/// Resolves logical contract names against the loaded artifacts.
#[derive(Debug, Clone, Default)]
pub struct ContractResolver {
	descriptors: BTreeMap<String, Arc<ContractDescriptor>>,
	/// Network used when neither the caller nor the connection names one.
	default_network_id: Option<ChainId>,
}

impl ContractResolver {
	pub fn new(artifacts: ContractArtifacts) -> Self {
		let descriptors = artifacts
			.into_iter()
			.map(|(name, artifact)| {
				let descriptor = ContractDescriptor::new(name.clone(), artifact.abi, artifact.addresses);
				(name, Arc::new(descriptor))
			})
			.collect();

		Self {
			descriptors,
			default_network_id: None,
		}
	}

	pub fn with_default_network(mut self, default_network_id: Option<ChainId>) -> Self {
		self.default_network_id = default_network_id;
		self
	}

	pub fn default_network_id(&self) -> Option<ChainId> {
		self.default_network_id
	}

	pub fn descriptor(&self, name: &str) -> Option<&Arc<ContractDescriptor>> {
		self.descriptors.get(name)
	}

	pub fn contract_names(&self) -> impl Iterator<Item = &str> {
		self.descriptors.keys().map(String::as_str)
	}

	/// Deployed address of a logical contract on a network, if any.
	pub fn address_of(&self, name: &str, chain_id: ChainId) -> Option<Address> {
		self.descriptors
			.get(name)
			.and_then(|descriptor| descriptor.address(chain_id))
	}

	/// Works out which network an operation targets.
	///
	/// An explicit id wins. Otherwise the connection is asked, and when it
	/// cannot answer the configured default is used.
	pub async fn network_id(
		&self,
		explicit: Option<ChainId>,
		connection: &Connection,
	) -> Result<ChainId, ContractError> {
		if let Some(chain_id) = explicit {
			return Ok(chain_id);
		}

		match connection.provider() {
			Some(provider) => match provider.chain_id().await {
				Ok(chain_id) => return Ok(chain_id),
				Err(e) => debug!(error = %e, "Connection could not report its network"),
			},
			None => debug!("Connection has no provider to report its network"),
		}

		match self.default_network_id {
			Some(chain_id) => {
				warn!(
					chain_id = %chain_id,
					"Network not reported by connection, using configured default"
				);
				Ok(chain_id)
			}
			None => Err(ContractError::NetworkUnavailable(
				"connection did not report a network and no default is configured".to_string(),
			)),
		}
	}

	/// Resolves a logical contract to a handle on the target network.
	///
	/// Unknown names fail before the connection is touched.
	pub async fn resolve(
		&self,
		name: &str,
		network_id: Option<ChainId>,
		connection: &Connection,
	) -> Result<ContractHandle, ContractError> {
		let descriptor = self
			.descriptors
			.get(name)
			.ok_or_else(|| ContractError::UnknownContract(name.to_string()))?;

		let chain_id = self.network_id(network_id, connection).await?;

		let address = descriptor
			.address(chain_id)
			.ok_or_else(|| ContractError::UndeployedContract {
				name: name.to_string(),
				chain_id,
			})?;

		debug!(contract = name, chain_id = %chain_id, address = %address, "Resolved contract");

		Ok(ContractHandle::new(
			address,
			chain_id,
			descriptor.clone(),
			connection.clone(),
		))
	}

	/// Binds a contract interface to an arbitrary address, such as a
	/// per-user vault instance.
	pub fn at(
		&self,
		name: &str,
		address: Address,
		chain_id: ChainId,
		connection: &Connection,
	) -> Result<ContractHandle, ContractError> {
		let descriptor = self
			.descriptors
			.get(name)
			.ok_or_else(|| ContractError::UnknownContract(name.to_string()))?;

		Ok(ContractHandle::new(
			address,
			chain_id,
			descriptor.clone(),
			connection.clone(),
		))
	}
}
