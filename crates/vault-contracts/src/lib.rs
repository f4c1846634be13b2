//! Contract resolution and event decoding.
//!
//! Logical contract names (`VaultFactory`, `PositionVault`, `BatchExecutor`)
//! are mapped to an ABI and per-network addresses loaded from the artifact
//! file. Resolving a name yields a fresh [`ContractHandle`] bound to a
//! [`Connection`]; handles are never cached. Receipt logs are turned back
//! into structured events by the [`EventDecoder`].

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use vault_account::AccountInterface;
use vault_provider::{ProviderError, ProviderInterface};
use vault_types::ChainId;

pub mod decoder;
pub mod handle;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_utils;

pub use decoder::{DecodedEvent, EventArgument, EventCandidate, EventDecoder};
pub use handle::ContractHandle;
pub use resolver::{ContractDescriptor, ContractResolver};

/// Re-exported so callers can build call arguments without depending on alloy directly.
pub use alloy::dyn_abi::DynSolValue;

pub const VAULT_FACTORY: &str = "VaultFactory";
pub const POSITION_VAULT: &str = "PositionVault";
pub const BATCH_EXECUTOR: &str = "BatchExecutor";

#[derive(Debug, Error)]
pub enum ContractError {
	#[error("Contract {0} not found in contract data")]
	UnknownContract(String),

	#[error("No {name} deployment found for network {chain_id}")]
	UndeployedContract { name: String, chain_id: ChainId },

	#[error("Network unavailable: {0}")]
	NetworkUnavailable(String),

	#[error("Connection has no provider for read access")]
	MissingProvider,

	#[error("Function {function} not found on {contract}")]
	UnknownFunction { contract: String, function: String },

	#[error("Encoding error: {0}")]
	Encoding(String),

	#[error("Decoding error: {0}")]
	Decoding(String),

	#[error("Provider error: {0}")]
	Provider(#[from] ProviderError),
}

/// What a contract handle talks through: a read-only provider, or a signer
/// that may carry its own provider binding.
#[derive(Clone)]
pub enum Connection {
	Provider(Arc<dyn ProviderInterface>),
	Signer(Arc<dyn AccountInterface>),
}

impl Connection {
	/// Provider usable for reads, if the connection has one.
	pub fn provider(&self) -> Option<Arc<dyn ProviderInterface>> {
		match self {
			Connection::Provider(provider) => Some(provider.clone()),
			Connection::Signer(signer) => signer.provider(),
		}
	}

	pub fn signer(&self) -> Option<&Arc<dyn AccountInterface>> {
		match self {
			Connection::Provider(_) => None,
			Connection::Signer(signer) => Some(signer),
		}
	}

	pub fn is_signer(&self) -> bool {
		matches!(self, Connection::Signer(_))
	}
}

impl From<Arc<dyn ProviderInterface>> for Connection {
	fn from(provider: Arc<dyn ProviderInterface>) -> Self {
		Connection::Provider(provider)
	}
}

impl From<Arc<dyn AccountInterface>> for Connection {
	fn from(signer: Arc<dyn AccountInterface>) -> Self {
		Connection::Signer(signer)
	}
}

impl fmt::Debug for Connection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Connection::Provider(_) => f.write_str("Connection::Provider"),
			Connection::Signer(signer) => f
				.debug_tuple("Connection::Signer")
				.field(&signer.address())
				.finish(),
		}
	}
}
