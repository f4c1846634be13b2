//! Connection providers for the vault client.
//!
//! A provider is the read side of a connection: it reports which network it
//! talks to, performs read-only contract calls, fetches logs and looks up
//! receipts. Writing transactions is the job of an account (see
//! `vault-account`), which may carry a provider binding of its own.

use async_trait::async_trait;
use thiserror::Error;
use vault_types::{Address, BlockNumber, Bytes, ChainId, Log, TransactionHash, TransactionReceipt};

/// Re-export implementations
pub mod implementations {
	pub mod alloy;
}

pub use implementations::alloy::{create_provider, AlloyProvider};

/// Errors that can occur while talking to a node.
#[derive(Debug, Error)]
pub enum ProviderError {
	/// The configured endpoint could not be parsed.
	#[error("Invalid RPC URL: {0}")]
	InvalidUrl(String),
	/// Transport or node-side failure.
	#[error("Network error: {0}")]
	Network(String),
	/// A read-only call was rejected by the node (typically a revert).
	#[error("Call failed: {0}")]
	CallFailed(String),
}

/// Range of blocks and emitter to fetch logs for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
	/// Only logs emitted by this contract, when set.
	pub address: Option<Address>,
	/// First block of the range (inclusive).
	pub from_block: BlockNumber,
	/// Last block of the range (inclusive); latest when unset.
	pub to_block: Option<BlockNumber>,
}

impl LogFilter {
	pub fn new(from_block: BlockNumber) -> Self {
		Self {
			from_block,
			..Default::default()
		}
	}

	pub fn address(mut self, address: Address) -> Self {
		self.address = Some(address);
		self
	}

	pub fn to_block(mut self, to_block: BlockNumber) -> Self {
		self.to_block = Some(to_block);
		self
	}
}

/// Trait defining the read-capable connection to a network.
#[async_trait]
pub trait ProviderInterface: Send + Sync {
	/// Network identifier reported by the node.
	async fn chain_id(&self) -> Result<ChainId, ProviderError>;

	/// Executes a read-only call and returns the raw return data.
	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError>;

	/// Fetches logs matching the filter, in chain order.
	async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, ProviderError>;

	/// Looks up a receipt; `None` while the transaction is pending.
	async fn get_transaction_receipt(
		&self,
		hash: TransactionHash,
	) -> Result<Option<TransactionReceipt>, ProviderError>;

	/// Current head block number.
	async fn get_block_number(&self) -> Result<BlockNumber, ProviderError>;
}
