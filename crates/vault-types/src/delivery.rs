//! Receipt and log types returned by connection providers.
//!
//! Providers convert their backend-specific receipts into these shapes so
//! that decoding and result assembly never depend on a particular RPC
//! library.

use crate::common::{Address, BlockNumber, Bytes, TransactionHash, B256};

/// A single log entry emitted during transaction execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
	/// Contract that emitted the log.
	pub address: Address,
	/// Indexed topics; `topics[0]` is the event selector for non-anonymous events.
	pub topics: Vec<B256>,
	/// ABI-encoded non-indexed payload.
	pub data: Bytes,
	/// Position of the log within its block, when known.
	pub log_index: Option<u64>,
	/// Block the log was included in, when known.
	pub block_number: Option<BlockNumber>,
	/// Transaction that produced the log, when known.
	pub transaction_hash: Option<TransactionHash>,
}

impl Log {
	/// Creates a log with no block metadata.
	pub fn new(address: Address, topics: Vec<B256>, data: impl Into<Bytes>) -> Self {
		Self {
			address,
			topics,
			data: data.into(),
			log_index: None,
			block_number: None,
			transaction_hash: None,
		}
	}

	/// Returns the first topic, which identifies non-anonymous events.
	pub fn selector(&self) -> Option<&B256> {
		self.topics.first()
	}
}

/// Transaction receipt containing execution details.
///
/// Logs are kept in the order the node reported them, which is the order
/// the contracts emitted them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub transaction_hash: TransactionHash,
	/// The block number where the transaction was included.
	pub block_number: BlockNumber,
	/// Whether the transaction executed successfully.
	pub success: bool,
	/// Logs emitted during execution, in emission order.
	pub logs: Vec<Log>,
}
