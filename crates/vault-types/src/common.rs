//! Common primitives used throughout the client.

pub use alloy::primitives::{Address, Bytes, B256, U256};

/// Hash of a submitted transaction.
pub type TransactionHash = B256;

/// Block number.
pub type BlockNumber = u64;

/// Shortens a transaction hash for log output.
pub fn truncate_hash(hash: &TransactionHash) -> String {
	let hash_str = hex::encode(hash.as_slice());
	if hash_str.len() <= 8 {
		hash_str
	} else {
		format!("{}..", &hash_str[..8])
	}
}
