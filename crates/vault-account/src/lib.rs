//! Signing accounts for the vault client.
//!
//! An account is the write side of a connection. It owns an address, can
//! submit transactions, and may be bound to a provider that the rest of the
//! client uses for reads and confirmation polling. An account without a
//! provider binding can still be used to derive addresses but cannot submit.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use vault_provider::ProviderInterface;
use vault_types::{Address, Transaction, TransactionHash};

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

pub use implementations::local::LocalWallet;

#[derive(Debug, Error)]
pub enum AccountError {
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	#[error("Account has no provider binding")]
	NoProvider,
	#[error("Failed to send transaction: {0}")]
	SendFailed(String),
	#[error("Provider error: {0}")]
	Provider(String),
}

/// Trait defining a transaction-capable account.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Address transactions are sent from.
	fn address(&self) -> Address;

	/// Provider the account is bound to, if any.
	fn provider(&self) -> Option<Arc<dyn ProviderInterface>>;

	/// Signs and submits a transaction, returning its hash once accepted
	/// by the node. Does not wait for inclusion.
	async fn send_transaction(&self, tx: &Transaction) -> Result<TransactionHash, AccountError>;
}
