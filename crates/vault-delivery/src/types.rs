//! Confirmation policy and execution results.

use std::time::Duration;
use vault_config::ConfirmationSettings;
use vault_contracts::DecodedEvent;
use vault_types::{Address, BlockNumber, Bytes, TransactionHash};

/// How long and how often to wait for a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
	/// Upper bound on the whole wait, measured from when waiting starts.
	pub timeout: Duration,
	pub poll_interval: Duration,
	/// Required depth; the inclusion block counts as the first confirmation.
	pub confirmations: u64,
}

impl Default for ConfirmationPolicy {
	fn default() -> Self {
		Self {
			timeout: Duration::from_secs(120),
			poll_interval: Duration::from_secs(2),
			confirmations: 1,
		}
	}
}

impl From<&ConfirmationSettings> for ConfirmationPolicy {
	fn from(settings: &ConfirmationSettings) -> Self {
		Self {
			timeout: settings.timeout(),
			poll_interval: settings.poll_interval(),
			confirmations: settings.confirmations.max(1),
		}
	}
}

/// Outcome of a confirmed multi-call transaction.
///
/// Per-call vectors follow the order of the execution events in the
/// receipt, which is the order the calls ran in.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionResult {
	pub transaction_hash: TransactionHash,
	pub block_number: BlockNumber,
	pub per_call_success: Vec<bool>,
	pub per_call_targets: Vec<Address>,
	/// Only reported by entry points that return call output.
	pub per_call_return_data: Option<Vec<Bytes>>,
	/// Every event decoded from the receipt.
	pub events: Vec<DecodedEvent>,
}

impl TransactionResult {
	pub fn all_succeeded(&self) -> bool {
		self.per_call_success.iter().all(|success| *success)
	}
}
