//! Transaction orchestration for vault and batch executions.
//!
//! Builds a single transaction from a multi-call request, submits it through
//! the caller's signer, waits for it under a [`ConfirmationPolicy`], and
//! decodes the receipt into a [`TransactionResult`]. Nothing here retries a
//! submission: every call produces at most one new transaction.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};
use vault_account::{AccountError, AccountInterface};
use vault_contracts::{
	Connection, ContractError, ContractHandle, ContractResolver, DecodedEvent, DynSolValue,
	EventDecoder, BATCH_EXECUTOR, POSITION_VAULT,
};
use vault_provider::{ProviderError, ProviderInterface};
use vault_types::{
	truncate_hash, Address, Bytes, ChainId, RequestError, Transaction, TransactionHash,
	TransactionReceipt, TransactionRequest, U256,
};

pub mod types;

pub use types::{ConfirmationPolicy, TransactionResult};

const EXECUTED_EVENT: &str = "TransactionExecuted";

/// Why a submitted transaction did not go through.
#[derive(Debug, Error)]
pub enum SubmissionFailure {
	#[error("submission rejected: {0}")]
	Rejected(#[from] AccountError),
	#[error("transaction {0} failed on chain")]
	Failed(TransactionHash),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
	#[error("Signer is not connected to a provider")]
	SignerBinding,

	#[error("Invalid request: {0}")]
	InvalidRequest(#[from] RequestError),

	#[error("Transaction reverted: {source}")]
	TransactionReverted {
		#[source]
		source: SubmissionFailure,
	},

	#[error("Timed out after {}s waiting for transaction {}", .timeout_secs, truncate_hash(.tx_hash))]
	ConfirmationTimeout {
		tx_hash: TransactionHash,
		timeout_secs: u64,
	},

	#[error("Contract error: {0}")]
	Contract(#[from] ContractError),

	#[error("Network error: {0}")]
	Network(#[from] ProviderError),
}

/// Orchestrates submissions against the vault contracts.
pub struct DeliveryService {
	resolver: Arc<ContractResolver>,
	policy: ConfirmationPolicy,
}

impl DeliveryService {
	pub fn new(resolver: Arc<ContractResolver>, policy: ConfirmationPolicy) -> Self {
		Self { resolver, policy }
	}

	pub fn policy(&self) -> &ConfirmationPolicy {
		&self.policy
	}

	/// Runs the calls through a user's vault via `execute(targets, data)`.
	///
	/// The vault entry point forwards no native value, so calls carrying
	/// value are rejected before anything is sent.
	pub async fn execute_vault_transactions(
		&self,
		vault: Address,
		request: &TransactionRequest,
		signer: Arc<dyn AccountInterface>,
		network_id: Option<ChainId>,
	) -> Result<TransactionResult, DeliveryError> {
		request.ensure_not_empty()?;
		request.ensure_no_value()?;
		let provider = signer.provider().ok_or(DeliveryError::SignerBinding)?;

		let connection = Connection::Signer(signer.clone());
		let chain_id = self.resolver.network_id(network_id, &connection).await?;
		let handle = self.resolver.at(POSITION_VAULT, vault, chain_id, &connection)?;

		let tx = handle.transaction(
			"execute",
			&[address_array(request), bytes_array(request)],
			U256::ZERO,
		)?;

		info!(
			vault = %vault,
			calls = request.len(),
			chain_id = %chain_id,
			"Executing vault transactions"
		);

		let receipt = self
			.submit_and_confirm(&tx, signer.as_ref(), provider.as_ref())
			.await?;

		Ok(build_result(&handle, &receipt, false))
	}

	/// Runs the calls through the batch executor via
	/// `executeBatch(targets, data, values)`, attaching the exact sum of the
	/// per-call values.
	pub async fn execute_batch_transactions(
		&self,
		request: &TransactionRequest,
		signer: Arc<dyn AccountInterface>,
		network_id: Option<ChainId>,
	) -> Result<TransactionResult, DeliveryError> {
		request.ensure_not_empty()?;
		let total_value = request.total_value()?;
		let provider = signer.provider().ok_or(DeliveryError::SignerBinding)?;

		let connection = Connection::Signer(signer.clone());
		let handle = self
			.resolver
			.resolve(BATCH_EXECUTOR, network_id, &connection)
			.await?;

		let values = DynSolValue::Array(
			request
				.values()
				.into_iter()
				.map(|value| DynSolValue::Uint(value, 256))
				.collect(),
		);
		let tx = handle.transaction(
			"executeBatch",
			&[address_array(request), bytes_array(request), values],
			total_value,
		)?;

		info!(
			executor = %handle.address(),
			calls = request.len(),
			total_value = %total_value,
			chain_id = %handle.chain_id(),
			"Executing batch transactions"
		);

		let receipt = self
			.submit_and_confirm(&tx, signer.as_ref(), provider.as_ref())
			.await?;

		Ok(build_result(&handle, &receipt, true))
	}

	/// Sends a transaction and waits until it is confirmed and successful.
	pub async fn submit_and_confirm(
		&self,
		tx: &Transaction,
		signer: &dyn AccountInterface,
		provider: &dyn ProviderInterface,
	) -> Result<TransactionReceipt, DeliveryError> {
		let tx_hash = signer.send_transaction(tx).await.map_err(|e| {
			error!(error = %e, "Transaction submission rejected");
			DeliveryError::TransactionReverted {
				source: SubmissionFailure::Rejected(e),
			}
		})?;

		let receipt = self.wait_for_confirmation(provider, tx_hash).await?;

		if !receipt.success {
			error!(tx_hash = %truncate_hash(&tx_hash), "Transaction failed on chain");
			return Err(DeliveryError::TransactionReverted {
				source: SubmissionFailure::Failed(tx_hash),
			});
		}

		info!(
			tx_hash = %truncate_hash(&tx_hash),
			block_number = receipt.block_number,
			"Transaction confirmed"
		);
		Ok(receipt)
	}

	/// Polls for the receipt until the policy's depth is reached or its
	/// timeout expires.
	pub async fn wait_for_confirmation(
		&self,
		provider: &dyn ProviderInterface,
		tx_hash: TransactionHash,
	) -> Result<TransactionReceipt, DeliveryError> {
		info!(
			tx_hash = %truncate_hash(&tx_hash),
			"Waiting for {} confirmations (timeout: {}s)",
			self.policy.confirmations,
			self.policy.timeout.as_secs()
		);

		tokio::time::timeout(self.policy.timeout, self.poll_receipt(provider, tx_hash))
			.await
			.map_err(|_| DeliveryError::ConfirmationTimeout {
				tx_hash,
				timeout_secs: self.policy.timeout.as_secs(),
			})?
	}

	async fn poll_receipt(
		&self,
		provider: &dyn ProviderInterface,
		tx_hash: TransactionHash,
	) -> Result<TransactionReceipt, DeliveryError> {
		loop {
			let Some(receipt) = provider.get_transaction_receipt(tx_hash).await? else {
				tokio::time::sleep(self.policy.poll_interval).await;
				continue;
			};

			let current_block = provider.get_block_number().await?;
			let depth = current_block
				.saturating_sub(receipt.block_number)
				.saturating_add(1);

			if depth >= self.policy.confirmations {
				return Ok(receipt);
			}

			debug!(
				tx_hash = %truncate_hash(&tx_hash),
				"Waiting for {} more confirmations...",
				self.policy.confirmations - depth
			);
			tokio::time::sleep(self.policy.poll_interval).await;
		}
	}
}

fn address_array(request: &TransactionRequest) -> DynSolValue {
	DynSolValue::Array(
		request
			.targets()
			.into_iter()
			.map(DynSolValue::Address)
			.collect(),
	)
}

fn bytes_array(request: &TransactionRequest) -> DynSolValue {
	DynSolValue::Array(
		request
			.call_data()
			.into_iter()
			.map(|data| DynSolValue::Bytes(data.to_vec()))
			.collect(),
	)
}

/// Decodes the receipt against the contract the transaction was sent to.
fn build_result(
	handle: &ContractHandle,
	receipt: &TransactionReceipt,
	with_return_data: bool,
) -> TransactionResult {
	let events = EventDecoder::new(vec![handle.event_candidate()]).decode(&receipt.logs);

	let executions: Vec<&DecodedEvent> = events
		.iter()
		.filter(|event| event.name == EXECUTED_EVENT)
		.collect();

	let per_call_targets = executions
		.iter()
		.filter_map(|event| event.value(0).and_then(DynSolValue::as_address))
		.collect();
	let per_call_success = executions
		.iter()
		.filter_map(|event| event.value(2).and_then(DynSolValue::as_bool))
		.collect();
	let per_call_return_data = with_return_data.then(|| {
		executions
			.iter()
			.filter_map(|event| event.value(3).and_then(DynSolValue::as_bytes))
			.map(Bytes::copy_from_slice)
			.collect()
	});

	TransactionResult {
		transaction_hash: receipt.transaction_hash,
		block_number: receipt.block_number,
		per_call_success,
		per_call_targets,
		per_call_return_data,
		events,
	}
}
