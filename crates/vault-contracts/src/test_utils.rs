//! Hand-written mocks shared by this crate's tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vault_account::{AccountError, AccountInterface};
use vault_config::{parse_contract_artifacts, ContractArtifacts};
use vault_provider::{LogFilter, ProviderError, ProviderInterface};
use vault_types::{
	Address, BlockNumber, Bytes, ChainId, Log, Transaction, TransactionHash, TransactionReceipt,
};

pub fn artifacts() -> ContractArtifacts {
	parse_contract_artifacts(include_str!("../../../config/contracts.json")).unwrap()
}

/// Provider that answers from canned data and counts every request.
pub struct MockProvider {
	pub chain_id: Option<ChainId>,
	pub call_output: Vec<u8>,
	pub chain_id_calls: AtomicUsize,
	pub other_calls: AtomicUsize,
	calls: Mutex<Vec<(Address, Bytes)>>,
}

impl MockProvider {
	pub fn with_chain_id(chain_id: ChainId) -> Self {
		Self {
			chain_id: Some(chain_id),
			call_output: Vec::new(),
			chain_id_calls: AtomicUsize::new(0),
			other_calls: AtomicUsize::new(0),
			calls: Mutex::new(Vec::new()),
		}
	}

	/// A provider whose network id query always fails.
	pub fn unreachable() -> Self {
		Self {
			chain_id: None,
			..Self::with_chain_id(ChainId::LOCAL)
		}
	}

	pub fn returning(mut self, output: Vec<u8>) -> Self {
		self.call_output = output;
		self
	}

	pub fn total_calls(&self) -> usize {
		self.chain_id_calls.load(Ordering::SeqCst) + self.other_calls.load(Ordering::SeqCst)
	}

	pub fn recorded_calls(&self) -> Vec<(Address, Bytes)> {
		self.calls.lock().unwrap().clone()
	}
}

#[async_trait]
impl ProviderInterface for MockProvider {
	async fn chain_id(&self) -> Result<ChainId, ProviderError> {
		self.chain_id_calls.fetch_add(1, Ordering::SeqCst);
		self.chain_id
			.ok_or_else(|| ProviderError::Network("connection refused".to_string()))
	}

	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
		self.other_calls.fetch_add(1, Ordering::SeqCst);
		self.calls.lock().unwrap().push((to, data));
		Ok(Bytes::from(self.call_output.clone()))
	}

	async fn get_logs(&self, _filter: &LogFilter) -> Result<Vec<Log>, ProviderError> {
		self.other_calls.fetch_add(1, Ordering::SeqCst);
		Ok(Vec::new())
	}

	async fn get_transaction_receipt(
		&self,
		_hash: TransactionHash,
	) -> Result<Option<TransactionReceipt>, ProviderError> {
		self.other_calls.fetch_add(1, Ordering::SeqCst);
		Ok(None)
	}

	async fn get_block_number(&self) -> Result<BlockNumber, ProviderError> {
		self.other_calls.fetch_add(1, Ordering::SeqCst);
		Ok(0)
	}
}

/// Signer with an optional provider binding that never submits anything.
pub struct MockSigner {
	provider: Option<Arc<dyn ProviderInterface>>,
}

impl MockSigner {
	pub fn without_provider() -> Self {
		Self { provider: None }
	}
}

#[async_trait]
impl AccountInterface for MockSigner {
	fn address(&self) -> Address {
		Address::repeat_byte(0x5e)
	}

	fn provider(&self) -> Option<Arc<dyn ProviderInterface>> {
		self.provider.clone()
	}

	async fn send_transaction(&self, _tx: &Transaction) -> Result<TransactionHash, AccountError> {
		Err(AccountError::NoProvider)
	}
}
