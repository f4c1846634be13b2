//! Alloy-based HTTP provider.

use crate::{LogFilter, ProviderError, ProviderInterface};
use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{
	Filter, Log as RpcLog, TransactionReceipt as RpcReceipt, TransactionRequest,
};
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use std::sync::Arc;
use vault_types::{Address, BlockNumber, Bytes, ChainId, Log, TransactionHash, TransactionReceipt};

/// Read-only provider backed by an Alloy HTTP transport.
pub struct AlloyProvider {
	provider: DynProvider,
	rpc_url: String,
}

impl AlloyProvider {
	/// Creates a provider for the given HTTP endpoint.
	///
	/// No request is made until the first call.
	pub fn new(rpc_url: &str) -> Result<Self, ProviderError> {
		let url: Url = rpc_url
			.parse()
			.map_err(|e| ProviderError::InvalidUrl(format!("{}: {}", rpc_url, e)))?;

		let provider = ProviderBuilder::new().connect_http(url).erased();
		tracing::debug!(rpc_url = %rpc_url, "Created HTTP provider");

		Ok(Self {
			provider,
			rpc_url: rpc_url.to_string(),
		})
	}

	/// Wraps an already configured Alloy provider.
	pub fn from_provider(provider: DynProvider, rpc_url: impl Into<String>) -> Self {
		Self {
			provider,
			rpc_url: rpc_url.into(),
		}
	}

	pub fn rpc_url(&self) -> &str {
		&self.rpc_url
	}
}

#[async_trait]
impl ProviderInterface for AlloyProvider {
	async fn chain_id(&self) -> Result<ChainId, ProviderError> {
		self.provider
			.get_chain_id()
			.await
			.map(ChainId)
			.map_err(|e| ProviderError::Network(format!("Failed to get chain id: {}", e)))
	}

	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
		let request = TransactionRequest::default().with_to(to).with_input(data);

		self.provider
			.call(request)
			.await
			.map_err(|e| ProviderError::CallFailed(e.to_string()))
	}

	async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, ProviderError> {
		let mut rpc_filter = Filter::new().from_block(filter.from_block);
		if let Some(to_block) = filter.to_block {
			rpc_filter = rpc_filter.to_block(to_block);
		}
		if let Some(address) = filter.address {
			rpc_filter = rpc_filter.address(address);
		}

		let logs = self
			.provider
			.get_logs(&rpc_filter)
			.await
			.map_err(|e| ProviderError::Network(format!("Failed to get logs: {}", e)))?;

		Ok(logs.iter().map(convert_log).collect())
	}

	async fn get_transaction_receipt(
		&self,
		hash: TransactionHash,
	) -> Result<Option<TransactionReceipt>, ProviderError> {
		let receipt = self
			.provider
			.get_transaction_receipt(hash)
			.await
			.map_err(|e| ProviderError::Network(format!("Failed to get receipt: {}", e)))?;

		Ok(receipt.as_ref().map(convert_receipt))
	}

	async fn get_block_number(&self) -> Result<BlockNumber, ProviderError> {
		self.provider
			.get_block_number()
			.await
			.map_err(|e| ProviderError::Network(format!("Failed to get block number: {}", e)))
	}
}

fn convert_log(log: &RpcLog) -> Log {
	Log {
		address: log.inner.address,
		topics: log.inner.data.topics().to_vec(),
		data: log.inner.data.data.clone(),
		log_index: log.log_index,
		block_number: log.block_number,
		transaction_hash: log.transaction_hash,
	}
}

fn convert_receipt(receipt: &RpcReceipt) -> TransactionReceipt {
	TransactionReceipt {
		transaction_hash: receipt.transaction_hash,
		block_number: receipt.block_number.unwrap_or(0),
		success: receipt.status(),
		logs: receipt.inner.logs().iter().map(convert_log).collect(),
	}
}

/// Factory function to create a read-only provider for an RPC endpoint.
pub fn create_provider(rpc_url: &str) -> Result<Arc<dyn ProviderInterface>, ProviderError> {
	Ok(Arc::new(AlloyProvider::new(rpc_url)?))
}
