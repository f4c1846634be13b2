//! Local private key wallet.
//!
//! Keys are held in memory and transactions are signed by Alloy's local
//! signer before being sent through the bound HTTP provider.

use crate::{AccountError, AccountInterface};
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use std::sync::Arc;
use vault_provider::{AlloyProvider, ProviderInterface};
use vault_types::{truncate_hash, Address, Transaction, TransactionHash};

/// Local wallet implementation using Alloy's signer.
pub struct LocalWallet {
	signer: PrivateKeySigner,
	/// Signing provider used for submission, present when connected.
	sender: Option<DynProvider>,
	/// Read view over the same connection.
	binding: Option<Arc<dyn ProviderInterface>>,
}

impl LocalWallet {
	/// Creates an offline wallet from a hex-encoded private key
	/// (with or without 0x prefix).
	pub fn new(private_key_hex: &str) -> Result<Self, AccountError> {
		Ok(Self {
			signer: parse_signer(private_key_hex)?,
			sender: None,
			binding: None,
		})
	}

	/// Creates a wallet bound to an HTTP endpoint.
	pub fn connect(private_key_hex: &str, rpc_url: &str) -> Result<Self, AccountError> {
		let signer = parse_signer(private_key_hex)?;
		let url: Url = rpc_url
			.parse()
			.map_err(|e| AccountError::Provider(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;

		let provider = ProviderBuilder::new()
			.wallet(EthereumWallet::from(signer.clone()))
			.connect_http(url)
			.erased();

		let binding: Arc<dyn ProviderInterface> =
			Arc::new(AlloyProvider::from_provider(provider.clone(), rpc_url));

		tracing::debug!(
			address = %signer.address(),
			rpc_url = %rpc_url,
			"Connected local wallet"
		);

		Ok(Self {
			signer,
			sender: Some(provider),
			binding: Some(binding),
		})
	}

	pub fn is_connected(&self) -> bool {
		self.sender.is_some()
	}
}

fn parse_signer(private_key_hex: &str) -> Result<PrivateKeySigner, AccountError> {
	private_key_hex
		.trim()
		.parse::<PrivateKeySigner>()
		.map_err(|e| AccountError::InvalidKey(format!("Invalid private key: {}", e)))
}

#[async_trait]
impl AccountInterface for LocalWallet {
	fn address(&self) -> Address {
		self.signer.address()
	}

	fn provider(&self) -> Option<Arc<dyn ProviderInterface>> {
		self.binding.clone()
	}

	async fn send_transaction(&self, tx: &Transaction) -> Result<TransactionHash, AccountError> {
		let sender = self.sender.as_ref().ok_or(AccountError::NoProvider)?;

		let mut request = TransactionRequest::default()
			.with_to(tx.to)
			.with_input(tx.data.clone())
			.with_value(tx.value)
			.with_chain_id(tx.chain_id.0);
		if let Some(gas_limit) = tx.gas_limit {
			request = request.with_gas_limit(gas_limit);
		}

		let pending = sender
			.send_transaction(request)
			.await
			.map_err(|e| AccountError::SendFailed(e.to_string()))?;

		let tx_hash = *pending.tx_hash();
		tracing::info!(
			tx_hash = %truncate_hash(&tx_hash),
			chain_id = %tx.chain_id,
			"Submitted transaction"
		);

		Ok(tx_hash)
	}
}
