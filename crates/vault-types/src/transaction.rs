//! Transaction shapes handed to the orchestrator and to signers.

use crate::chains::ChainId;
use crate::common::{Address, Bytes, U256};
use thiserror::Error;

/// Errors raised while validating a call request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
	/// The request carries no calls.
	#[error("Request contains no calls")]
	Empty,
	/// Summing native values exceeded 256 bits.
	#[error("Aggregate native value overflows at call {index}")]
	ValueOverflow { index: usize },
	/// A call carries native value where the entry point cannot forward it.
	#[error("Call {index} carries native value {value} but the entry point accepts none")]
	UnexpectedValue { index: usize, value: U256 },
}

/// One logical call inside a batch: target, calldata and native value in wei.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
	pub target: Address,
	pub data: Bytes,
	pub value: U256,
}

impl Call {
	/// Creates a call that forwards no native value.
	pub fn new(target: Address, data: impl Into<Bytes>) -> Self {
		Self {
			target,
			data: data.into(),
			value: U256::ZERO,
		}
	}

	/// Sets the native value forwarded with this call.
	pub fn with_value(mut self, value: U256) -> Self {
		self.value = value;
		self
	}
}

/// Ordered list of calls submitted as a single on-chain transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRequest {
	pub calls: Vec<Call>,
}

impl TransactionRequest {
	pub fn new(calls: Vec<Call>) -> Self {
		Self { calls }
	}

	pub fn push(&mut self, call: Call) {
		self.calls.push(call);
	}

	pub fn len(&self) -> usize {
		self.calls.len()
	}

	pub fn is_empty(&self) -> bool {
		self.calls.is_empty()
	}

	pub fn targets(&self) -> Vec<Address> {
		self.calls.iter().map(|call| call.target).collect()
	}

	pub fn call_data(&self) -> Vec<Bytes> {
		self.calls.iter().map(|call| call.data.clone()).collect()
	}

	pub fn values(&self) -> Vec<U256> {
		self.calls.iter().map(|call| call.value).collect()
	}

	/// Exact sum of every call's native value.
	///
	/// Uses checked 256-bit integer addition; a sum that does not fit is an
	/// error rather than a wrapped value.
	pub fn total_value(&self) -> Result<U256, RequestError> {
		self.calls
			.iter()
			.enumerate()
			.try_fold(U256::ZERO, |sum, (index, call)| {
				sum.checked_add(call.value)
					.ok_or(RequestError::ValueOverflow { index })
			})
	}

	/// Rejects the request unless it has at least one call.
	pub fn ensure_not_empty(&self) -> Result<(), RequestError> {
		if self.calls.is_empty() {
			return Err(RequestError::Empty);
		}
		Ok(())
	}

	/// Rejects the request if any call forwards native value.
	pub fn ensure_no_value(&self) -> Result<(), RequestError> {
		match self
			.calls
			.iter()
			.enumerate()
			.find(|(_, call)| !call.value.is_zero())
		{
			Some((index, call)) => Err(RequestError::UnexpectedValue {
				index,
				value: call.value,
			}),
			None => Ok(()),
		}
	}
}

impl FromIterator<Call> for TransactionRequest {
	fn from_iter<I: IntoIterator<Item = Call>>(iter: I) -> Self {
		Self {
			calls: iter.into_iter().collect(),
		}
	}
}

/// A single transaction ready to be signed and submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
	/// Recipient contract.
	pub to: Address,
	/// Transaction calldata.
	pub data: Bytes,
	/// Value to transfer in native currency (wei).
	pub value: U256,
	/// Chain ID for replay protection.
	pub chain_id: ChainId,
	/// Gas limit; filled by the signer's provider when absent.
	pub gas_limit: Option<u64>,
}
