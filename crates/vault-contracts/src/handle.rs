//! Connected contract handles.

use crate::decoder::EventCandidate;
use crate::resolver::ContractDescriptor;
use crate::{Connection, ContractError};
use alloy::dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy::json_abi::{Function, JsonAbi, Param};
use std::sync::Arc;
use vault_types::{Address, Bytes, ChainId, Transaction, U256};

/// A contract interface bound to an address and a connection.
///
/// Handles are cheap to clone and are produced fresh by every resolution.
#[derive(Debug, Clone)]
pub struct ContractHandle {
	address: Address,
	chain_id: ChainId,
	descriptor: Arc<ContractDescriptor>,
	connection: Connection,
}

impl ContractHandle {
	pub fn new(
		address: Address,
		chain_id: ChainId,
		descriptor: Arc<ContractDescriptor>,
		connection: Connection,
	) -> Self {
		Self {
			address,
			chain_id,
			descriptor,
			connection,
		}
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn chain_id(&self) -> ChainId {
		self.chain_id
	}

	pub fn name(&self) -> &str {
		&self.descriptor.name
	}

	pub fn abi(&self) -> &JsonAbi {
		&self.descriptor.abi
	}

	pub fn connection(&self) -> &Connection {
		&self.connection
	}

	/// Decoder candidate for events emitted by this exact contract.
	pub fn event_candidate(&self) -> EventCandidate {
		EventCandidate::new(self.name(), self.descriptor.abi.clone()).with_emitter(self.address)
	}

	/// Finds the function overload taking `arg_count` arguments.
	fn function(&self, name: &str, arg_count: usize) -> Result<&Function, ContractError> {
		self.descriptor
			.abi
			.function(name)
			.and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arg_count))
			.ok_or_else(|| ContractError::UnknownFunction {
				contract: self.descriptor.name.clone(),
				function: name.to_string(),
			})
	}

	/// ABI-encodes a call: 4-byte selector followed by the encoded arguments.
	pub fn encode_call(&self, function: &str, args: &[DynSolValue]) -> Result<Bytes, ContractError> {
		let function = self.function(function, args.len())?;

		let types = resolve_types(&function.inputs)?;
		for (index, (ty, value)) in types.iter().zip(args).enumerate() {
			if !ty.matches(value) {
				return Err(ContractError::Encoding(format!(
					"argument {} of {} does not match type {}",
					index,
					function.name,
					ty.sol_type_name()
				)));
			}
		}

		let mut data = function.selector().to_vec();
		data.extend(DynSolValue::Tuple(args.to_vec()).abi_encode_params());
		Ok(Bytes::from(data))
	}

	/// Performs a read-only call and decodes the outputs.
	pub async fn call(
		&self,
		function: &str,
		args: &[DynSolValue],
	) -> Result<Vec<DynSolValue>, ContractError> {
		let provider = self
			.connection
			.provider()
			.ok_or(ContractError::MissingProvider)?;

		let data = self.encode_call(function, args)?;
		let output = provider.call(self.address, data).await?;

		let outputs = &self.function(function, args.len())?.outputs;
		decode_outputs(outputs, &output)
	}

	/// Builds the transaction for a state-changing call without sending it.
	pub fn transaction(
		&self,
		function: &str,
		args: &[DynSolValue],
		value: U256,
	) -> Result<Transaction, ContractError> {
		Ok(Transaction {
			to: self.address,
			data: self.encode_call(function, args)?,
			value,
			chain_id: self.chain_id,
			gas_limit: None,
		})
	}
}

fn resolve_types(params: &[Param]) -> Result<Vec<DynSolType>, ContractError> {
	params
		.iter()
		.map(|param| {
			param
				.resolve()
				.map_err(|e| ContractError::Encoding(format!("{}: {}", param.ty, e)))
		})
		.collect()
}

fn decode_outputs(params: &[Param], data: &[u8]) -> Result<Vec<DynSolValue>, ContractError> {
	let types = resolve_types(params).map_err(|e| ContractError::Decoding(e.to_string()))?;

	let decoded = DynSolType::Tuple(types)
		.abi_decode_params(data)
		.map_err(|e| ContractError::Decoding(e.to_string()))?;

	match decoded {
		DynSolValue::Tuple(values) => Ok(values),
		other => Ok(vec![other]),
	}
}
