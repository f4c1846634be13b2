//! Tolerant decoding of receipt logs into structured events.
//!
//! Each log is matched against an ordered list of candidate interfaces.
//! The first candidate that decodes it wins; logs nobody recognises are
//! dropped. Decoding one log never affects its siblings.

use alloy::dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy::json_abi::{Event, JsonAbi};
use std::sync::Arc;
use vault_types::{Address, Log};

/// An interface the decoder may match logs against.
#[derive(Debug, Clone)]
pub struct EventCandidate {
	/// Label reported on decoded events, usually the contract name.
	pub label: String,
	pub abi: Arc<JsonAbi>,
	/// When set, only logs emitted from this address match.
	pub emitter: Option<Address>,
}

impl EventCandidate {
	pub fn new(label: impl Into<String>, abi: Arc<JsonAbi>) -> Self {
		Self {
			label: label.into(),
			abi,
			emitter: None,
		}
	}

	pub fn with_emitter(mut self, emitter: Address) -> Self {
		self.emitter = Some(emitter);
		self
	}
}

/// One decoded event argument, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct EventArgument {
	pub name: String,
	pub indexed: bool,
	/// Indexed arguments of dynamic type only expose their topic hash.
	pub value: DynSolValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
	/// Label of the candidate that matched.
	pub contract: String,
	pub name: String,
	pub signature: String,
	pub address: Address,
	pub log_index: Option<u64>,
	pub arguments: Vec<EventArgument>,
}

impl DecodedEvent {
	pub fn argument(&self, name: &str) -> Option<&DynSolValue> {
		self.arguments
			.iter()
			.find(|arg| arg.name == name)
			.map(|arg| &arg.value)
	}

	/// Positional access, matching the event's declaration order.
	pub fn value(&self, index: usize) -> Option<&DynSolValue> {
		self.arguments.get(index).map(|arg| &arg.value)
	}
}

/// Decodes logs against candidates in priority order.
#[derive(Debug, Clone, Default)]
pub struct EventDecoder {
	candidates: Vec<EventCandidate>,
}

impl EventDecoder {
	pub fn new(candidates: Vec<EventCandidate>) -> Self {
		Self { candidates }
	}

	pub fn candidates(&self) -> &[EventCandidate] {
		&self.candidates
	}

	/// Decodes every log some candidate recognises, preserving log order.
	pub fn decode(&self, logs: &[Log]) -> Vec<DecodedEvent> {
		logs.iter().filter_map(|log| self.decode_log(log)).collect()
	}

	pub fn decode_log(&self, log: &Log) -> Option<DecodedEvent> {
		self.candidates
			.iter()
			.find_map(|candidate| decode_with(candidate, log))
	}
}

fn decode_with(candidate: &EventCandidate, log: &Log) -> Option<DecodedEvent> {
	if candidate.emitter.is_some_and(|emitter| emitter != log.address) {
		return None;
	}

	let topic0 = log.topics.first()?;

	candidate
		.abi
		.events()
		.filter(|event| !event.anonymous && event.selector() == *topic0)
		.find_map(|event| {
			let arguments = decode_arguments(event, log)?;
			Some(DecodedEvent {
				contract: candidate.label.clone(),
				name: event.name.clone(),
				signature: event.signature(),
				address: log.address,
				log_index: log.log_index,
				arguments,
			})
		})
}

fn decode_arguments(event: &Event, log: &Log) -> Option<Vec<EventArgument>> {
	let indexed_count = event.inputs.iter().filter(|param| param.indexed).count();
	if log.topics.len() != indexed_count + 1 {
		return None;
	}

	let body_types = event
		.inputs
		.iter()
		.filter(|param| !param.indexed)
		.map(|param| param.resolve().ok())
		.collect::<Option<Vec<DynSolType>>>()?;

	let body = match DynSolType::Tuple(body_types).abi_decode_params(&log.data).ok()? {
		DynSolValue::Tuple(values) => values,
		_ => return None,
	};

	let mut topics = log.topics[1..].iter();
	let mut body = body.into_iter();
	let mut arguments = Vec::with_capacity(event.inputs.len());

	for param in &event.inputs {
		let value = if param.indexed {
			let ty = param.resolve().ok()?;
			let topic = topics.next()?;
			decode_topic(&ty, topic.as_slice())?
		} else {
			body.next()?
		};

		arguments.push(EventArgument {
			name: param.name.clone(),
			indexed: param.indexed,
			value,
		});
	}

	Some(arguments)
}

/// Value types are stored in the topic as-is; everything else is hashed.
fn decode_topic(ty: &DynSolType, topic: &[u8]) -> Option<DynSolValue> {
	match ty {
		DynSolType::Bool
		| DynSolType::Int(_)
		| DynSolType::Uint(_)
		| DynSolType::FixedBytes(_)
		| DynSolType::Address => ty.abi_decode(topic).ok(),
		_ => Some(DynSolValue::FixedBytes(
			alloy::primitives::B256::from_slice(topic),
			32,
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::artifacts;
	use crate::{BATCH_EXECUTOR, POSITION_VAULT, VAULT_FACTORY};
	use alloy::primitives::{keccak256, B256};
	use vault_types::{Bytes, U256};

	fn abi(name: &str) -> Arc<JsonAbi> {
		Arc::new(artifacts()[name].abi.clone())
	}

	fn vault_executed(emitter: Address, target: Address, data: &[u8], success: bool) -> Log {
		let topic0 = keccak256("TransactionExecuted(address,bytes,bool)");
		let body = DynSolValue::Tuple(vec![
			DynSolValue::Bytes(data.to_vec()),
			DynSolValue::Bool(success),
		])
		.abi_encode_params();
		Log::new(emitter, vec![topic0, target.into_word()], Bytes::from(body))
	}

	fn batch_executed(emitter: Address, target: Address, success: bool, ret: &[u8]) -> Log {
		let topic0 = keccak256("TransactionExecuted(address,bytes,bool,bytes)");
		let body = DynSolValue::Tuple(vec![
			DynSolValue::Bytes(vec![]),
			DynSolValue::Bool(success),
			DynSolValue::Bytes(ret.to_vec()),
		])
		.abi_encode_params();
		Log::new(emitter, vec![topic0, target.into_word()], Bytes::from(body))
	}

	fn transfer_log(emitter: Address) -> Log {
		let topic0 = keccak256("Transfer(address,address,uint256)");
		Log::new(
			emitter,
			vec![topic0, B256::ZERO, B256::ZERO],
			Bytes::from(U256::from(1u64).to_be_bytes::<32>().to_vec()),
		)
	}

	#[test]
	fn test_decodes_matching_logs_and_drops_others() {
		let vault = Address::repeat_byte(0x10);
		let decoder = EventDecoder::new(vec![EventCandidate::new(POSITION_VAULT, abi(POSITION_VAULT))]);

		let logs = vec![
			transfer_log(Address::repeat_byte(0x99)),
			vault_executed(vault, Address::repeat_byte(1), &[0xab], true),
			Log::new(vault, vec![], Bytes::new()),
			vault_executed(vault, Address::repeat_byte(2), &[], false),
		];

		let events = decoder.decode(&logs);
		assert_eq!(events.len(), 2);

		assert_eq!(events[0].contract, POSITION_VAULT);
		assert_eq!(events[0].name, "TransactionExecuted");
		assert_eq!(events[0].signature, "TransactionExecuted(address,bytes,bool)");
		assert_eq!(
			events[0].argument("target"),
			Some(&DynSolValue::Address(Address::repeat_byte(1)))
		);
		assert_eq!(
			events[0].argument("data"),
			Some(&DynSolValue::Bytes(vec![0xab]))
		);
		assert_eq!(events[0].value(2), Some(&DynSolValue::Bool(true)));
		assert_eq!(events[1].value(2), Some(&DynSolValue::Bool(false)));
	}

	#[test]
	fn test_preserves_log_order() {
		let vault = Address::repeat_byte(0x10);
		let decoder = EventDecoder::new(vec![EventCandidate::new(POSITION_VAULT, abi(POSITION_VAULT))]);

		let logs: Vec<Log> = (1u8..=5)
			.map(|i| vault_executed(vault, Address::repeat_byte(i), &[i], i % 2 == 0))
			.collect();

		let targets: Vec<DynSolValue> = decoder
			.decode(&logs)
			.into_iter()
			.filter_map(|event| event.argument("target").cloned())
			.collect();

		let expected: Vec<DynSolValue> = (1u8..=5)
			.map(|i| DynSolValue::Address(Address::repeat_byte(i)))
			.collect();
		assert_eq!(targets, expected);
	}

	#[test]
	fn test_first_candidate_wins() {
		let vault = Address::repeat_byte(0x10);
		let log = vault_executed(vault, Address::repeat_byte(1), &[], true);

		let decoder = EventDecoder::new(vec![
			EventCandidate::new("first", abi(POSITION_VAULT)),
			EventCandidate::new("second", abi(POSITION_VAULT)),
		]);

		let events = decoder.decode(std::slice::from_ref(&log));
		assert_eq!(events.len(), 1);
		assert_eq!(events[0].contract, "first");
	}

	#[test]
	fn test_candidates_with_same_event_name_are_told_apart() {
		let vault = Address::repeat_byte(0x10);
		let executor = Address::repeat_byte(0x20);

		let decoder = EventDecoder::new(vec![
			EventCandidate::new(POSITION_VAULT, abi(POSITION_VAULT)),
			EventCandidate::new(BATCH_EXECUTOR, abi(BATCH_EXECUTOR)),
		]);

		let logs = vec![
			batch_executed(executor, Address::repeat_byte(3), true, &[0x01, 0x02]),
			vault_executed(vault, Address::repeat_byte(4), &[], true),
		];

		let events = decoder.decode(&logs);
		assert_eq!(events.len(), 2);
		assert_eq!(events[0].contract, BATCH_EXECUTOR);
		assert_eq!(
			events[0].argument("returnData"),
			Some(&DynSolValue::Bytes(vec![0x01, 0x02]))
		);
		assert_eq!(events[1].contract, POSITION_VAULT);
	}

	#[test]
	fn test_emitter_filter() {
		let vault = Address::repeat_byte(0x10);
		let other = Address::repeat_byte(0x11);

		let decoder = EventDecoder::new(vec![
			EventCandidate::new(POSITION_VAULT, abi(POSITION_VAULT)).with_emitter(vault),
		]);

		let logs = vec![
			vault_executed(other, Address::repeat_byte(1), &[], true),
			vault_executed(vault, Address::repeat_byte(2), &[], true),
		];

		let events = decoder.decode(&logs);
		assert_eq!(events.len(), 1);
		assert_eq!(events[0].address, vault);
	}

	#[test]
	fn test_malformed_payload_does_not_abort_siblings() {
		let vault = Address::repeat_byte(0x10);
		let decoder = EventDecoder::new(vec![EventCandidate::new(POSITION_VAULT, abi(POSITION_VAULT))]);

		let mut truncated = vault_executed(vault, Address::repeat_byte(1), &[1, 2, 3], true);
		truncated.data = Bytes::from(truncated.data[..16].to_vec());

		let mut extra_topic = vault_executed(vault, Address::repeat_byte(2), &[], true);
		extra_topic.topics.push(B256::ZERO);

		let logs = vec![
			truncated,
			extra_topic,
			vault_executed(vault, Address::repeat_byte(3), &[], true),
		];

		let events = decoder.decode(&logs);
		assert_eq!(events.len(), 1);
		assert_eq!(
			events[0].argument("target"),
			Some(&DynSolValue::Address(Address::repeat_byte(3)))
		);
	}

	#[test]
	fn test_decoding_is_idempotent() {
		let vault = Address::repeat_byte(0x10);
		let decoder = EventDecoder::new(vec![
			EventCandidate::new(POSITION_VAULT, abi(POSITION_VAULT)),
			EventCandidate::new(VAULT_FACTORY, abi(VAULT_FACTORY)),
		]);

		let logs = vec![
			vault_executed(vault, Address::repeat_byte(1), &[7], true),
			transfer_log(vault),
		];

		assert_eq!(decoder.decode(&logs), decoder.decode(&logs));
	}

	#[test]
	fn test_indexed_arguments_and_string_body() {
		let factory = Address::repeat_byte(0xfa);
		let owner = Address::repeat_byte(0x01);
		let vault = Address::repeat_byte(0x02);

		let body = DynSolValue::Tuple(vec![DynSolValue::String("Main".to_string())]).abi_encode_params();
		let log = Log::new(
			factory,
			vec![
				keccak256("VaultCreated(address,address,string)"),
				owner.into_word(),
				vault.into_word(),
			],
			Bytes::from(body),
		);

		let decoder = EventDecoder::new(vec![EventCandidate::new(VAULT_FACTORY, abi(VAULT_FACTORY))]);
		let events = decoder.decode(&[log]);

		assert_eq!(events.len(), 1);
		let event = &events[0];
		assert_eq!(event.value(0), Some(&DynSolValue::Address(owner)));
		assert_eq!(event.value(1), Some(&DynSolValue::Address(vault)));
		assert_eq!(event.value(2), Some(&DynSolValue::String("Main".to_string())));
		assert!(event.arguments[0].indexed);
		assert!(!event.arguments[2].indexed);
	}

	#[test]
	fn test_no_candidates_decodes_nothing() {
		let decoder = EventDecoder::default();
		let logs = vec![vault_executed(Address::ZERO, Address::ZERO, &[], true)];
		assert!(decoder.decode(&logs).is_empty());
	}
}
