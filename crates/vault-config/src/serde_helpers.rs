//! Serde helpers for chain-id keyed maps.
//!
//! TOML and JSON object keys are always strings, so maps keyed by
//! [`ChainId`] go through these helpers to parse and print the numeric ids.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use vault_types::ChainId;

/// Deserializes `HashMap<ChainId, T>` from a map with string keys.
pub fn deserialize_chain_id_map<'de, D, T>(
	deserializer: D,
) -> Result<HashMap<ChainId, T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	let map = HashMap::<String, T>::deserialize(deserializer)?;

	map.into_iter()
		.map(|(k, v)| {
			k.parse::<ChainId>()
				.map(|id| (id, v))
				.map_err(|_| serde::de::Error::custom(format!("Invalid chain ID: {}", k)))
		})
		.collect()
}

/// Serializes `HashMap<ChainId, T>` with the ids converted to string keys.
pub fn serialize_chain_id_map<S, T>(
	map: &HashMap<ChainId, T>,
	serializer: S,
) -> Result<S::Ok, S::Error>
where
	S: Serializer,
	T: Serialize,
{
	let string_map: HashMap<String, &T> = map.iter().map(|(k, v)| (k.to_string(), v)).collect();

	string_map.serialize(serializer)
}
