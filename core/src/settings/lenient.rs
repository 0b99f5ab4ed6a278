//! Deserializers that never fail on bad data, they just drop it.

use std::hash::Hash;

use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

/// `Some` if the value has the expected type, `None` otherwise.
pub fn or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	let value = Value::deserialize(deserializer)?;
	Ok(serde_json::from_value(value).ok())
}

/// A keyed record, keeping only the entries whose value has the expected type.
/// Anything that isn't a record at all is `None`.
pub fn entries<'de, D, K, T>(deserializer: D) -> Result<Option<IndexMap<K, T>>, D::Error>
where
	D: Deserializer<'de>,
	K: From<String> + Hash + Eq,
	T: DeserializeOwned,
{
	Ok(match Value::deserialize(deserializer)? {
		Value::Object(map) => Some(
			map.into_iter()
				.filter_map(|(key, value)| {
					serde_json::from_value(value)
						.ok()
						.map(|value| (K::from(key), value))
				})
				.collect(),
		),
		_ => None,
	})
}

/// A list, keeping only the items with the expected type.
/// Anything that isn't a list at all is `None`.
pub fn items<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	Ok(match Value::deserialize(deserializer)? {
		Value::Array(values) => Some(
			values
				.into_iter()
				.filter_map(|value| serde_json::from_value(value).ok())
				.collect(),
		),
		_ => None,
	})
}

/// A list where every position is kept, with `None` standing in for mistyped items.
pub fn positional<'de, D, T>(deserializer: D) -> Result<Vec<Option<T>>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	Ok(match Value::deserialize(deserializer)? {
		Value::Array(values) => values
			.into_iter()
			.map(|value| serde_json::from_value(value).ok())
			.collect(),
		_ => Vec::new(),
	})
}
