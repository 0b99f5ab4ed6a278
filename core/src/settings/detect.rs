use serde_json::Value;

use super::schema::{SchemaVersion, MARKER_FIELD};

/// What a raw blob turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
	Version(SchemaVersion),
	Unrecognized,
}

/// Classifies a deserialized blob. Never fails: missing fields only count as evidence against a
/// schema.
///
/// Markers are checked before shapes since newer schemas also look like older ones.
#[must_use]
pub fn detect(value: &Value) -> Detection {
	let map = match value {
		Value::Array(_) => return Detection::Version(SchemaVersion::V1_0_0),
		Value::Object(map) => map,
		_ => return Detection::Unrecognized,
	};

	if let Some(version) = map
		.get(MARKER_FIELD)
		.and_then(Value::as_str)
		.and_then(SchemaVersion::from_marker)
	{
		return Detection::Version(version);
	}

	// Files written before markers existed
	match map.get("annotations") {
		Some(Value::Object(annotations)) if annotations.values().all(Value::is_string) => {
			Detection::Version(SchemaVersion::V1_3_0)
		}
		_ => Detection::Unrecognized,
	}
}
