//! Every settings shape ever persisted, one module per schema.
//!
//! Each module owns a lenient, typed view of its schema and the single hop that lifts it to the
//! next one. Fields are `Option`s so that "absent" and "present but garbage" both collapse into
//! `None` and get resolved later by the terminal merge.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::settings::lenient;

pub mod v1_0_0;
pub mod v1_3_0;
pub mod v1_4_0;
pub mod v1_5_0;
pub mod v1_6_0;

/// Key under which every object schema since v1.3.0 stores its marker.
pub const MARKER_FIELD: &str = "plugins_annotations_uuid";

/// Historical settings schemas. Declaration order carries no meaning, see [`Self::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum SchemaVersion {
	/// Bare list of strings, no marker, no identifiers.
	#[strum(serialize = "1.0.0")]
	V1_0_0,
	#[strum(serialize = "1.3.0")]
	V1_3_0,
	#[strum(serialize = "1.4.0")]
	V1_4_0,
	#[strum(serialize = "1.5.0")]
	V1_5_0,
	#[strum(serialize = "1.6.0")]
	V1_6_0,
}

impl SchemaVersion {
	pub const LATEST: Self = Self::V1_6_0;

	/// Marked schemas, most specific first. Newer schemas are structural supersets of older
	/// ones, so they must be probed before them.
	pub const PROBE_ORDER: [Self; 4] = [Self::V1_6_0, Self::V1_5_0, Self::V1_4_0, Self::V1_3_0];

	/// On-disk marker of this schema. These values must never change.
	#[must_use]
	pub const fn marker(self) -> Option<&'static str> {
		match self {
			Self::V1_0_0 => None,
			Self::V1_3_0 => Some("FAA70013-38E9-4FDF-B06A-F899F6487C19"),
			Self::V1_4_0 => Some("C0D4A8F1-6D0B-4A4B-9F4E-2B1D3E7A5C60"),
			Self::V1_5_0 => Some("2E8F3B6A-91C4-4D7E-A0B5-7C6D5E4F3A21"),
			Self::V1_6_0 => Some("9B7D1E2C-4F3A-4C8B-B6D5-1A0E9F8C7B34"),
		}
	}

	#[must_use]
	pub fn from_marker(marker: &str) -> Option<Self> {
		Self::PROBE_ORDER
			.into_iter()
			.find(|version| version.marker() == Some(marker))
	}

	/// The migration chain. Hand maintained: markers carry no ordering.
	#[must_use]
	pub const fn next(self) -> Option<Self> {
		match self {
			Self::V1_0_0 => Some(Self::V1_3_0),
			Self::V1_3_0 => Some(Self::V1_4_0),
			Self::V1_4_0 => Some(Self::V1_5_0),
			Self::V1_5_0 => Some(Self::V1_6_0),
			Self::V1_6_0 => None,
		}
	}
}

impl Serialize for SchemaVersion {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for SchemaVersion {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let version = String::deserialize(deserializer)?;
		version.parse().map_err(de::Error::custom)
	}
}

/// Serializes a version as its marker instead of its version string.
pub(crate) fn serialize_marker<S: Serializer>(
	version: &SchemaVersion,
	serializer: S,
) -> Result<S::Ok, S::Error> {
	version.marker().serialize(serializer)
}

/// Fields shared by every object schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommonFields {
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub hide_placeholders: Option<bool>,
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub delete_placeholder_string_on_insertion: Option<bool>,
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub label_mobile: Option<String>,
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub label_desktop: Option<String>,
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub label_placeholder: Option<String>,
}

/// A blob that has been classified and read through its schema.
#[derive(Debug, Clone, PartialEq)]
pub enum VersionedSettings {
	V1_0_0(v1_0_0::Settings),
	V1_3_0(v1_3_0::Settings),
	V1_4_0(v1_4_0::Settings),
	V1_5_0(v1_5_0::Settings),
	V1_6_0(v1_6_0::Settings),
}

impl VersionedSettings {
	pub fn parse(version: SchemaVersion, value: Value) -> Result<Self, serde_json::Error> {
		Ok(match version {
			SchemaVersion::V1_0_0 => Self::V1_0_0(serde_json::from_value(value)?),
			SchemaVersion::V1_3_0 => Self::V1_3_0(serde_json::from_value(value)?),
			SchemaVersion::V1_4_0 => Self::V1_4_0(serde_json::from_value(value)?),
			SchemaVersion::V1_5_0 => Self::V1_5_0(serde_json::from_value(value)?),
			SchemaVersion::V1_6_0 => Self::V1_6_0(serde_json::from_value(value)?),
		})
	}

	#[must_use]
	pub const fn version(&self) -> SchemaVersion {
		match self {
			Self::V1_0_0(_) => SchemaVersion::V1_0_0,
			Self::V1_3_0(_) => SchemaVersion::V1_3_0,
			Self::V1_4_0(_) => SchemaVersion::V1_4_0,
			Self::V1_5_0(_) => SchemaVersion::V1_5_0,
			Self::V1_6_0(_) => SchemaVersion::V1_6_0,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn markers_are_unique_and_round_trip() {
		for version in SchemaVersion::PROBE_ORDER {
			let marker = version.marker().unwrap();
			assert_eq!(SchemaVersion::from_marker(marker), Some(version));
		}

		let mut markers = SchemaVersion::PROBE_ORDER.map(|v| v.marker().unwrap());
		markers.sort_unstable();
		assert!(markers.windows(2).all(|pair| pair[0] != pair[1]));

		assert_eq!(SchemaVersion::V1_0_0.marker(), None);
	}

	#[test]
	fn chain_reaches_latest_from_every_version() {
		for start in [SchemaVersion::V1_0_0, SchemaVersion::V1_3_0, SchemaVersion::V1_5_0] {
			let mut version = start;
			let mut hops = 0;
			while let Some(next) = version.next() {
				version = next;
				hops += 1;
				assert!(hops <= 4);
			}
			assert_eq!(version, SchemaVersion::LATEST);
		}
	}

	#[test]
	fn version_strings() {
		assert_eq!(SchemaVersion::V1_6_0.to_string(), "1.6.0");
		assert_eq!("1.4.0".parse::<SchemaVersion>().unwrap(), SchemaVersion::V1_4_0);
		assert_eq!(
			serde_json::to_value(SchemaVersion::V1_5_0).unwrap(),
			Value::String("1.5.0".into())
		);
	}
}
