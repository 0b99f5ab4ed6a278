//! The current schema: `{ name, desc }` annotations, backups and the remaining policy toggles.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::{annotation::Identifier, settings::lenient};

use super::CommonFields;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Annotation {
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub name: Option<String>,
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub desc: Option<String>,
}

/// A backup as found on disk. Its settings are kept raw, they go through the whole load
/// pipeline again since nothing guarantees which schema wrote them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StoredBackup {
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub name: Option<String>,
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub date: Option<DateTime<Utc>>,
	#[serde(default)]
	pub settings: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Settings {
	#[serde(default, deserialize_with = "lenient::entries")]
	pub annotations: Option<IndexMap<Identifier, Annotation>>,
	#[serde(flatten)]
	pub common: CommonFields,
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub editable: Option<bool>,
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub automatic_remove: Option<bool>,
	#[serde(default, deserialize_with = "lenient::or_none")]
	pub markdown_file_path: Option<String>,
	#[serde(default, deserialize_with = "lenient::items")]
	pub backups: Option<Vec<StoredBackup>>,
}
