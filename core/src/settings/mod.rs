//! The current settings model and the load pipeline that produces it from any historical blob:
//! detect the schema, walk the migration chain, then merge the result with the defaults.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use pa_utils::substitute;

use crate::{annotation::AnnotationSet, backup::Backup, error::Error};

pub mod detect;
mod lenient;
pub mod migrate;
pub mod schema;

use detect::{detect, Detection};
use migrate::NameSource;
use schema::{SchemaVersion, VersionedSettings};

/// Token replaced by the plugin's display name in every label template.
pub const PLUGIN_NAME_TOKEN: &str = "plugin_name";

pub const DEFAULT_LABEL_MOBILE: &str = "Annotation for ${plugin_name}:";
pub const DEFAULT_LABEL_DESKTOP: &str = "Personal annotation for ${plugin_name}:";
pub const DEFAULT_LABEL_PLACEHOLDER: &str =
	"Add your personal comment about ${plugin_name} here...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
	Mobile,
	Desktop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
	pub annotations: AnnotationSet,
	#[serde(
		rename = "plugins_annotations_uuid",
		serialize_with = "schema::serialize_marker"
	)]
	pub schema_marker: SchemaVersion,
	pub hide_placeholders: bool,
	pub delete_placeholder_string_on_insertion: bool,
	pub label_mobile: String,
	pub label_desktop: String,
	pub label_placeholder: String,
	/// Gate for every editing interaction.
	pub editable: bool,
	/// Prune orphaned annotations as soon as they are detected.
	pub automatic_remove: bool,
	/// Mirror of the annotations as a Markdown file, empty when disabled.
	pub markdown_file_path: String,
	pub compatibility: SchemaVersion,
	pub backups: Vec<Backup>,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			annotations: AnnotationSet::new(),
			schema_marker: SchemaVersion::LATEST,
			hide_placeholders: false,
			delete_placeholder_string_on_insertion: false,
			label_mobile: DEFAULT_LABEL_MOBILE.to_owned(),
			label_desktop: DEFAULT_LABEL_DESKTOP.to_owned(),
			label_placeholder: DEFAULT_LABEL_PLACEHOLDER.to_owned(),
			editable: true,
			automatic_remove: false,
			markdown_file_path: String::new(),
			compatibility: SchemaVersion::LATEST,
			backups: Vec::new(),
		}
	}
}

impl Settings {
	#[must_use]
	pub fn label(&self, platform: Platform, plugin_name: &str) -> String {
		let template = match platform {
			Platform::Mobile => &self.label_mobile,
			Platform::Desktop => &self.label_desktop,
		};

		substitute(template, PLUGIN_NAME_TOKEN, plugin_name)
	}

	#[must_use]
	pub fn placeholder(&self, plugin_name: &str) -> String {
		substitute(&self.label_placeholder, PLUGIN_NAME_TOKEN, plugin_name)
	}

	/// Independent copy of everything but the backups.
	#[must_use]
	pub fn snapshot(&self) -> SettingsSnapshot {
		self.clone().into()
	}

	pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
		serde_json::to_vec_pretty(self)
	}
}

/// Settings without backups, so backups can never nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsSnapshot {
	pub annotations: AnnotationSet,
	#[serde(
		rename = "plugins_annotations_uuid",
		serialize_with = "schema::serialize_marker"
	)]
	pub schema_marker: SchemaVersion,
	pub hide_placeholders: bool,
	pub delete_placeholder_string_on_insertion: bool,
	pub label_mobile: String,
	pub label_desktop: String,
	pub label_placeholder: String,
	pub editable: bool,
	pub automatic_remove: bool,
	pub markdown_file_path: String,
	pub compatibility: SchemaVersion,
}

impl From<Settings> for SettingsSnapshot {
	fn from(settings: Settings) -> Self {
		let Settings {
			annotations,
			schema_marker,
			hide_placeholders,
			delete_placeholder_string_on_insertion,
			label_mobile,
			label_desktop,
			label_placeholder,
			editable,
			automatic_remove,
			markdown_file_path,
			compatibility,
			backups: _,
		} = settings;

		Self {
			annotations,
			schema_marker,
			hide_placeholders,
			delete_placeholder_string_on_insertion,
			label_mobile,
			label_desktop,
			label_placeholder,
			editable,
			automatic_remove,
			markdown_file_path,
			compatibility,
		}
	}
}

impl SettingsSnapshot {
	#[must_use]
	pub fn into_settings(self, backups: Vec<Backup>) -> Settings {
		let Self {
			annotations,
			schema_marker,
			hide_placeholders,
			delete_placeholder_string_on_insertion,
			label_mobile,
			label_desktop,
			label_placeholder,
			editable,
			automatic_remove,
			markdown_file_path,
			compatibility,
		} = self;

		Settings {
			annotations,
			schema_marker,
			hide_placeholders,
			delete_placeholder_string_on_insertion,
			label_mobile,
			label_desktop,
			label_placeholder,
			editable,
			automatic_remove,
			markdown_file_path,
			compatibility,
			backups,
		}
	}
}

/// How a load went. Failures are absorbed into [`LoadOutcome::Reset`], never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
	/// Nothing was persisted yet.
	FreshStart,
	/// Already at the latest schema.
	Current,
	Upgraded { from: SchemaVersion },
	/// The persisted data was unusable and the defaults were used instead.
	Reset { reason: ResetReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetReason {
	InvalidJson(String),
	UnrecognizedFormat,
}

/// Loads persisted bytes, `None` meaning nothing was ever saved.
#[must_use]
pub fn load(raw: Option<&[u8]>, names: &dyn NameSource) -> (Settings, LoadOutcome) {
	let Some(raw) = raw.filter(|raw| !raw.iter().all(u8::is_ascii_whitespace)) else {
		return (Settings::default(), LoadOutcome::FreshStart);
	};

	match serde_json::from_slice(raw) {
		Ok(value) => load_value(value, names),
		Err(e) => {
			warn!(?e, "Persisted settings are not valid JSON, starting from defaults");
			(
				Settings::default(),
				LoadOutcome::Reset {
					reason: ResetReason::InvalidJson(e.to_string()),
				},
			)
		}
	}
}

/// Same as [`load`] for an already parsed blob.
#[must_use]
pub fn load_value(value: Value, names: &dyn NameSource) -> (Settings, LoadOutcome) {
	let version = match detect(&value) {
		Detection::Version(version) => version,
		Detection::Unrecognized => {
			warn!("Persisted settings match no known schema, starting from defaults");
			return (
				Settings::default(),
				LoadOutcome::Reset {
					reason: ResetReason::UnrecognizedFormat,
				},
			);
		}
	};

	let versioned = match VersionedSettings::parse(version, value) {
		Ok(versioned) => versioned,
		Err(e) => {
			warn!(?e, %version, "Failed to read persisted settings, starting from defaults");
			return (
				Settings::default(),
				LoadOutcome::Reset {
					reason: ResetReason::InvalidJson(e.to_string()),
				},
			);
		}
	};

	let settings = migrate::merge(
		migrate::upgrade(versioned, names),
		&Settings::default(),
		names,
	);

	let outcome = if version == SchemaVersion::LATEST {
		LoadOutcome::Current
	} else {
		LoadOutcome::Upgraded { from: version }
	};

	(settings, outcome)
}

/// Runs an externally supplied blob through the load pipeline and merges it onto `current`.
///
/// Unlike a load, a blob that can't be used is an error: importing is a deliberate action.
/// Backups are taken from `current` unless `restore_backups` is set.
pub fn import_onto(
	value: Value,
	current: &Settings,
	restore_backups: bool,
	names: &dyn NameSource,
) -> Result<Settings, Error> {
	match &value {
		Value::Object(_) | Value::Array(_) => {}
		Value::Null => return Err(Error::NotAnObject("null")),
		Value::Bool(_) => return Err(Error::NotAnObject("a boolean")),
		Value::Number(_) => return Err(Error::NotAnObject("a number")),
		Value::String(_) => return Err(Error::NotAnObject("a string")),
	}

	let Detection::Version(version) = detect(&value) else {
		return Err(Error::UnrecognizedImport);
	};

	let latest = migrate::upgrade(VersionedSettings::parse(version, value)?, names);
	let mut imported = migrate::merge(latest, current, names);

	if !restore_backups {
		imported.backups.clone_from(&current.backups);
	}

	Ok(imported)
}
