//! The migration chain and the terminal merge.

use std::{collections::HashMap, hash::BuildHasher};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
	annotation::{Annotation, AnnotationSet, Identifier, UNKNOWN_NAME},
	backup::Backup,
	reconcile,
};

use super::{
	schema::{
		v1_6_0::{self, StoredBackup},
		SchemaVersion, VersionedSettings,
	},
	LoadOutcome, Settings,
};

/// Label given to stored backups that lost theirs.
pub const UNNAMED_BACKUP: &str = "Unnamed backup";

/// Where display names come from when a schema never stored them.
pub trait NameSource: Send + Sync {
	fn display_name(&self, id: &Identifier) -> Option<String>;
}

/// No names available, everything ends up [`UNKNOWN_NAME`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNames;

impl NameSource for NoNames {
	fn display_name(&self, _: &Identifier) -> Option<String> {
		None
	}
}

impl<S: BuildHasher + Send + Sync> NameSource for HashMap<Identifier, String, S> {
	fn display_name(&self, id: &Identifier) -> Option<String> {
		self.get(id).cloned()
	}
}

/// Applies one hop at a time until the latest schema is reached.
pub fn upgrade(mut settings: VersionedSettings, names: &dyn NameSource) -> v1_6_0::Settings {
	loop {
		let from = settings.version();

		settings = match settings {
			VersionedSettings::V1_0_0(legacy) => VersionedSettings::V1_3_0(legacy.upgrade()),
			VersionedSettings::V1_3_0(legacy) => VersionedSettings::V1_4_0(legacy.upgrade(names)),
			VersionedSettings::V1_4_0(legacy) => VersionedSettings::V1_5_0(legacy.upgrade()),
			VersionedSettings::V1_5_0(legacy) => VersionedSettings::V1_6_0(legacy.upgrade()),
			VersionedSettings::V1_6_0(latest) => return latest,
		};

		debug_assert_eq!(from.next(), Some(settings.version()));

		info!(%from, to = %settings.version(), "Running settings migrator");
	}
}

/// Resolves every field of a latest-schema blob against `base`: present and valid wins,
/// otherwise the value from `base` is kept.
///
/// Loading merges onto the defaults, imports merge onto the current settings.
#[must_use]
pub fn merge(latest: v1_6_0::Settings, base: &Settings, names: &dyn NameSource) -> Settings {
	let v1_6_0::Settings {
		annotations,
		common,
		editable,
		automatic_remove,
		markdown_file_path,
		backups,
	} = latest;

	Settings {
		annotations: annotations.map_or_else(|| base.annotations.clone(), into_annotation_set),
		schema_marker: SchemaVersion::LATEST,
		hide_placeholders: common.hide_placeholders.unwrap_or(base.hide_placeholders),
		delete_placeholder_string_on_insertion: common
			.delete_placeholder_string_on_insertion
			.unwrap_or(base.delete_placeholder_string_on_insertion),
		label_mobile: common
			.label_mobile
			.unwrap_or_else(|| base.label_mobile.clone()),
		label_desktop: common
			.label_desktop
			.unwrap_or_else(|| base.label_desktop.clone()),
		label_placeholder: common
			.label_placeholder
			.unwrap_or_else(|| base.label_placeholder.clone()),
		editable: editable.unwrap_or(base.editable),
		automatic_remove: automatic_remove.unwrap_or(base.automatic_remove),
		markdown_file_path: markdown_file_path.unwrap_or_else(|| base.markdown_file_path.clone()),
		compatibility: SchemaVersion::LATEST,
		backups: backups.map_or_else(
			|| base.backups.clone(),
			|stored| {
				stored
					.into_iter()
					.filter_map(|backup| restore_stored_backup(backup, names))
					.collect()
			},
		),
	}
}

fn into_annotation_set(annotations: IndexMap<Identifier, v1_6_0::Annotation>) -> AnnotationSet {
	let mut annotations = annotations
		.into_iter()
		.map(|(id, v1_6_0::Annotation { name, desc })| {
			let name = name
				.filter(|name| !name.trim().is_empty())
				.unwrap_or_else(|| UNKNOWN_NAME.to_owned());

			(id, Annotation::new(name, desc.unwrap_or_default()))
		})
		.collect::<AnnotationSet>();

	let dropped = reconcile::prune_empty(&mut annotations);
	if dropped > 0 {
		debug!(dropped, "Dropped empty annotations");
	}

	annotations
}

fn restore_stored_backup(stored: StoredBackup, names: &dyn NameSource) -> Option<Backup> {
	let StoredBackup {
		name,
		date,
		settings,
	} = stored;

	let Some(settings @ Value::Object(_)) = settings else {
		warn!(?name, "Skipping stored backup without settings");
		return None;
	};

	match super::load_value(settings, names) {
		(_, LoadOutcome::Reset { reason }) => {
			warn!(?name, ?reason, "Skipping stored backup with unreadable settings");
			None
		}
		(settings, _) => Some(Backup {
			name: name.unwrap_or_else(|| UNNAMED_BACKUP.to_owned()),
			date: date.unwrap_or_default(),
			settings: settings.into(),
		}),
	}
}
