//! Point-in-time snapshots of the settings.
//!
//! A [`Backup`] owns a [`SettingsSnapshot`], a deep copy with no backups of its own, so editing
//! the live settings never reaches into a backup and backups never nest.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::settings::{Settings, SettingsSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backup {
	pub name: String,
	pub date: DateTime<Utc>,
	pub settings: SettingsSnapshot,
}

impl Backup {
	/// Only the label changes, the snapshot and date stay as captured.
	pub fn rename(&mut self, name: impl Into<String>) {
		self.name = name.into();
	}
}

/// Snapshots `current` and appends the backup to `backups`.
pub fn capture(name: impl Into<String>, current: &Settings, backups: &mut Vec<Backup>) -> Backup {
	let backup = Backup {
		name: name.into(),
		date: Utc::now(),
		settings: current.snapshot(),
	};

	backups.push(backup.clone());

	backup
}

/// Settings equal to the backup's snapshot, with `backups` as the backup list. Restoring never
/// rolls the backup list back.
#[must_use]
pub fn restore(backup: &Backup, backups: Vec<Backup>) -> Settings {
	backup.settings.clone().into_settings(backups)
}

/// Removes the first entry equal to `target`.
pub fn delete(backups: &mut Vec<Backup>, target: &Backup) -> Option<Backup> {
	backups
		.iter()
		.position(|backup| backup == target)
		.map(|idx| backups.remove(idx))
}

/// Most recent first. Storage keeps insertion order, this is only how backups are presented.
#[must_use]
pub fn sorted(backups: &[Backup]) -> Vec<&Backup> {
	let mut sorted = backups.iter().collect::<Vec<_>>();
	sorted.sort_by(|a, b| b.date.cmp(&a.date));
	sorted
}
