//! Owns the live settings: loads them once, hands out copies, applies mutations under a lock and
//! persists through a debounced [`SaveQueue`].
//!
//! The in-memory settings are authoritative. A failed write is reported (or logged for debounced
//! saves) but never rolls the settings back, the next save simply tries again with newer data.

use std::{
	path::{Component, Path, PathBuf},
	sync::Arc,
	time::Duration,
};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
	annotation::{Annotation, AnnotationSet, Identifier, UNKNOWN_NAME},
	backup::{self, Backup},
	editor::Commit,
	error::Error,
	export,
	reconcile::{self, LiveIdentifiers, Reconciliation},
	settings::{self, import_onto, migrate::NameSource, LoadOutcome, Settings},
	storage::ByteStorage,
};

mod save_queue;

use save_queue::{PendingWrite, SaveQueue};

pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
	pub settings_path: PathBuf,
	/// Relative `markdown_file_path` values are resolved against this directory.
	pub markdown_root: PathBuf,
	pub save_delay: Duration,
}

impl StoreConfig {
	pub fn new(settings_path: impl Into<PathBuf>) -> Self {
		let settings_path = settings_path.into();
		let markdown_root = settings_path
			.parent()
			.map(Path::to_path_buf)
			.unwrap_or_default();

		Self {
			settings_path,
			markdown_root,
			save_delay: DEFAULT_SAVE_DELAY,
		}
	}

	#[must_use]
	pub fn with_markdown_root(mut self, markdown_root: impl Into<PathBuf>) -> Self {
		self.markdown_root = markdown_root.into();
		self
	}

	#[must_use]
	pub const fn with_save_delay(mut self, save_delay: Duration) -> Self {
		self.save_delay = save_delay;
		self
	}

	/// Only relative paths that stay below `markdown_root` are accepted, anything else disables
	/// the mirror.
	fn markdown_path(&self, markdown_file_path: &str) -> Option<PathBuf> {
		let markdown_file_path = Path::new(markdown_file_path.trim());
		if markdown_file_path.as_os_str().is_empty() {
			return None;
		}

		let stays_inside = markdown_file_path
			.components()
			.all(|component| matches!(component, Component::Normal(_) | Component::CurDir));

		if !stays_inside {
			warn!(
				path = %markdown_file_path.display(),
				"Markdown file path points outside the vault, not writing the mirror"
			);
			return None;
		}

		Some(self.markdown_root.join(markdown_file_path))
	}

	/// The settings file plus its Markdown mirror when one is configured.
	fn save_payload(&self, settings: &Settings) -> Result<Vec<PendingWrite>, Error> {
		let mut payload = vec![PendingWrite {
			path: self.settings_path.clone(),
			bytes: settings.to_json()?,
		}];

		if let Some(path) = self.markdown_path(&settings.markdown_file_path) {
			payload.push(PendingWrite {
				path,
				bytes: export::render_markdown(&settings.annotations).into_bytes(),
			});
		}

		Ok(payload)
	}
}

pub struct SettingsStore {
	settings: RwLock<Settings>,
	config: StoreConfig,
	save_queue: SaveQueue,
}

impl SettingsStore {
	/// Reads the persisted settings and upgrades them to the latest schema.
	///
	/// Unusable data never fails a load, it resets to the defaults and says so in the returned
	/// [`LoadOutcome`]. Storage that can't be read at all is an error, so an existing file is
	/// never overwritten with defaults by accident. A reset file stays untouched until the next
	/// mutation.
	pub async fn load(
		storage: Arc<dyn ByteStorage>,
		config: StoreConfig,
		names: &dyn NameSource,
	) -> Result<(Arc<Self>, LoadOutcome), Error> {
		let raw = storage.read(&config.settings_path).await?;
		let (settings, outcome) = settings::load(raw.as_deref(), names);

		match &outcome {
			LoadOutcome::FreshStart => info!("No settings found, starting from defaults"),
			LoadOutcome::Current => debug!("Loaded settings"),
			LoadOutcome::Upgraded { from } => info!(%from, "Upgraded settings"),
			LoadOutcome::Reset { reason } => {
				warn!(?reason, path = %config.settings_path.display(), "Settings were reset");
			}
		}

		let save_queue = SaveQueue::spawn(storage, config.save_delay);

		if matches!(outcome, LoadOutcome::Upgraded { .. }) {
			save_queue.schedule(config.save_payload(&settings)?)?;
		}

		Ok((
			Arc::new(Self {
				settings: RwLock::new(settings),
				config,
				save_queue,
			}),
			outcome,
		))
	}

	pub fn config(&self) -> &StoreConfig {
		&self.config
	}

	/// Copy of the current settings.
	pub async fn get(&self) -> Settings {
		self.settings.read().await.clone()
	}

	/// Mutates the settings under the lock and schedules a save. Concurrent writers are applied
	/// one after the other, so the last one to take the lock is what ends up on disk.
	pub async fn write<F: FnOnce(&mut Settings)>(&self, mutation_fn: F) -> Result<Settings, Error> {
		self.ensure_open()?;
		let mut settings = self.settings.write().await;

		mutation_fn(&mut settings);

		self.schedule_save(&settings)?;

		Ok(settings.clone())
	}

	/// Persists the current settings now and reports whether the write made it.
	pub async fn save(&self) -> Result<(), Error> {
		{
			let settings = self.settings.read().await;
			self.schedule_save(&settings)?;
		}

		self.save_queue.flush().await
	}

	/// Writes whatever is pending without scheduling anything new.
	pub async fn flush(&self) -> Result<(), Error> {
		self.save_queue.flush().await
	}

	/// Flushes pending saves, including one whose debounced write failed, and stops the save
	/// queue. Mutations after this fail with [`Error::SaveQueueClosed`] without being applied.
	pub async fn shutdown(&self) -> Result<(), Error> {
		self.save_queue.shutdown().await
	}

	pub async fn export(&self) -> Result<Vec<u8>, Error> {
		export::export(&*self.settings.read().await).map_err(Into::into)
	}

	/// Imports exported (or historical) settings bytes, merging them onto the current settings.
	pub async fn import(
		&self,
		bytes: &[u8],
		restore_backups: bool,
		names: &dyn NameSource,
	) -> Result<Settings, Error> {
		self.replace(export::parse_import(bytes)?, restore_backups, names)
			.await
	}

	/// Like [`SettingsStore::import`] for an already parsed blob.
	pub async fn replace(
		&self,
		value: Value,
		restore_backups: bool,
		names: &dyn NameSource,
	) -> Result<Settings, Error> {
		self.ensure_open()?;
		let mut settings = self.settings.write().await;

		*settings = import_onto(value, &settings, restore_backups, names)?;

		info!(
			annotations = settings.annotations.len(),
			backups = settings.backups.len(),
			"Imported settings"
		);

		self.schedule_save(&settings)?;

		Ok(settings.clone())
	}

	/// Stores `annotation` under `id`, or removes the entry when the annotation has no text.
	/// A blank name is stored as [`UNKNOWN_NAME`]. Returns the previous annotation.
	pub async fn annotate(
		&self,
		id: &Identifier,
		mut annotation: Annotation,
	) -> Result<Option<Annotation>, Error> {
		if annotation.is_empty() {
			return self.remove_annotation(id).await;
		}

		if annotation.name.trim().is_empty() {
			UNKNOWN_NAME.clone_into(&mut annotation.name);
		}

		self.ensure_open()?;
		let mut settings = self.settings.write().await;
		let previous = settings.annotations.insert(id.clone(), annotation);
		self.schedule_save(&settings)?;

		Ok(previous)
	}

	pub async fn remove_annotation(&self, id: &Identifier) -> Result<Option<Annotation>, Error> {
		self.ensure_open()?;
		let mut settings = self.settings.write().await;

		let Some(removed) = settings.annotations.shift_remove(id) else {
			return Ok(None);
		};

		self.schedule_save(&settings)?;

		Ok(Some(removed))
	}

	/// Applies what an [`crate::editor::AnnotationEditor`] handed back on blur.
	pub async fn apply(&self, id: &Identifier, commit: Commit) -> Result<(), Error> {
		match commit {
			Commit::Upsert(annotation) => self.annotate(id, annotation).await.map(|_| ()),
			Commit::Remove => self.remove_annotation(id).await.map(|_| ()),
			Commit::Unchanged => Ok(()),
		}
	}

	/// Backups, most recent first.
	pub async fn backups(&self) -> Vec<Backup> {
		backup::sorted(&self.settings.read().await.backups)
			.into_iter()
			.cloned()
			.collect()
	}

	pub async fn create_backup(&self, name: impl Into<String> + Send) -> Result<Backup, Error> {
		self.ensure_open()?;
		let mut settings = self.settings.write().await;

		let current = settings.clone();
		let backup = backup::capture(name, &current, &mut settings.backups);
		info!(name = %backup.name, "Created settings backup");

		self.schedule_save(&settings)?;

		Ok(backup)
	}

	/// Replaces the settings with the backup's snapshot. The backup list itself is kept.
	pub async fn restore_backup(&self, target: &Backup) -> Result<Settings, Error> {
		self.ensure_open()?;
		let mut settings = self.settings.write().await;

		if !settings.backups.contains(target) {
			return Err(Error::BackupNotFound(target.name.clone()));
		}

		let backups = std::mem::take(&mut settings.backups);
		*settings = backup::restore(target, backups);
		info!(name = %target.name, "Restored settings backup");

		self.schedule_save(&settings)?;

		Ok(settings.clone())
	}

	pub async fn delete_backup(&self, target: &Backup) -> Result<Backup, Error> {
		self.ensure_open()?;
		let mut settings = self.settings.write().await;

		let deleted = backup::delete(&mut settings.backups, target)
			.ok_or_else(|| Error::BackupNotFound(target.name.clone()))?;

		self.schedule_save(&settings)?;

		Ok(deleted)
	}

	pub async fn rename_backup(
		&self,
		target: &Backup,
		name: impl Into<String> + Send,
	) -> Result<Backup, Error> {
		self.ensure_open()?;
		let mut settings = self.settings.write().await;

		let backup = settings
			.backups
			.iter_mut()
			.find(|backup| **backup == *target)
			.ok_or_else(|| Error::BackupNotFound(target.name.clone()))?;

		backup.rename(name);
		let renamed = backup.clone();

		self.schedule_save(&settings)?;

		Ok(renamed)
	}

	/// Annotations whose subject isn't live anymore, without touching anything.
	pub async fn orphans(&self, live: &dyn LiveIdentifiers) -> AnnotationSet {
		reconcile::orphans(
			&self.settings.read().await.annotations,
			&live.live_identifiers(),
		)
	}

	/// Checks the annotations against a fresh live set, pruning orphans when `automatic_remove`
	/// is on. Saves only if something was pruned.
	pub async fn refresh_live(&self, live: &dyn LiveIdentifiers) -> Result<Reconciliation, Error> {
		self.ensure_open()?;
		let live = live.live_identifiers();
		let mut settings = self.settings.write().await;

		let reconciliation = reconcile::reconcile(&mut settings, &live);

		if reconciliation.changed() {
			info!(
				pruned = reconciliation.orphans().len(),
				"Removed annotations of missing plugins"
			);
			self.schedule_save(&settings)?;
		}

		Ok(reconciliation)
	}

	/// Removes every orphan regardless of `automatic_remove` and returns them.
	pub async fn remove_orphans(&self, live: &dyn LiveIdentifiers) -> Result<AnnotationSet, Error> {
		self.ensure_open()?;
		let live = live.live_identifiers();
		let mut settings = self.settings.write().await;

		let orphans = reconcile::orphans(&settings.annotations, &live);
		if !orphans.is_empty() {
			reconcile::prune(&mut settings.annotations, &orphans);
			self.schedule_save(&settings)?;
		}

		Ok(orphans)
	}

	/// Mutations are refused once the store is shut down, the settings stay as they were.
	fn ensure_open(&self) -> Result<(), Error> {
		if self.save_queue.is_closed() {
			return Err(Error::SaveQueueClosed);
		}

		Ok(())
	}

	fn schedule_save(&self, settings: &Settings) -> Result<(), Error> {
		self.save_queue.schedule(self.config.save_payload(settings)?)
	}
}
