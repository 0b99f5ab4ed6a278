//! The settings store against in-memory and on-disk storage.

use std::{collections::HashSet, path::Path, sync::Arc, time::Duration};

use pa_core::{
	annotation::UNKNOWN_NAME,
	editor::{AnnotationEditor, EditEvent},
	reconcile::Reconciliation,
	settings::{
		self,
		detect::{detect, Detection},
	},
	Annotation, Error, FsStorage, Identifier, LoadOutcome, MemoryStorage, NoNames,
	SchemaVersion, Settings, SettingsStore, StoreConfig,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::tempdir;
use tracing_test::traced_test;

const SETTINGS_PATH: &str = "vault/.plugins/annotations/data.json";
const V1_3_0: &[u8] = include_bytes!("fixtures/v1_3_0.json");
const V1_6_0: &[u8] = include_bytes!("fixtures/v1_6_0.json");

fn config() -> StoreConfig {
	StoreConfig::new(SETTINGS_PATH).with_markdown_root("vault")
}

async fn open(storage: &Arc<MemoryStorage>) -> (Arc<SettingsStore>, LoadOutcome) {
	SettingsStore::load(storage.clone(), config(), &NoNames)
		.await
		.unwrap()
}

fn persisted(storage: &MemoryStorage) -> Value {
	serde_json::from_slice(&storage.get(SETTINGS_PATH).unwrap()).unwrap()
}

fn live(ids: &[&str]) -> HashSet<Identifier> {
	ids.iter().copied().map(Identifier::from).collect()
}

#[tokio::test]
#[traced_test]
async fn legacy_settings_are_upgraded_and_written_back() {
	let storage = Arc::new(MemoryStorage::with_file(SETTINGS_PATH, V1_3_0));

	let (store, outcome) = open(&storage).await;
	assert_eq!(
		outcome,
		LoadOutcome::Upgraded {
			from: SchemaVersion::V1_3_0
		}
	);
	assert!(logs_contain("Running settings migrator"));

	store.flush().await.unwrap();

	assert_eq!(storage.write_count(SETTINGS_PATH), 1);
	assert_eq!(
		detect(&persisted(&storage)),
		Detection::Version(SchemaVersion::LATEST)
	);
}

#[tokio::test]
async fn fresh_and_current_loads_write_nothing() {
	let storage = Arc::new(MemoryStorage::new());
	let (store, outcome) = open(&storage).await;
	assert_eq!(outcome, LoadOutcome::FreshStart);
	assert_eq!(store.get().await, Settings::default());
	store.flush().await.unwrap();

	let storage = Arc::new(MemoryStorage::with_file(SETTINGS_PATH, V1_6_0));
	let (store, outcome) = open(&storage).await;
	assert_eq!(outcome, LoadOutcome::Current);
	store.flush().await.unwrap();

	assert_eq!(storage.write_count(SETTINGS_PATH), 0);
}

#[tokio::test]
#[traced_test]
async fn corrupt_settings_stay_on_disk_until_the_next_change() {
	let storage = Arc::new(MemoryStorage::with_file(SETTINGS_PATH, "{ broken"));

	let (store, outcome) = open(&storage).await;
	assert!(matches!(outcome, LoadOutcome::Reset { .. }));
	assert!(logs_contain("Settings were reset"));

	store.flush().await.unwrap();
	assert_eq!(storage.get(SETTINGS_PATH), Some(b"{ broken".to_vec()));

	store
		.annotate(&"dataview".into(), Annotation::new("Dataview", "queries"))
		.await
		.unwrap();
	store.flush().await.unwrap();
	assert_eq!(persisted(&storage)["annotations"]["dataview"]["desc"], "queries");
}

#[tokio::test(start_paused = true)]
async fn bursts_of_edits_are_written_once() {
	let storage = Arc::new(MemoryStorage::new());
	let (store, _) = open(&storage).await;

	for n in 0..10 {
		store
			.write(|settings| settings.label_mobile = format!("label {n}"))
			.await
			.unwrap();
		tokio::time::sleep(Duration::from_millis(100)).await;
	}
	assert_eq!(storage.write_count(SETTINGS_PATH), 0);

	tokio::time::sleep(Duration::from_secs(2)).await;

	assert_eq!(storage.write_count(SETTINGS_PATH), 1);
	assert_eq!(persisted(&storage)["label_mobile"], "label 9");
}

#[tokio::test]
#[traced_test]
async fn failed_writes_keep_the_settings_in_memory() {
	let storage = Arc::new(MemoryStorage::new());
	let (store, _) = open(&storage).await;

	storage.set_read_only(true);
	store
		.annotate(&"calendar".into(), Annotation::new("Calendar", "dates"))
		.await
		.unwrap();

	assert!(matches!(store.save().await, Err(Error::FileIO(_))));
	assert_eq!(store.get().await.annotations["calendar"].desc, "dates");

	storage.set_read_only(false);
	store.save().await.unwrap();
	assert_eq!(persisted(&storage)["annotations"]["calendar"]["desc"], "dates");
}

#[tokio::test(start_paused = true)]
async fn failed_debounced_writes_land_at_shutdown() {
	let storage = Arc::new(MemoryStorage::new());
	let (store, _) = open(&storage).await;

	storage.set_read_only(true);
	store
		.annotate(&"calendar".into(), Annotation::new("Calendar", "dates"))
		.await
		.unwrap();
	tokio::time::sleep(Duration::from_secs(3)).await;
	assert_eq!(storage.get(SETTINGS_PATH), None);

	storage.set_read_only(false);
	store.shutdown().await.unwrap();

	assert_eq!(persisted(&storage)["annotations"]["calendar"]["desc"], "dates");
}

#[tokio::test]
async fn shutdown_reports_writes_that_still_fail() {
	let storage = Arc::new(MemoryStorage::new());
	let (store, _) = open(&storage).await;

	storage.set_read_only(true);
	store
		.annotate(&"calendar".into(), Annotation::new("Calendar", "dates"))
		.await
		.unwrap();
	assert!(matches!(store.flush().await, Err(Error::FileIO(_))));

	assert!(matches!(store.shutdown().await, Err(Error::FileIO(_))));
	assert_eq!(storage.get(SETTINGS_PATH), None);
}

#[tokio::test]
async fn blank_names_are_stored_as_unknown() {
	let storage = Arc::new(MemoryStorage::new());
	let (store, _) = open(&storage).await;

	store
		.annotate(&"p1".into(), Annotation::new("", "hello"))
		.await
		.unwrap();

	let settings = store.get().await;
	let mut editor = AnnotationEditor::new("p2".into(), "  ", &settings);
	editor.handle(EditEvent::Input("world".to_owned()), &settings);
	let commit = editor.handle(EditEvent::Blur, &settings).unwrap();
	store.apply(&"p2".into(), commit).await.unwrap();

	let settings = store.get().await;
	assert_eq!(settings.annotations["p1"], Annotation::new(UNKNOWN_NAME, "hello"));
	assert_eq!(settings.annotations["p2"], Annotation::new(UNKNOWN_NAME, "world"));

	store.save().await.unwrap();
	let (reloaded, outcome) = settings::load(storage.get(SETTINGS_PATH).as_deref(), &NoNames);
	assert_eq!(outcome, LoadOutcome::Current);
	assert_eq!(reloaded, settings);
}

#[tokio::test]
async fn export_then_import_carries_everything_but_backups() {
	let source = Arc::new(MemoryStorage::with_file(SETTINGS_PATH, V1_6_0));
	let (source, _) = open(&source).await;
	let exported = source.export().await.unwrap();

	let target = Arc::new(MemoryStorage::new());
	let (target, _) = open(&target).await;
	target.create_backup("mine").await.unwrap();

	let imported = target.import(&exported, false, &NoNames).await.unwrap();
	let original = source.get().await;

	assert_eq!(imported.annotations, original.annotations);
	assert_eq!(imported.markdown_file_path, original.markdown_file_path);
	assert_eq!(imported.backups.len(), 1);
	assert_eq!(imported.backups[0].name, "mine");
}

#[tokio::test]
async fn import_can_restore_backups() {
	let storage = Arc::new(MemoryStorage::new());
	let (store, _) = open(&storage).await;

	let imported = store.import(V1_6_0, true, &NoNames).await.unwrap();

	assert_eq!(imported.backups.len(), 1);
	assert_eq!(imported.backups[0].name, "Before cleanup");
}

#[tokio::test]
async fn bad_imports_leave_the_settings_alone() {
	let storage = Arc::new(MemoryStorage::new());
	let (store, _) = open(&storage).await;
	store
		.annotate(&"dataview".into(), Annotation::new("Dataview", "queries"))
		.await
		.unwrap();
	let before = store.get().await;

	assert!(matches!(
		store.import(b"not json", false, &NoNames).await,
		Err(Error::SerdeJson(_))
	));
	assert!(matches!(
		store.replace(json!({ "foo": 1 }), false, &NoNames).await,
		Err(Error::UnrecognizedImport)
	));
	assert!(matches!(
		store.replace(json!(7), false, &NoNames).await,
		Err(Error::NotAnObject(_))
	));

	assert_eq!(store.get().await, before);
}

#[tokio::test]
async fn backups_round_trip() {
	let storage = Arc::new(MemoryStorage::new());
	let (store, _) = open(&storage).await;

	store
		.annotate(&"dataview".into(), Annotation::new("Dataview", "v1"))
		.await
		.unwrap();
	let first = store.create_backup("first").await.unwrap();
	tokio::time::sleep(Duration::from_millis(5)).await;

	store
		.annotate(&"dataview".into(), Annotation::new("Dataview", "v2"))
		.await
		.unwrap();
	let second = store.create_backup("second").await.unwrap();

	let restored = store.restore_backup(&first).await.unwrap();
	assert_eq!(restored.annotations["dataview"].desc, "v1");
	assert_eq!(restored.backups.len(), 2);

	let renamed = store.rename_backup(&second, "later").await.unwrap();
	assert_eq!(renamed.name, "later");
	assert_eq!(renamed.settings, second.settings);

	let names = store
		.backups()
		.await
		.into_iter()
		.map(|backup| backup.name)
		.collect::<Vec<_>>();
	assert_eq!(names, ["later", "first"]);

	store.delete_backup(&first).await.unwrap();
	assert!(matches!(
		store.delete_backup(&first).await,
		Err(Error::BackupNotFound(name)) if name == "first"
	));
	assert!(matches!(
		store.restore_backup(&first).await,
		Err(Error::BackupNotFound(_))
	));

	store.flush().await.unwrap();
	let persisted_backups = persisted(&storage)["backups"].clone();
	assert_eq!(persisted_backups.as_array().map(Vec::len), Some(1));
	assert!(persisted_backups[0]["settings"].get("backups").is_none());
}

#[tokio::test]
#[traced_test]
async fn orphans_are_pruned_only_when_asked_to() {
	let storage = Arc::new(MemoryStorage::new());
	let (store, _) = open(&storage).await;

	for id in ["dataview", "calendar", "removed"] {
		store
			.annotate(&id.into(), Annotation::new(id, "note"))
			.await
			.unwrap();
	}
	let installed = live(&["dataview", "calendar"]);

	let orphans = store.orphans(&installed).await;
	assert_eq!(orphans.keys().collect::<Vec<_>>(), [&Identifier::from("removed")]);

	let kept = store.refresh_live(&installed).await.unwrap();
	assert!(matches!(kept, Reconciliation::Retained(_)));
	assert_eq!(store.get().await.annotations.len(), 3);

	store
		.write(|settings| settings.automatic_remove = true)
		.await
		.unwrap();
	let pruned = store.refresh_live(&installed).await.unwrap();
	assert!(pruned.changed());
	assert!(logs_contain("Removed annotations of missing plugins"));

	let remaining = store.get().await.annotations;
	assert_eq!(
		remaining.keys().map(Identifier::as_str).collect::<Vec<_>>(),
		["dataview", "calendar"]
	);

	let removed = store.remove_orphans(&live(&["calendar"])).await.unwrap();
	assert_eq!(removed.keys().map(Identifier::as_str).collect::<Vec<_>>(), ["dataview"]);
}

#[tokio::test]
async fn markdown_mirror_follows_the_annotations() {
	let storage = Arc::new(MemoryStorage::new());
	let (store, _) = open(&storage).await;
	let mirror = Path::new("vault/Plugins.md");

	store
		.annotate(&"dataview".into(), Annotation::new("Dataview", "queries"))
		.await
		.unwrap();
	store.save().await.unwrap();
	assert_eq!(storage.get(mirror), None);

	store
		.write(|settings| settings.markdown_file_path = "Plugins.md".to_owned())
		.await
		.unwrap();
	store.save().await.unwrap();

	let markdown = String::from_utf8(storage.get(mirror).unwrap()).unwrap();
	assert_eq!(
		markdown,
		"# Plugin annotations\n\n## Dataview\n<!-- id: dataview -->\n\nqueries\n"
	);
}

#[tokio::test]
#[traced_test]
async fn markdown_mirror_stays_inside_the_vault() {
	let storage = Arc::new(MemoryStorage::new());
	let (store, _) = open(&storage).await;

	let mut exported: Value = serde_json::from_slice(&store.export().await.unwrap()).unwrap();
	exported["markdown_file_path"] = json!("../../etc/escaped.md");
	exported["annotations"] = json!({ "dataview": { "name": "Dataview", "desc": "queries" } });

	store.replace(exported, false, &NoNames).await.unwrap();
	store.save().await.unwrap();

	assert_eq!(persisted(&storage)["markdown_file_path"], "../../etc/escaped.md");
	assert_eq!(storage.get("vault/../../etc/escaped.md"), None);
	assert!(logs_contain("points outside the vault"));

	store
		.write(|settings| settings.markdown_file_path = "/etc/escaped.md".to_owned())
		.await
		.unwrap();
	store.save().await.unwrap();
	assert_eq!(storage.get("/etc/escaped.md"), None);
}

#[tokio::test]
async fn editor_commits_reach_the_store() {
	let storage = Arc::new(MemoryStorage::new());
	let (store, _) = open(&storage).await;
	let id = Identifier::from("calendar");

	let settings = store.get().await;
	let mut editor = AnnotationEditor::new(id.clone(), "Calendar", &settings);
	editor.handle(EditEvent::Input("daily".to_owned()), &settings);
	let commit = editor.handle(EditEvent::Blur, &settings).unwrap();
	store.apply(&id, commit).await.unwrap();

	let settings = store.get().await;
	assert_eq!(settings.annotations[&id], Annotation::new("Calendar", "daily"));

	let mut editor = AnnotationEditor::new(id.clone(), "Calendar", &settings);
	editor.handle(EditEvent::Input(String::new()), &settings);
	let commit = editor.handle(EditEvent::Blur, &settings).unwrap();
	store.apply(&id, commit).await.unwrap();

	assert!(store.get().await.annotations.is_empty());
}

#[tokio::test]
async fn settings_survive_a_restart_on_disk() {
	let dir = tempdir().unwrap();
	let config = StoreConfig::new(dir.path().join("plugin").join("data.json"));

	let (store, outcome) = SettingsStore::load(Arc::new(FsStorage), config.clone(), &NoNames)
		.await
		.unwrap();
	assert_eq!(outcome, LoadOutcome::FreshStart);

	store
		.annotate(&"dataview".into(), Annotation::new("Dataview", "queries"))
		.await
		.unwrap();
	store.shutdown().await.unwrap();

	assert!(matches!(
		store.annotate(&"calendar".into(), Annotation::new("Calendar", "x")).await,
		Err(Error::SaveQueueClosed)
	));
	assert!(matches!(
		store.write(|settings| settings.editable = false).await,
		Err(Error::SaveQueueClosed)
	));
	assert!(matches!(
		store.create_backup("late").await,
		Err(Error::SaveQueueClosed)
	));

	let settings = store.get().await;
	assert!(!settings.annotations.contains_key("calendar"));
	assert!(settings.editable);
	assert!(settings.backups.is_empty());

	let (reopened, outcome) = SettingsStore::load(Arc::new(FsStorage), config, &NoNames)
		.await
		.unwrap();
	assert_eq!(outcome, LoadOutcome::Current);
	assert_eq!(
		reopened.get().await.annotations["dataview"],
		Annotation::new("Dataview", "queries")
	);
}
