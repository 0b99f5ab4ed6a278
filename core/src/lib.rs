#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::dbg_macro,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

//! Per-plugin annotations and the settings that hold them.
//!
//! Settings written by any released version are detected, upgraded one schema at a time and
//! merged with the defaults on load; [`SettingsStore`] then owns them for the rest of the
//! session.

pub mod annotation;
pub mod backup;
pub mod editor;
pub mod error;
pub mod export;
pub mod reconcile;
pub mod settings;
pub mod storage;
pub mod store;

pub use annotation::{Annotation, AnnotationSet, Identifier};
pub use backup::Backup;
pub use error::Error;
pub use settings::{
	migrate::{NameSource, NoNames},
	schema::SchemaVersion,
	LoadOutcome, Platform, ResetReason, Settings, SettingsSnapshot,
};
pub use storage::{ByteStorage, FsStorage, MemoryStorage};
pub use store::{SettingsStore, StoreConfig};
