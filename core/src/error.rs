use pa_utils::error::FileIOError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
	#[error("imported settings must be a JSON object, found {0}")]
	NotAnObject(&'static str),
	#[error("imported settings don't match any known settings schema")]
	UnrecognizedImport,
	#[error("backup not found <name='{0}'>")]
	BackupNotFound(String),
	#[error("settings save queue is no longer running")]
	SaveQueueClosed,

	#[error(transparent)]
	FileIO(#[from] FileIOError),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
