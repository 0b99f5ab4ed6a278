//! Byte-oriented persistence collaborators.
//!
//! The store only ever asks for "the bytes at this path" and "put these bytes at this path",
//! so hosts can back it with anything. [`FsStorage`] is what the CLI uses and [`MemoryStorage`]
//! is handy for hosts that keep their own vault abstraction and for tests.

use std::{
	collections::HashMap,
	io,
	path::{Path, PathBuf},
};

use async_trait::async_trait;
use pa_utils::error::FileIOError;
use parking_lot::Mutex;
use tokio::fs;

#[async_trait]
pub trait ByteStorage: Send + Sync + 'static {
	/// Returns `Ok(None)` when nothing was ever written at `path`.
	async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, FileIOError>;

	async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), FileIOError>;
}

/// Plain filesystem storage, creating parent directories on write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

#[async_trait]
impl ByteStorage for FsStorage {
	async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, FileIOError> {
		match fs::read(path)
			.await
			.map_err(|e| FileIOError::from((path, e, "Failed to read file")))
		{
			Ok(bytes) => Ok(Some(bytes)),
			Err(e) if e.is_not_found() => Ok(None),
			Err(e) => Err(e),
		}
	}

	async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), FileIOError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).await.map_err(|e| {
				FileIOError::from((parent, e, "Failed to create parent directory"))
			})?;
		}

		fs::write(path, bytes)
			.await
			.map_err(|e| FileIOError::from((path, e, "Failed to write file")))
	}
}

#[derive(Debug, Default)]
struct MemoryState {
	files: HashMap<PathBuf, Vec<u8>>,
	writes: HashMap<PathBuf, usize>,
	read_only: bool,
}

/// In-memory storage. Can be switched to read-only to simulate a failing disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	state: Mutex<MemoryState>,
}

impl MemoryStorage {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_file(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
		let storage = Self::default();
		storage.state.lock().files.insert(path.into(), bytes.into());
		storage
	}

	/// While read-only every write fails with `PermissionDenied`.
	pub fn set_read_only(&self, read_only: bool) {
		self.state.lock().read_only = read_only;
	}

	#[must_use]
	pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
		self.state.lock().files.get(path.as_ref()).cloned()
	}

	/// Number of successful writes made to `path`.
	#[must_use]
	pub fn write_count(&self, path: impl AsRef<Path>) -> usize {
		self.state
			.lock()
			.writes
			.get(path.as_ref())
			.copied()
			.unwrap_or_default()
	}
}

#[async_trait]
impl ByteStorage for MemoryStorage {
	async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, FileIOError> {
		Ok(self.get(path))
	}

	async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), FileIOError> {
		let mut state = self.state.lock();

		if state.read_only {
			return Err(FileIOError::from((
				path,
				io::Error::new(io::ErrorKind::PermissionDenied, "storage is read-only"),
			)));
		}

		state.files.insert(path.to_path_buf(), bytes.to_vec());
		*state.writes.entry(path.to_path_buf()).or_default() += 1;

		Ok(())
	}
}
