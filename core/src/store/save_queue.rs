//! Single writer for everything the store persists.
//!
//! Saves are coalesced: a new payload replaces the pending one and restarts the delay, so a burst
//! of edits turns into one write of the final state. Only the background task touches storage.

use std::{path::PathBuf, sync::Arc, time::Duration};

use pa_utils::error::{report_error, FileIOError};
use tokio::{
	sync::{mpsc, oneshot},
	time::timeout,
};
use tracing::{debug, trace};

use crate::{error::Error, storage::ByteStorage};

/// One file to put on storage as part of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingWrite {
	pub path: PathBuf,
	pub bytes: Vec<u8>,
}

type Payload = Vec<PendingWrite>;

enum Request {
	Save(Payload),
	Flush(oneshot::Sender<Result<(), FileIOError>>),
	Shutdown(oneshot::Sender<Result<(), FileIOError>>),
}

pub(crate) struct SaveQueue {
	tx: mpsc::UnboundedSender<Request>,
}

impl SaveQueue {
	pub fn spawn(storage: Arc<dyn ByteStorage>, delay: Duration) -> Self {
		let (tx, rx) = mpsc::unbounded_channel();

		tokio::spawn(run(storage, delay, rx));

		Self { tx }
	}

	/// Queues `payload`, superseding anything not written yet.
	pub fn schedule(&self, payload: Payload) -> Result<(), Error> {
		self.tx
			.send(Request::Save(payload))
			.map_err(|_| Error::SaveQueueClosed)
	}

	/// Whether the queue stopped taking saves.
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}

	/// Writes the pending payload right away, if any, and reports how it went. A payload whose
	/// write failed is kept and retried by the next flush.
	pub async fn flush(&self) -> Result<(), Error> {
		self.request(Request::Flush).await
	}

	/// Flushes and stops the background task, later saves fail with
	/// [`Error::SaveQueueClosed`].
	pub async fn shutdown(&self) -> Result<(), Error> {
		self.request(Request::Shutdown).await
	}

	async fn request(
		&self,
		request: impl FnOnce(oneshot::Sender<Result<(), FileIOError>>) -> Request,
	) -> Result<(), Error> {
		let (reply_tx, reply_rx) = oneshot::channel();

		self.tx
			.send(request(reply_tx))
			.map_err(|_| Error::SaveQueueClosed)?;

		reply_rx
			.await
			.map_err(|_| Error::SaveQueueClosed)?
			.map_err(Into::into)
	}
}

/// What still has to reach storage.
#[derive(Default)]
struct Unwritten {
	/// Waiting for the save delay to pass.
	pending: Option<Payload>,
	/// Its last write failed. Retried on flush and shutdown, dropped once a newer save arrives.
	failed: Option<Payload>,
}

impl Unwritten {
	/// Returns whether a pending payload was superseded.
	fn replace(&mut self, payload: Payload) -> bool {
		self.failed = None;
		self.pending.replace(payload).is_some()
	}

	async fn write(&mut self, storage: &dyn ByteStorage) -> Result<(), FileIOError> {
		let Some(payload) = self.pending.take().or_else(|| self.failed.take()) else {
			return Ok(());
		};

		let res = write_payload(storage, &payload).await;
		if res.is_err() {
			self.failed = Some(payload);
		}

		res
	}
}

async fn run(
	storage: Arc<dyn ByteStorage>,
	delay: Duration,
	mut rx: mpsc::UnboundedReceiver<Request>,
) {
	let mut unwritten = Unwritten::default();

	loop {
		let request = if unwritten.pending.is_some() {
			match timeout(delay, rx.recv()).await {
				Ok(Some(request)) => request,
				Ok(None) => {
					report_error(&unwritten.write(&*storage).await);
					break;
				}
				Err(_elapsed) => {
					trace!("Save delay elapsed, writing settings");
					report_error(&unwritten.write(&*storage).await);
					continue;
				}
			}
		} else {
			match rx.recv().await {
				Some(request) => request,
				None => {
					report_error(&unwritten.write(&*storage).await);
					break;
				}
			}
		};

		match request {
			Request::Save(payload) => {
				if unwritten.replace(payload) {
					trace!("Superseded a pending save");
				}
			}

			Request::Flush(reply_tx) => {
				// Nobody waiting for the result is fine, a failed payload stays for the next try
				reply_tx.send(unwritten.write(&*storage).await).ok();
			}

			Request::Shutdown(reply_tx) => {
				rx.close();
				reply_tx.send(unwritten.write(&*storage).await).ok();
				break;
			}
		}
	}

	debug!("Save queue stopped");
}

async fn write_payload(storage: &dyn ByteStorage, payload: &Payload) -> Result<(), FileIOError> {
	for PendingWrite { path, bytes } in payload {
		storage.write(path, bytes).await?;
		debug!(path = %path.display(), "Wrote file");
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::storage::MemoryStorage;

	fn payload(bytes: &str) -> Payload {
		vec![PendingWrite {
			path: "settings.json".into(),
			bytes: bytes.as_bytes().to_vec(),
		}]
	}

	#[tokio::test(start_paused = true)]
	async fn bursts_collapse_into_the_last_payload() {
		let storage = Arc::new(MemoryStorage::new());
		let queue = SaveQueue::spawn(storage.clone(), Duration::from_secs(1));

		for n in 0..5 {
			queue.schedule(payload(&n.to_string())).unwrap();
			tokio::time::sleep(Duration::from_millis(200)).await;
		}
		assert_eq!(storage.write_count("settings.json"), 0);

		tokio::time::sleep(Duration::from_secs(2)).await;

		assert_eq!(storage.write_count("settings.json"), 1);
		assert_eq!(storage.get("settings.json"), Some(b"4".to_vec()));
	}

	#[tokio::test]
	async fn flush_reports_write_failures() {
		let storage = Arc::new(MemoryStorage::new());
		storage.set_read_only(true);
		let queue = SaveQueue::spawn(storage.clone(), Duration::from_secs(60));

		queue.schedule(payload("{}")).unwrap();
		assert!(matches!(queue.flush().await, Err(Error::FileIO(_))));
		assert!(matches!(queue.flush().await, Err(Error::FileIO(_))));

		storage.set_read_only(false);
		queue.shutdown().await.unwrap();
		assert_eq!(storage.get("settings.json"), Some(b"{}".to_vec()));

		assert!(matches!(
			queue.schedule(payload("{}")),
			Err(Error::SaveQueueClosed)
		));
	}

	#[tokio::test(start_paused = true)]
	async fn failed_debounced_writes_are_retried_on_shutdown() {
		let storage = Arc::new(MemoryStorage::new());
		storage.set_read_only(true);
		let queue = SaveQueue::spawn(storage.clone(), Duration::from_secs(1));

		queue.schedule(payload("1")).unwrap();
		tokio::time::sleep(Duration::from_secs(3)).await;
		assert_eq!(storage.get("settings.json"), None);

		storage.set_read_only(false);
		queue.shutdown().await.unwrap();

		assert_eq!(storage.get("settings.json"), Some(b"1".to_vec()));
		assert_eq!(storage.write_count("settings.json"), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn newer_saves_replace_a_failed_one() {
		let storage = Arc::new(MemoryStorage::new());
		storage.set_read_only(true);
		let queue = SaveQueue::spawn(storage.clone(), Duration::from_secs(1));

		queue.schedule(payload("old")).unwrap();
		tokio::time::sleep(Duration::from_secs(2)).await;

		storage.set_read_only(false);
		queue.schedule(payload("new")).unwrap();
		queue.flush().await.unwrap();

		assert_eq!(storage.get("settings.json"), Some(b"new".to_vec()));
		assert_eq!(storage.write_count("settings.json"), 1);
	}

	#[tokio::test]
	async fn is_closed_follows_shutdown() {
		let queue = SaveQueue::spawn(Arc::new(MemoryStorage::new()), Duration::from_secs(1));
		assert!(!queue.is_closed());

		queue.shutdown().await.unwrap();
		assert!(queue.is_closed());
	}
}
