use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};
use strata_chunk::ChunkData;
use strata_world::ChunkCoord;

use crate::{ChunkRecord, PersistError, WorldStore};

/// Receives the outcome of a background chunk read, on the I/O thread.
pub type LoadCallback = Box<dyn FnOnce(Result<Option<ChunkData>, PersistError>) + Send>;

enum IoJob {
    Save(ChunkRecord),
    Load(ChunkCoord, LoadCallback),
    Flush(Sender<()>),
}

/// A chunk write that failed; the caller should keep that chunk dirty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFailure {
    pub coord: ChunkCoord,
    pub message: String,
}

/// Background thread that owns chunk reads and writes, so disk access never
/// stalls generation. Jobs run in submission order, so a read queued after a
/// write of the same chunk sees the written data.
pub struct IoWorker {
    tx: Option<Sender<IoJob>>,
    failures: Receiver<SaveFailure>,
    handle: Option<JoinHandle<()>>,
}

impl IoWorker {
    pub fn spawn(store: Arc<WorldStore>) -> std::io::Result<Self> {
        let (tx, rx) = unbounded::<IoJob>();
        let (fail_tx, failures) = unbounded::<SaveFailure>();
        let handle = thread::Builder::new()
            .name("strata-io".into())
            .spawn(move || {
                let world = store.world();
                for job in rx.iter() {
                    match job {
                        IoJob::Save(record) => {
                            let coord = record.coord(&world);
                            match store.save_chunk(&record) {
                                Ok(()) => {
                                    log::debug!(target: "events", "saved chunk ({}, {})", coord.cx, coord.cz);
                                }
                                Err(e) => {
                                    log::warn!("saving chunk ({}, {}) failed: {}", coord.cx, coord.cz, e);
                                    let _ = fail_tx.send(SaveFailure {
                                        coord,
                                        message: e.to_string(),
                                    });
                                }
                            }
                        }
                        IoJob::Load(coord, done) => done(store.load_chunk(coord)),
                        IoJob::Flush(done) => {
                            let _ = done.send(());
                        }
                    }
                }
            })?;
        Ok(Self {
            tx: Some(tx),
            failures,
            handle: Some(handle),
        })
    }

    /// Queues a chunk write. Returns false once the worker has shut down.
    pub fn submit(&self, record: ChunkRecord) -> bool {
        self.send(IoJob::Save(record))
    }

    /// Queues a chunk read; `done` runs on the I/O thread with the result.
    /// Returns false, dropping `done`, once the worker has shut down.
    pub fn load(&self, coord: ChunkCoord, done: LoadCallback) -> bool {
        self.send(IoJob::Load(coord, done))
    }

    fn send(&self, job: IoJob) -> bool {
        self.tx.as_ref().is_some_and(|tx| tx.send(job).is_ok())
    }

    /// Blocks until every job queued before this call has finished.
    pub fn flush(&self) {
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        if self.send(IoJob::Flush(done_tx)) {
            let _ = done_rx.recv();
        }
    }

    /// Failed writes reported since the last call.
    pub fn drain_failures(&self) -> Vec<SaveFailure> {
        self.failures.try_iter().collect()
    }
}

impl Drop for IoWorker {
    fn drop(&mut self) {
        // Closing the channel lets the thread finish the backlog and exit.
        self.tx.take();
        if let Some(h) = self.handle.take() {
            // A load callback may drop the last owner on the worker thread itself.
            if h.thread().id() != thread::current().id() {
                let _ = h.join();
            }
        }
    }
}
