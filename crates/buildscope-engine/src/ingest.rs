use buildscope_types::{Error, LogRecord, Result, Tree};
use std::sync::mpsc::{Sender, channel};
use std::thread::JoinHandle;

use crate::reconstruct::{ReconstructOptions, Reconstructor};

/// One reconstructor running on its own thread.
///
/// Producers on any thread clone the sender and push records; the worker
/// applies them strictly in arrival order, so the reconstructor itself never
/// needs a lock.
pub struct ReconstructionWorker {
    tx: Sender<LogRecord>,
    handle: JoinHandle<Result<Tree>>,
}

impl ReconstructionWorker {
    pub fn spawn(options: ReconstructOptions) -> Result<Self> {
        let (tx, rx) = channel::<LogRecord>();

        let handle = std::thread::Builder::new()
            .name("build-reconstructor".to_string())
            .spawn(move || {
                let mut reconstructor = Reconstructor::new(options);
                // Stops at the first hard failure; later sends see a closed channel
                while let Ok(record) = rx.recv() {
                    reconstructor.feed(record)?;
                }
                reconstructor.finish()
            })?;

        Ok(Self { tx, handle })
    }

    pub fn sender(&self) -> Sender<LogRecord> {
        self.tx.clone()
    }

    pub fn send(&self, record: LogRecord) -> Result<()> {
        self.tx
            .send(record)
            .map_err(|_| Error::Io(std::io::Error::other("reconstruction worker stopped")))
    }

    /// Close the channel and wait for the tree.
    ///
    /// Blocks until every cloned sender has been dropped.
    pub fn finish(self) -> Result<Tree> {
        let Self { tx, handle } = self;
        drop(tx);
        handle
            .join()
            .map_err(|_| Error::Io(std::io::Error::other("reconstruction worker panicked")))?
    }
}
