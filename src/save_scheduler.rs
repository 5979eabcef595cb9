// src/save_scheduler.rs - Background persistence
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use chrono::Utc;
use log::{debug, error, info, trace, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::{NotesCollection, NotesError, PersistenceAdapter, Result};

#[derive(Debug, Clone, Default)]
pub struct SaveSchedulerStatus {
    /// Whether the worker task is accepting snapshots
    pub is_running: bool,
    /// Generation of the newest snapshot handed to the saver
    pub last_queued_generation: u64,
    /// Generation of the newest snapshot written to the inner adapter
    pub last_saved_generation: u64,
    /// When the last successful write finished
    pub last_save_time: Option<chrono::DateTime<Utc>>,
    /// The most recent write failure, cleared by the next successful write
    pub last_error: Option<String>,
}

#[derive(Debug)]
enum SaveCommand {
    /// Persist this snapshot unless something newer was already written
    Snapshot {
        generation: u64,
        collection: NotesCollection,
    },
    /// Reply once every snapshot queued before this command is handled
    Flush(oneshot::Sender<()>),
    /// Flush, then stop the worker
    Stop(oneshot::Sender<()>),
}

/// Persists snapshots on a tokio task so mutations never wait on disk.
///
/// Each `save` gets the next generation number in call order. The worker
/// coalesces whatever is queued and writes only the newest snapshot, and it
/// never writes a generation older than one already written.
#[derive(Clone)]
pub struct BackgroundSaver {
    /// The adapter doing the actual writes
    inner: Arc<dyn PersistenceAdapter>,

    /// Channel to send commands to the worker task
    command_tx: mpsc::UnboundedSender<SaveCommand>,

    /// Last generation handed out
    generation: Arc<AtomicU64>,

    /// Shared status, updated by the worker
    status: Arc<Mutex<SaveSchedulerStatus>>,

    /// Handle to the worker task
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl BackgroundSaver {
    /// Spawns the worker on the current tokio runtime.
    pub fn start(inner: Arc<dyn PersistenceAdapter>) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            NotesError::PersistenceUnavailable {
                message: format!("background saver needs a tokio runtime: {e}"),
            }
        })?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let status = Arc::new(Mutex::new(SaveSchedulerStatus {
            is_running: true,
            ..SaveSchedulerStatus::default()
        }));

        let worker = runtime.spawn(run_worker(
            Arc::clone(&inner),
            command_rx,
            Arc::clone(&status),
        ));
        info!("Background saver started");

        Ok(Self {
            inner,
            command_tx,
            generation: Arc::new(AtomicU64::new(0)),
            status,
            worker: Arc::new(Mutex::new(Some(worker))),
        })
    }

    /// Waits until every snapshot queued so far has been handled.
    pub async fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.command_tx
            .send(SaveCommand::Flush(done_tx))
            .map_err(|_| stopped())?;
        done_rx.await.map_err(|_| stopped())
    }

    /// Flushes pending snapshots and stops the worker.
    pub async fn shutdown(&self) -> Result<()> {
        info!("Stopping background saver...");
        let (done_tx, done_rx) = oneshot::channel();
        if self.command_tx.send(SaveCommand::Stop(done_tx)).is_ok() {
            let _ = done_rx.await;
        } else {
            debug!("Background saver already stopped");
        }

        let handle = self.worker.lock().ok().and_then(|mut worker| worker.take());
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Background saver task failed: {}", e);
                return Err(NotesError::ApplicationError {
                    message: format!("background saver task failed: {e}"),
                });
            }
        }

        info!("Background saver stopped");
        match self.get_status().last_error {
            Some(message) => Err(NotesError::PersistenceUnavailable { message }),
            None => Ok(()),
        }
    }

    pub fn get_status(&self) -> SaveSchedulerStatus {
        match self.status.lock() {
            Ok(status) => status.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl PersistenceAdapter for BackgroundSaver {
    fn load(&self) -> Result<Option<NotesCollection>> {
        self.inner.load()
    }

    /// Queues `collection`; returns before it is written.
    fn save(&self, collection: &NotesCollection) -> Result<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        trace!("Queueing snapshot generation {}", generation);

        self.command_tx
            .send(SaveCommand::Snapshot {
                generation,
                collection: collection.clone(),
            })
            .map_err(|_| stopped())?;

        if let Ok(mut status) = self.status.lock() {
            status.last_queued_generation = generation;
        }
        Ok(())
    }
}

fn stopped() -> NotesError {
    NotesError::PersistenceUnavailable {
        message: "background saver is not running".to_string(),
    }
}

async fn run_worker(
    inner: Arc<dyn PersistenceAdapter>,
    mut command_rx: mpsc::UnboundedReceiver<SaveCommand>,
    status: Arc<Mutex<SaveSchedulerStatus>>,
) {
    let mut last_written = 0u64;

    while let Some(first) = command_rx.recv().await {
        let mut newest: Option<(u64, NotesCollection)> = None;
        let mut waiters = Vec::new();
        let mut stop = false;

        let mut next = Some(first);
        while let Some(command) = next {
            match command {
                SaveCommand::Snapshot {
                    generation,
                    collection,
                } => {
                    let is_newer = match &newest {
                        Some((queued, _)) => generation > *queued,
                        None => true,
                    };
                    if is_newer {
                        newest = Some((generation, collection));
                    }
                }
                SaveCommand::Flush(done) => waiters.push(done),
                SaveCommand::Stop(done) => {
                    waiters.push(done);
                    stop = true;
                }
            }
            next = command_rx.try_recv().ok();
        }

        if let Some((generation, collection)) = newest {
            if generation <= last_written {
                trace!(
                    "Skipping snapshot {} (already wrote {})",
                    generation,
                    last_written
                );
            } else {
                let adapter = Arc::clone(&inner);
                let outcome =
                    tokio::task::spawn_blocking(move || adapter.save(&collection)).await;

                let mut guard = match status.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                match outcome {
                    Ok(Ok(())) => {
                        last_written = generation;
                        guard.last_saved_generation = generation;
                        guard.last_save_time = Some(Utc::now());
                        guard.last_error = None;
                        debug!("Saved snapshot generation {}", generation);
                    }
                    Ok(Err(e)) => {
                        warn!("Failed to save snapshot {}: {}", generation, e);
                        guard.last_error = Some(e.to_string());
                    }
                    Err(e) => {
                        error!("Save task for snapshot {} panicked: {}", generation, e);
                        guard.last_error = Some(e.to_string());
                    }
                }
            }
        }

        for done in waiters {
            let _ = done.send(());
        }

        if stop {
            break;
        }
    }

    if let Ok(mut status) = status.lock() {
        status.is_running = false;
    }
    debug!("Background saver worker exiting");
}
