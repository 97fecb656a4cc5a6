//! A single worker of the pool.
//!
//! A worker loops over the shared queue: it claims a task, runs it through a
//! transfer session, signals completion, and claims the next one until the
//! queue is exhausted. A failing or panicking task is logged and turned into a
//! failure summary; the worker then moves on.

use super::completion::CompletionNotifier;
use crate::download::{DownloadTask, Summary, Status};
use crate::error::Result;
use crate::progress::{ProgressHandle, ProgressReader, ProgressRegistry};
use crate::session::{transfer_to, Connector, TransferSession, TransferState};

use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

/// The pool's task queue: a pre-filled channel whose receiver all workers share.
pub(crate) type TaskQueue = Arc<Mutex<mpsc::Receiver<DownloadTask>>>;

/// Lifecycle of a worker, as reported in its debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Claimed,
    Connecting,
    Transferring,
    Failed,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Idle => "idle",
            WorkerState::Claimed => "claimed",
            WorkerState::Connecting => "connecting",
            WorkerState::Transferring => "transferring",
            WorkerState::Failed => "failed",
        };
        f.write_str(name)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) queue: TaskQueue,
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) progress: ProgressRegistry,
    pub(crate) completion: CompletionNotifier,
    pub(crate) connect_timeout: Duration,
}

impl Worker {
    fn enter(&self, state: WorkerState, task: Option<&DownloadTask>) {
        match task {
            Some(task) => debug!(worker = self.id, task = task.id(), %state, "{}", task.location()),
            None => debug!(worker = self.id, %state),
        }
    }

    /// Claim and run tasks until the queue is empty. Returns the number of
    /// tasks this worker handled.
    pub(crate) async fn run(self) -> usize {
        let mut handled = 0;
        loop {
            self.enter(WorkerState::Idle, None);
            let claimed = self.queue.lock().await.recv().await;
            let Some(task) = claimed else {
                break;
            };
            self.enter(WorkerState::Claimed, Some(&task));

            let signal = self.completion.signal(&task);
            let summary = match AssertUnwindSafe(self.fetch(&task)).catch_unwind().await {
                Ok(summary) => summary,
                Err(panic) => {
                    let reason = panic_message(panic.as_ref());
                    self.enter(WorkerState::Failed, Some(&task));
                    error!(task = task.id(), "task panicked: {}", reason);
                    Summary::failed(task.clone(), 0, None, format!("panic: {}", reason))
                }
            };
            signal.complete(summary);
            handled += 1;
        }
        debug!(worker = self.id, handled, "queue exhausted");
        handled
    }

    /// Run one task to its terminal state.
    async fn fetch(&self, task: &DownloadTask) -> Summary {
        let handle = self.progress.register(task.id(), task.filename(), None);
        let mut state = TransferState::new();

        let result = self.transfer(task, &handle, &mut state).await;
        handle.finish(result.is_ok());

        let (size, expected) = (state.bytes_transferred, state.total_bytes);
        match result {
            Ok(()) => {
                info!(
                    task = task.id(),
                    bytes = state.bytes_transferred,
                    elapsed = ?state.elapsed(),
                    "downloaded {}",
                    task.location()
                );
                Summary::new(task.clone(), size, expected, Status::Success)
            }
            Err(e) => {
                self.enter(WorkerState::Failed, Some(task));
                warn!(
                    task = task.id(),
                    kind = e.kind(),
                    bytes = state.bytes_transferred,
                    "failed to download {}: {}",
                    task.location(),
                    e
                );
                Summary::failed(task.clone(), size, expected, format!("{}: {}", e.kind(), e))
            }
        }
    }

    /// Create the local file, then open a session and stream into it. The
    /// session is closed on every path once it was opened.
    async fn transfer(
        &self,
        task: &DownloadTask,
        handle: &ProgressHandle,
        state: &mut TransferState,
    ) -> Result<()> {
        debug!("Creating destination file {:?}", task.destination());
        let mut file = File::create(task.destination()).await?;

        self.enter(WorkerState::Connecting, Some(task));
        let mut session = self
            .connector
            .open(task.location().server(), self.connect_timeout)
            .await?;

        let result = self
            .stream(task, session.as_mut(), &mut file, handle, state)
            .await;
        session.close().await;
        result
    }

    async fn stream(
        &self,
        task: &DownloadTask,
        session: &mut dyn TransferSession,
        file: &mut File,
        handle: &ProgressHandle,
        state: &mut TransferState,
    ) -> Result<()> {
        let path = task.location().path();

        state.total_bytes = match session.size(path).await {
            Ok(size) => {
                debug!(task = task.id(), size, "remote size");
                handle.set_total(size);
                Some(size)
            }
            Err(e) => {
                warn!(task = task.id(), "size unknown, counting bytes only: {}", e);
                None
            }
        };

        let data = session.retrieve(path).await?;
        self.enter(WorkerState::Transferring, Some(task));

        let mut reader = ProgressReader::new(data, handle);
        transfer_to(file, &mut reader, state).await?;
        session.finish_retrieve().await
    }
}
