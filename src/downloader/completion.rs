//! Completion tracking for a batch of tasks.
//!
//! Each claimed task is wrapped in a [`CompletionSignal`]. The signal sends
//! the task's [`Summary`] when completed explicitly, or a failure summary when
//! it is dropped first (early return, worker panic). Either way exactly one
//! summary per task reaches the [`CompletionCoordinator`].

use super::config::DownloadCallback;
use crate::download::{DownloadTask, Summary};

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Collects one completion signal per task.
pub struct CompletionCoordinator {
    expected: usize,
    tx: mpsc::UnboundedSender<Summary>,
    rx: mpsc::UnboundedReceiver<Summary>,
    on_complete: Option<Arc<DownloadCallback>>,
}

impl CompletionCoordinator {
    /// Coordinator waiting for `expected` signals.
    pub fn new(expected: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            expected,
            tx,
            rx,
            on_complete: None,
        }
    }

    /// Run `callback` on every summary as it arrives.
    pub fn with_callback(mut self, callback: Option<Arc<DownloadCallback>>) -> Self {
        self.on_complete = callback;
        self
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    /// A sender for workers.
    pub fn notifier(&self) -> CompletionNotifier {
        CompletionNotifier {
            tx: self.tx.clone(),
        }
    }

    /// Wait until `expected` summaries have arrived.
    ///
    /// Returns early, with the summaries received so far, if every notifier
    /// and signal is gone before the count is reached.
    pub async fn wait(self) -> Vec<Summary> {
        let CompletionCoordinator {
            expected,
            tx,
            mut rx,
            on_complete,
        } = self;
        drop(tx);

        let mut summaries = Vec::with_capacity(expected);
        while summaries.len() < expected {
            match rx.recv().await {
                Some(summary) => {
                    debug!(
                        task = summary.task().id(),
                        done = summaries.len() + 1,
                        expected,
                        "completion signal"
                    );
                    if let Some(ref callback) = on_complete {
                        callback(&summary);
                    }
                    summaries.push(summary);
                }
                None => {
                    error!(
                        "all workers stopped after {} of {} tasks completed",
                        summaries.len(),
                        expected
                    );
                    break;
                }
            }
        }
        summaries
    }
}

/// Cloneable handle used by workers to create signals.
#[derive(Clone)]
pub struct CompletionNotifier {
    tx: mpsc::UnboundedSender<Summary>,
}

impl CompletionNotifier {
    /// Arm a signal for `task`.
    pub fn signal(&self, task: &DownloadTask) -> CompletionSignal {
        CompletionSignal {
            tx: self.tx.clone(),
            pending: Some(task.clone()),
        }
    }
}

/// Emits exactly one summary for one task.
pub struct CompletionSignal {
    tx: mpsc::UnboundedSender<Summary>,
    pending: Option<DownloadTask>,
}

impl CompletionSignal {
    /// Report the task's final summary.
    pub fn complete(mut self, summary: Summary) {
        self.pending = None;
        let _ = self.tx.send(summary);
    }
}

impl Drop for CompletionSignal {
    fn drop(&mut self) {
        if let Some(task) = self.pending.take() {
            let _ = self
                .tx
                .send(Summary::failed(task, 0, None, "worker stopped before the task finished"));
        }
    }
}
