//! Progress multiplexing across concurrent transfers.
//!
//! The [`ProgressReporter`] owns a single render task. Workers never touch the
//! terminal or the bars directly: they hold a [`ProgressHandle`] whose methods
//! push events onto an unbounded channel, so an `advance` never waits on
//! terminal rendering. The render task is the only writer of the bar state and
//! applies events one at a time, so updates from different transfers cannot
//! interleave a partial render.
//!
//! # Examples
//!
//! ```rust
//! use srafetch::progress::{ProgressReporter, StyleOptions};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let reporter = ProgressReporter::new(StyleOptions::hidden(), 1);
//! let handle = reporter.registry().register(0, "a_1.fastq.gz", Some(1024));
//! handle.advance(512);
//! handle.advance(512);
//! handle.finish(true);
//!
//! let snapshot = reporter.snapshot().await;
//! assert_eq!(snapshot[&0].bytes, 1024);
//! reporter.shutdown().await;
//! # }
//! ```

use crate::download::TaskId;
use crate::progress::StyleOptions;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

const SPINNER_TICK: Duration = Duration::from_millis(120);

/// Per-task progress as recorded by the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes reported through `advance`.
    pub bytes: u64,
    /// Total announced at registration, if known.
    pub total: Option<u64>,
    /// Whether the transfer has been finished.
    pub finished: bool,
    /// Outcome reported at finish. Meaningless until `finished` is set.
    pub success: bool,
}

enum ProgressEvent {
    Register {
        id: TaskId,
        label: String,
        total: Option<u64>,
    },
    SetTotal {
        id: TaskId,
        total: u64,
    },
    Advance {
        id: TaskId,
        delta: u64,
    },
    Finish {
        id: TaskId,
        success: bool,
    },
    Snapshot(oneshot::Sender<BTreeMap<TaskId, TransferProgress>>),
}

/// Render state, owned by the render task only.
struct RenderState {
    multi: MultiProgress,
    main: ProgressBar,
    style_options: StyleOptions,
    bars: HashMap<TaskId, ProgressBar>,
    progress: BTreeMap<TaskId, TransferProgress>,
}

impl RenderState {
    fn new(style_options: StyleOptions, total_tasks: usize, multi: Option<MultiProgress>) -> Self {
        let multi = match (multi, style_options.is_enabled()) {
            (Some(multi), _) => multi,
            (None, true) => MultiProgress::new(),
            (None, false) => MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        };
        let main_opts = style_options.main();
        let main = main_opts.clone().to_progress_bar(total_tasks as u64);
        let main = match main_opts.enabled {
            true => multi.add(main),
            false => main,
        };
        main.tick();

        Self {
            multi,
            main,
            style_options,
            bars: HashMap::new(),
            progress: BTreeMap::new(),
        }
    }

    fn apply(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Register { id, label, total } => {
                let child = self.style_options.child();
                let bar = match total {
                    Some(len) => child.clone().to_progress_bar(len),
                    None => child.to_spinner(),
                };
                // Hidden bars stay out of the multi-progress, adding them would draw them.
                if child.enabled {
                    let bar = self.multi.add(bar.clone());
                    if total.is_none() {
                        bar.enable_steady_tick(SPINNER_TICK);
                    }
                }
                bar.set_message(label);
                if let Some(previous) = self.bars.insert(id, bar) {
                    debug!(task = id, "progress registered twice, dropping the previous bar");
                    previous.finish_and_clear();
                }
                self.progress.insert(
                    id,
                    TransferProgress {
                        bytes: 0,
                        total,
                        finished: false,
                        success: false,
                    },
                );
            }
            ProgressEvent::SetTotal { id, total } => {
                if let Some(progress) = self.progress.get_mut(&id) {
                    progress.total = Some(total);
                }
                if let Some(bar) = self.bars.get(&id) {
                    let child = self.style_options.child();
                    if child.enabled {
                        bar.disable_steady_tick();
                        bar.set_style(child.clone().to_progress_style());
                    }
                    bar.set_length(total);
                }
            }
            ProgressEvent::Advance { id, delta } => {
                if let Some(progress) = self.progress.get_mut(&id) {
                    if progress.finished {
                        return;
                    }
                    progress.bytes += delta;
                }
                if let Some(bar) = self.bars.get(&id) {
                    bar.inc(delta);
                }
            }
            ProgressEvent::Finish { id, success } => {
                if let Some(progress) = self.progress.get_mut(&id) {
                    progress.finished = true;
                    progress.success = success;
                }
                if let Some(bar) = self.bars.remove(&id) {
                    if self.style_options.child().clear {
                        bar.finish_and_clear();
                    } else {
                        bar.finish();
                    }
                }
                self.main.inc(1);
            }
            ProgressEvent::Snapshot(reply) => {
                let _ = reply.send(self.progress.clone());
            }
        }
    }

    fn finish(self) {
        for (_, bar) in self.bars {
            bar.finish_and_clear();
        }
        if self.style_options.main().clear {
            self.main.finish_and_clear();
        } else {
            self.main.finish();
        }
    }
}

/// Owner of the render task.
pub struct ProgressReporter {
    registry: ProgressRegistry,
    render: JoinHandle<()>,
}

impl ProgressReporter {
    /// Start the render task. Must be called within a tokio runtime.
    ///
    /// # Arguments
    /// * `style_options` - Style configuration for progress bars
    /// * `total_tasks` - Number of tasks counted by the main progress bar
    pub fn new(style_options: StyleOptions, total_tasks: usize) -> Self {
        Self::start(style_options, total_tasks, None)
    }

    /// Like [`ProgressReporter::new`], drawing into an existing `multi`, e.g.
    /// one shared with a [`ProgressWriter`](crate::progress::ProgressWriter).
    pub fn with_multi_progress(
        multi: MultiProgress,
        style_options: StyleOptions,
        total_tasks: usize,
    ) -> Self {
        Self::start(style_options, total_tasks, Some(multi))
    }

    fn start(style_options: StyleOptions, total_tasks: usize, multi: Option<MultiProgress>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let render = tokio::spawn(async move {
            let mut state = RenderState::new(style_options, total_tasks, multi);
            while let Some(event) = rx.recv().await {
                state.apply(event);
            }
            state.finish();
        });

        Self {
            registry: ProgressRegistry { tx },
            render,
        }
    }

    /// A cloneable registry that workers use to register their transfers.
    pub fn registry(&self) -> ProgressRegistry {
        self.registry.clone()
    }

    /// Copy of the per-task progress recorded so far.
    ///
    /// Events sent before this call are applied before the copy is taken.
    pub async fn snapshot(&self) -> BTreeMap<TaskId, TransferProgress> {
        let (reply, rx) = oneshot::channel();
        if self.registry.tx.send(ProgressEvent::Snapshot(reply)).is_err() {
            return BTreeMap::new();
        }
        rx.await.unwrap_or_default()
    }

    /// Stop accepting events and wait for the render task to drain.
    ///
    /// The render task ends once every outstanding registry and handle has been
    /// dropped.
    pub async fn shutdown(self) {
        drop(self.registry);
        if let Err(e) = self.render.await {
            debug!("progress render task ended abnormally: {}", e);
        }
    }
}

/// Cheap, cloneable entry point for registering transfers.
#[derive(Clone)]
pub struct ProgressRegistry {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressRegistry {
    /// Register a transfer and get the handle that reports its progress.
    ///
    /// A `total` of `None` renders an open-ended byte counter.
    pub fn register(&self, id: TaskId, label: &str, total: Option<u64>) -> ProgressHandle {
        let _ = self.tx.send(ProgressEvent::Register {
            id,
            label: label.to_string(),
            total,
        });
        ProgressHandle {
            id,
            tx: self.tx.clone(),
            finished: false,
        }
    }
}

/// Progress handle of a single transfer.
///
/// Finishing consumes the handle. A handle dropped without being finished
/// reports its transfer as failed.
pub struct ProgressHandle {
    id: TaskId,
    tx: mpsc::UnboundedSender<ProgressEvent>,
    finished: bool,
}

impl ProgressHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Record `delta` more bytes. Never blocks.
    pub fn advance(&self, delta: u64) {
        let _ = self.tx.send(ProgressEvent::Advance { id: self.id, delta });
    }

    /// Turn an open-ended counter into a bounded bar once the size is known.
    pub fn set_total(&self, total: u64) {
        let _ = self.tx.send(ProgressEvent::SetTotal { id: self.id, total });
    }

    /// Mark the transfer as done.
    pub fn finish(mut self, success: bool) {
        self.finished = true;
        let _ = self.tx.send(ProgressEvent::Finish {
            id: self.id,
            success,
        });
    }
}

impl Drop for ProgressHandle {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.tx.send(ProgressEvent::Finish {
                id: self.id,
                success: false,
            });
        }
    }
}
