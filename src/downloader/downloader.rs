//! Core downloader implementation: the bounded worker pool.
//!
//! All tasks are put on a queue up front. At most `workers` workers drain it,
//! each running one task at a time. The batch ends when every task has sent
//! its completion signal.
//!
//! # Examples
//!
//! ```rust,no_run
//! use srafetch::downloader::DownloaderBuilder;
//! use srafetch::download::{DownloadTask, RemoteLocation};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let locations = vec![
//!     "ftp.sra.ebi.ac.uk/vol1/fastq/SRR000/SRR000001/SRR000001_1.fastq.gz".parse::<RemoteLocation>()?,
//!     "ftp.sra.ebi.ac.uk/vol1/fastq/SRR000/SRR000001/SRR000001_2.fastq.gz".parse::<RemoteLocation>()?,
//! ];
//! let tasks = DownloadTask::from_locations(locations, Path::new("fastq"));
//!
//! let downloader = DownloaderBuilder::new().workers(2).build();
//! for summary in downloader.download(tasks).await {
//!     println!("{} - {:?}", summary.task().filename(), summary.status());
//! }
//! # Ok(())
//! # }
//! ```

use super::completion::CompletionCoordinator;
use super::config::DownloaderConfig;
use super::worker::Worker;
use crate::download::{DownloadTask, Summary};
use crate::progress::ProgressReporter;
use crate::session::{Connector, FtpConnector};

use std::fmt;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info};

/// Represents the download controller.
///
/// A downloader can be created via its builder:
///
/// ```rust
/// # fn main()  {
/// use srafetch::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().build();
/// # }
/// ```
#[derive(Clone)]
pub struct Downloader {
    config: DownloaderConfig,
}

impl Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("config", &self.config)
            .finish()
    }
}

/// Number of workers started for `tasks` tasks: never more than there are
/// tasks, never fewer than one when there is work.
pub fn effective_workers(configured: usize, tasks: usize) -> usize {
    configured.max(1).min(tasks)
}

impl Downloader {
    /// Creates a new Downloader with the given configuration.
    pub(crate) fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    /// Gets the directory where files will be downloaded.
    pub fn directory(&self) -> &PathBuf {
        &self.config.directory
    }

    /// Gets the configured upper bound on concurrent workers.
    pub fn workers(&self) -> usize {
        self.config.workers
    }

    /// Gets the bound on establishing each session.
    pub fn connect_timeout(&self) -> Duration {
        self.config.connect_timeout
    }

    /// Gets the FTP control port of the default connector.
    pub fn port(&self) -> u16 {
        self.config.port
    }

    fn connector(&self) -> Arc<dyn Connector> {
        match self.config.connector {
            Some(ref connector) => connector.clone(),
            None => Arc::new(FtpConnector::new().port(self.config.port)),
        }
    }

    /// Run every task and return one summary per task, in completion order.
    ///
    /// Task failures never abort the batch: they show up as
    /// [`Status::Fail`](crate::download::Status::Fail) summaries.
    pub async fn download(&self, tasks: Vec<DownloadTask>) -> Vec<Summary> {
        let total = tasks.len();
        if total == 0 {
            debug!("nothing to download");
            return Vec::new();
        }
        let workers = effective_workers(self.config.workers, total);
        info!(tasks = total, workers, "starting downloads");

        let style_options = self.config.style_options.clone();
        let reporter = match self.config.multi_progress {
            Some(ref multi) => {
                ProgressReporter::with_multi_progress(multi.clone(), style_options, total)
            }
            None => ProgressReporter::new(style_options, total),
        };

        // Fill the queue and close it, so an empty queue means the batch is drained.
        let (tx, rx) = mpsc::channel(total);
        for task in tasks {
            if tx.send(task).await.is_err() {
                error!("task queue closed while filling it");
                break;
            }
        }
        drop(tx);
        let queue = Arc::new(Mutex::new(rx));

        let coordinator =
            CompletionCoordinator::new(total).with_callback(self.config.on_complete.clone());
        let connector = self.connector();

        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let worker = Worker {
                    id,
                    queue: queue.clone(),
                    connector: connector.clone(),
                    progress: reporter.registry(),
                    completion: coordinator.notifier(),
                    connect_timeout: self.config.connect_timeout,
                };
                tokio::spawn(worker.run())
            })
            .collect();

        let summaries = coordinator.wait().await;

        for (id, joined) in futures::future::join_all(handles)
            .await
            .into_iter()
            .enumerate()
        {
            match joined {
                Ok(handled) => debug!(worker = id, handled, "worker done"),
                Err(e) => error!(worker = id, "worker stopped abnormally: {}", e),
            }
        }

        reporter.shutdown().await;
        summaries
    }
}
