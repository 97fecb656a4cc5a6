//! Downloader module containing the worker pool, its builder, and configuration.
//!
//! - `downloader` - Core Downloader struct running a batch of tasks
//! - `builder` - DownloaderBuilder for configuring a downloader
//! - `config` - Configuration structures and callback types
//! - `completion` - One completion signal per task, and the coordinator waiting on them
//! - `worker` - The loop each worker runs over the shared task queue
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use srafetch::downloader::DownloaderBuilder;
//! use srafetch::download::DownloadTask;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = DownloaderBuilder::new().build();
//!
//! let tasks = DownloadTask::from_locations(
//!     vec!["ftp.sra.ebi.ac.uk/vol1/fastq/SRR000/SRR000001/SRR000001.fastq.gz".parse()?],
//!     Path::new("."),
//! );
//!
//! let summaries = downloader.download(tasks).await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Hidden Progress Bars
//!
//! ```rust
//! use srafetch::downloader::DownloaderBuilder;
//!
//! let downloader = DownloaderBuilder::hidden().workers(2).build();
//! ```

pub mod builder;
pub mod completion;
pub mod config;
pub mod downloader;
pub mod worker;

pub use builder::DownloaderBuilder;
pub use completion::{CompletionCoordinator, CompletionNotifier, CompletionSignal};
pub use config::{DownloadCallback, DownloaderConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_WORKERS};
pub use downloader::{effective_workers, Downloader};
pub use worker::WorkerState;
