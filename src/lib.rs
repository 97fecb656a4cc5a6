//! srafetch resolves sequencing run accessions to their FASTQ files and
//! downloads them concurrently over FTP.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use srafetch::{resolve_all, DownloadTask, DownloaderBuilder, EnaResolver, Error, ResolvePolicy};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let resolver = EnaResolver::new()?;
//! let accessions = vec!["SRR000001".to_string()];
//! let locations = resolve_all(&resolver, &accessions, ResolvePolicy::Abort).await?;
//!
//! let output = PathBuf::from("fastq");
//! let tasks = DownloadTask::from_locations(locations, &output);
//! let downloader = DownloaderBuilder::new().directory(output).workers(2).build();
//! downloader.download(tasks).await;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`resolver`] - Accession to file location lookups
//! - [`download`] - Remote locations, download tasks and their summaries
//! - [`downloader`] - The worker pool and its builder
//! - [`session`] - Transfer sessions, with the FTP implementation
//! - [`progress`] - Progress bar styling and the per-transfer reporter
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`http`] - HTTP client used for lookups
//! - [`utils`] - Accession lists and output directory checks

pub mod download;
pub mod downloader;
pub mod error;
pub mod http;
pub mod progress;
pub mod resolver;
pub mod session;
pub mod utils;

pub use download::{DownloadTask, RemoteLocation, Status, Summary, TaskId};
pub use downloader::{Downloader, DownloaderBuilder};
pub use error::{Error, Result};
pub use http::{create_http_client, HttpClientConfig};
pub use progress::{ProgressBarOpts, StyleOptions};
pub use resolver::{resolve_all, EnaResolver, LinkResolver, ResolvePolicy};
pub use session::{Connector, FtpConnector, TransferSession};
