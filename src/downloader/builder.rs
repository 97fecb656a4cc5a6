//! Builder pattern implementation for creating Downloader instances.
//!
//! # Examples
//!
//! ```rust
//! use srafetch::downloader::DownloaderBuilder;
//! use srafetch::download::Status;
//! use indicatif::MultiProgress;
//! use std::path::PathBuf;
//! use std::time::Duration;
//!
//! let downloader = DownloaderBuilder::new()
//!     .directory(PathBuf::from("./fastq"))
//!     .workers(8)
//!     .connect_timeout(Duration::from_secs(10))
//!     .on_complete(|summary| {
//!         if let Status::Fail(msg) = summary.status() {
//!             eprintln!("{} failed: {}", summary.task().location(), msg);
//!         }
//!     })
//!     .build();
//! ```

use super::{config::DownloaderConfig, downloader::Downloader};
use crate::download::Summary;
use crate::session::Connector;
use crate::StyleOptions;

use indicatif::MultiProgress;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A builder used to create a [`Downloader`].
///
/// ```rust
/// # fn main()  {
/// use srafetch::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().workers(2).directory("downloads".into()).build();
/// # }
/// ```
#[derive(Default)]
pub struct DownloaderBuilder {
    config: DownloaderConfig,
}

impl DownloaderBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        DownloaderBuilder::default()
    }

    /// Convenience function to hide the progress bars.
    pub fn hidden() -> Self {
        let mut builder = DownloaderBuilder::default();
        builder.config.style_options = StyleOptions::hidden();
        builder
    }

    /// Sets the directory where to store the downloads.
    pub fn directory(mut self, directory: PathBuf) -> Self {
        self.config.directory = directory;
        self
    }

    /// Set the maximum number of concurrent workers.
    ///
    /// Fewer workers are started when there are fewer tasks.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Set the bound on establishing each session.
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.config.connect_timeout = connect_timeout;
        self
    }

    /// Set the FTP control port of the default connector.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the downloader style options.
    pub fn style_options(mut self, style_options: StyleOptions) -> Self {
        self.config.style_options = style_options;
        self
    }

    /// Draw the bars into `multi`, so that a
    /// [`ProgressWriter`](crate::progress::ProgressWriter) sharing it can keep
    /// log lines off the bars.
    pub fn multi_progress(mut self, multi: MultiProgress) -> Self {
        self.config.multi_progress = Some(multi);
        self
    }

    /// Replace the FTP connector, e.g. with another transport.
    pub fn connector<C>(mut self, connector: C) -> Self
    where
        C: Connector + 'static,
    {
        self.config.connector = Some(Arc::new(connector));
        self
    }

    /// Set callback for when each download completes.
    ///
    /// The callback runs once per task, successful or not, as soon as the
    /// task reaches its terminal state.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Summary) + Send + Sync + 'static,
    {
        self.config.on_complete = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Create the [`Downloader`] with the specified options.
    pub fn build(self) -> Downloader {
        Downloader::new(self.config)
    }
}
