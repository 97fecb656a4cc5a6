//! Configuration structures and defaults for the downloader.
//!
//! ```rust
//! use srafetch::downloader::DownloadCallback;
//! use srafetch::download::{Summary, Status};
//!
//! let callback: DownloadCallback = Box::new(|summary: &Summary| {
//!     match summary.status() {
//!         Status::Success => println!("✓ {}", summary.task().filename()),
//!         Status::Fail(msg) => println!("✗ {} - {}", summary.task().filename(), msg),
//!     }
//! });
//! ```

use crate::download::Summary;
use crate::session::Connector;
use crate::StyleOptions;

use indicatif::MultiProgress;

use std::env::current_dir;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Callback type for download completion events
pub type DownloadCallback = Box<dyn Fn(&Summary) + Send + Sync>;

/// Default number of workers.
pub const DEFAULT_WORKERS: usize = 4;
/// Default bound on establishing a session.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration structure for the downloader
#[derive(Clone)]
pub struct DownloaderConfig {
    /// Directory where to store the downloaded files.
    pub directory: PathBuf,
    /// Upper bound on concurrent workers.
    pub workers: usize,
    /// Bound on establishing each session.
    pub connect_timeout: Duration,
    /// FTP control port used by the default connector.
    pub port: u16,
    /// Progress bar style options.
    pub style_options: StyleOptions,
    /// Multi-progress to draw into instead of a private one.
    pub multi_progress: Option<MultiProgress>,
    /// Callback for when each download completes.
    pub on_complete: Option<Arc<DownloadCallback>>,
    /// Session factory; the FTP connector is used when unset.
    pub connector: Option<Arc<dyn Connector>>,
}

impl std::fmt::Debug for DownloaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloaderConfig")
            .field("directory", &self.directory)
            .field("workers", &self.workers)
            .field("connect_timeout", &self.connect_timeout)
            .field("port", &self.port)
            .field("style_options", &self.style_options)
            .field("multi_progress", &self.multi_progress.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("connector", &self.connector.is_some())
            .finish()
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            directory: current_dir().unwrap_or_default(),
            workers: DEFAULT_WORKERS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            port: crate::session::ftp::DEFAULT_PORT,
            style_options: StyleOptions::default(),
            multi_progress: None,
            on_complete: None,
            connector: None,
        }
    }
}
