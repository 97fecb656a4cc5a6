//! Download module containing the task data model.
//!
//! - [`download`] - [`RemoteLocation`] parsing and the immutable [`DownloadTask`]
//! - [`summary`] - per-task terminal result tracking
//!
//! # Examples
//!
//! ```rust
//! use srafetch::download::{DownloadTask, RemoteLocation, Status, Summary};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), srafetch::Error> {
//! let location: RemoteLocation = "ftp.example.org/vol1/a_1.fastq.gz".parse()?;
//! let task = DownloadTask::new(0, location, Path::new("output"));
//! let summary = Summary::failed(task, 0, None, "connect: refused");
//!
//! match summary.status() {
//!     Status::Success => println!("done"),
//!     Status::Fail(msg) => println!("failed: {}", msg),
//! }
//! # Ok(())
//! # }
//! ```

#[allow(clippy::module_inception)]
pub mod download;
pub mod summary;

pub use download::{colliding_destinations, DownloadTask, RemoteLocation, TaskId};
pub use summary::{Status, Summary};
