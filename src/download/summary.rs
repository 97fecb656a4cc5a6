//! Download summary functionality.
//!
//! Every task that reaches a terminal state produces exactly one [`Summary`].
//! Summaries are the payload of the completion signal sent to the coordinator.
//!
//! ```rust
//! use srafetch::download::{DownloadTask, Status, Summary};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), srafetch::Error> {
//! let task = DownloadTask::new(0, "ftp.example.org/vol1/a.gz".parse()?, Path::new("."));
//! let summary = Summary::new(task, 2048, Some(2048), Status::Success);
//! assert!(summary.is_success());
//! # Ok(())
//! # }
//! ```

use super::download::DownloadTask;

/// Download status enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Download failed with error message
    Fail(String),
    /// Download completed successfully
    Success,
}

/// Represents a [`DownloadTask`] summary.
#[derive(Debug, Clone)]
pub struct Summary {
    /// Task this summary describes.
    task: DownloadTask,
    /// Bytes written to the local file.
    size: u64,
    /// Size advertised by the server, if it answered the size query.
    expected_size: Option<u64>,
    /// Status.
    status: Status,
}

impl Summary {
    /// Create a new [`Summary`].
    pub fn new(task: DownloadTask, size: u64, expected_size: Option<u64>, status: Status) -> Self {
        Self {
            task,
            size,
            expected_size,
            status,
        }
    }

    /// Summary of a task that failed with `msg`.
    pub fn failed(
        task: DownloadTask,
        size: u64,
        expected_size: Option<u64>,
        msg: impl std::fmt::Display,
    ) -> Self {
        Self::new(task, size, expected_size, Status::Fail(msg.to_string()))
    }

    /// Get the summary's size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Size advertised by the remote server.
    pub fn expected_size(&self) -> Option<u64> {
        self.expected_size
    }

    /// Get a reference to the summary's task.
    pub fn task(&self) -> &DownloadTask {
        &self.task
    }

    /// Get a reference to the summary's status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn create_test_task() -> DownloadTask {
        DownloadTask::new(
            0,
            "ftp.example.org/vol1/test.fastq.gz".parse().unwrap(),
            Path::new("out"),
        )
    }

    #[test]
    fn test_summary_creation() {
        let summary = Summary::new(create_test_task(), 4096, Some(4096), Status::Success);

        assert_eq!(summary.size(), 4096);
        assert_eq!(summary.expected_size(), Some(4096));
        assert_eq!(summary.task().filename(), "test.fastq.gz");
        assert_eq!(summary.status(), &Status::Success);
        assert!(summary.is_success());
    }

    #[test]
    fn test_summary_failed() {
        let summary = Summary::failed(create_test_task(), 10, Some(20), "stream: reset");

        match summary.status() {
            Status::Fail(msg) => assert_eq!(msg, "stream: reset"),
            _ => panic!("Expected Fail status"),
        }
        assert_eq!(summary.size(), 10);
        assert!(!summary.is_success());
    }
}
