use async_trait::async_trait;
use rand::RngCore;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use srafetch::download::{DownloadTask, RemoteLocation};
use srafetch::progress::{ProgressBarOpts, StyleOptions};
use srafetch::session::{Connector, DataStream, TransferSession};
use srafetch::{DownloaderBuilder, Error, Result};

// Common test constants
pub const TEST_SERVER: &str = "127.0.0.1";
pub const TEST_ACCESSION: &str = "SRR000001";

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates random file content of the given size
pub fn create_test_content(size: usize) -> Vec<u8> {
    let mut content = vec![0u8; size];
    rand::rng().fill_bytes(&mut content);
    content
}

/// Path of a FASTQ file of `accession`, as laid out on the archive
pub fn fastq_path(accession: &str, suffix: &str) -> String {
    format!(
        "vol1/fastq/{}/{}/{}{}.fastq.gz",
        &accession[..6],
        accession,
        accession,
        suffix
    )
}

/// Creates a location on the test server
pub fn create_test_location(path: &str) -> RemoteLocation {
    RemoteLocation::new(TEST_SERVER, path).expect("Failed to create location")
}

/// Creates tasks for `paths` on the test server, writing into `directory`
pub fn create_test_tasks(paths: &[String], directory: &Path) -> Vec<DownloadTask> {
    DownloadTask::from_locations(paths.iter().map(|p| create_test_location(p)), directory)
}

/// Creates a quiet downloader builder writing into `directory`
pub fn create_test_downloader_builder(directory: &Path) -> DownloaderBuilder {
    DownloaderBuilder::hidden()
        .directory(directory.to_path_buf())
        .connect_timeout(Duration::from_secs(2))
}

/// Creates disabled style options for testing
pub fn create_disabled_style_options() -> StyleOptions {
    StyleOptions::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden())
}

/// Asserts that a file exists and holds exactly `expected`
pub fn assert_file_content(path: &Path, expected: &[u8]) {
    let content = fs::read(path).unwrap_or_else(|e| panic!("Failed to read {:?}: {}", path, e));
    assert_eq!(content.len(), expected.len(), "File size mismatch at path: {:?}", path);
    assert!(content == expected, "File content mismatch at path: {:?}", path);
}

/// Asserts that a file has the expected size
pub fn assert_file_size(path: &Path, expected_size: u64) {
    let metadata = fs::metadata(path).expect("Failed to get file metadata");
    assert_eq!(
        metadata.len(),
        expected_size,
        "File size mismatch at path: {:?}",
        path
    );
}

// === In-memory transport ===

/// A connector serving files from memory, with switches for failure modes.
#[derive(Clone, Default)]
pub struct FakeConnector {
    files: Arc<HashMap<String, Vec<u8>>>,
    unreachable: Arc<HashSet<String>>,
    panic_on: Arc<HashSet<String>>,
    size_unsupported: bool,
    latency: Duration,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl FakeConnector {
    pub fn new(files: HashMap<String, Vec<u8>>) -> Self {
        Self {
            files: Arc::new(files),
            ..Self::default()
        }
    }

    /// Refuse connections to `server`.
    pub fn unreachable(mut self, server: &str) -> Self {
        let mut servers = (*self.unreachable).clone();
        servers.insert(server.to_string());
        self.unreachable = Arc::new(servers);
        self
    }

    /// Panic when `path` is retrieved.
    pub fn panic_on(mut self, path: &str) -> Self {
        let mut paths = (*self.panic_on).clone();
        paths.insert(path.to_string());
        self.panic_on = Arc::new(paths);
        self
    }

    pub fn size_unsupported(mut self) -> Self {
        self.size_unsupported = true;
        self
    }

    /// Hold every retrieve for `latency`.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn max_concurrent_sessions(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn open(&self, server: &str, _timeout: Duration) -> Result<Box<dyn TransferSession>> {
        if self.unreachable.contains(server) {
            return Err(Error::Connect {
                server: server.to_string(),
                reason: "connection refused".into(),
            });
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            connector: self.clone(),
        }))
    }
}

struct FakeSession {
    connector: FakeConnector,
}

#[async_trait]
impl TransferSession for FakeSession {
    async fn size(&mut self, path: &str) -> Result<u64> {
        if self.connector.size_unsupported {
            return Err(Error::SizeQuery {
                path: path.to_string(),
                reason: "502 command not implemented".into(),
            });
        }
        match self.connector.files.get(path) {
            Some(data) => Ok(data.len() as u64),
            None => Err(Error::SizeQuery {
                path: path.to_string(),
                reason: "550 no such file".into(),
            }),
        }
    }

    async fn retrieve(&mut self, path: &str) -> Result<DataStream> {
        if self.connector.panic_on.contains(path) {
            panic!("simulated worker crash on {}", path);
        }
        if !self.connector.latency.is_zero() {
            tokio::time::sleep(self.connector.latency).await;
        }
        match self.connector.files.get(path) {
            Some(data) => Ok(Box::new(Cursor::new(data.clone()))),
            None => Err(Error::Retrieve {
                path: path.to_string(),
                reason: "550 no such file".into(),
            }),
        }
    }

    async fn finish_retrieve(&mut self) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) {
        self.connector.closed.fetch_add(1, Ordering::SeqCst);
        self.connector.active.fetch_sub(1, Ordering::SeqCst);
    }
}
