//! Transfer sessions: one protocol conversation moving one remote object.
//!
//! The worker pool only talks to the [`Connector`] and [`TransferSession`]
//! traits, so the orchestration does not depend on the transport. The FTP
//! implementation lives in [`ftp`].
//!
//! A session is driven in this order:
//!
//! 1. [`Connector::open`] dials the server and logs in,
//! 2. [`TransferSession::size`] asks for the object's length,
//! 3. [`TransferSession::retrieve`] opens the byte stream,
//! 4. [`transfer_to`] copies the stream into the local sink,
//! 5. [`TransferSession::finish_retrieve`] collects the server's verdict,
//! 6. [`TransferSession::close`] releases the connection, whatever happened before.

pub mod ftp;
pub mod reply;

pub use ftp::FtpConnector;

use crate::error::{Error, Result};

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the buffer used to move bytes from the network to disk.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Owned stream of an object's bytes.
pub type DataStream = Box<dyn AsyncRead + Send + Unpin>;

/// Opens sessions against remote servers.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish and authenticate a session with `server`.
    ///
    /// `timeout` bounds the connection phase only.
    async fn open(&self, server: &str, timeout: Duration) -> Result<Box<dyn TransferSession>>;
}

/// An authenticated session with one server.
#[async_trait]
pub trait TransferSession: Send {
    /// Length in bytes of the object at `path`.
    async fn size(&mut self, path: &str) -> Result<u64>;

    /// Start sending the object at `path`.
    async fn retrieve(&mut self, path: &str) -> Result<DataStream>;

    /// Confirm the retrieve started by [`TransferSession::retrieve`] completed,
    /// once its stream has been read to the end.
    async fn finish_retrieve(&mut self) -> Result<()>;

    /// Release the session. Never fails; errors are only logged.
    async fn close(&mut self);
}

/// Progress of one transfer, owned by the worker running it.
#[derive(Debug, Clone)]
pub struct TransferState {
    pub bytes_transferred: u64,
    pub total_bytes: Option<u64>,
    pub started: Instant,
}

impl TransferState {
    pub fn new() -> Self {
        Self {
            bytes_transferred: 0,
            total_bytes: None,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for TransferState {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy `reader` into `sink` chunk by chunk, in order.
///
/// `state.bytes_transferred` is updated after every chunk written. A failing
/// read is a [`Error::Stream`], a failing write an [`Error::IOError`]; in both
/// cases whatever was already written stays in the sink.
pub async fn transfer_to<W, R>(sink: &mut W, reader: &mut R, state: &mut TransferState) -> Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let read = reader.read(&mut buf).await.map_err(Error::Stream)?;
        if read == 0 {
            break;
        }
        sink.write_all(&buf[..read]).await?;
        state.bytes_transferred += read as u64;
    }
    sink.flush().await?;
    Ok(state.bytes_transferred)
}
