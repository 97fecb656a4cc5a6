//! Byte-counting stream decorator.
//!
//! [`ProgressReader`] wraps any [`AsyncRead`] and reports every chunk it
//! yields to a [`ProgressObserver`], so transports do not need to know about
//! progress at all.

use crate::progress::ProgressHandle;

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// Receiver of byte-count increments.
pub trait ProgressObserver {
    fn advance(&self, delta: u64);
}

impl ProgressObserver for ProgressHandle {
    fn advance(&self, delta: u64) {
        ProgressHandle::advance(self, delta)
    }
}

impl ProgressObserver for AtomicU64 {
    fn advance(&self, delta: u64) {
        self.fetch_add(delta, Ordering::Relaxed);
    }
}

/// An [`AsyncRead`] adapter forwarding the size of each chunk read.
pub struct ProgressReader<'a, R, O: ?Sized> {
    inner: R,
    observer: &'a O,
    transferred: u64,
}

impl<'a, R, O> ProgressReader<'a, R, O>
where
    R: AsyncRead + Unpin,
    O: ProgressObserver + ?Sized,
{
    pub fn new(inner: R, observer: &'a O) -> Self {
        Self {
            inner,
            observer,
            transferred: 0,
        }
    }

    /// Bytes that went through the reader so far.
    pub fn transferred(&self) -> u64 {
        self.transferred
    }
}

impl<R, O> AsyncRead for ProgressReader<'_, R, O>
where
    R: AsyncRead + Unpin,
    O: ProgressObserver + ?Sized,
{
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let poll = Pin::new(&mut self.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            let read = (buf.filled().len() - before) as u64;
            if read > 0 {
                self.transferred += read;
                self.observer.advance(read);
            }
        }
        poll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_counts_every_chunk() {
        let data = vec![7u8; 10_000];
        let counter = AtomicU64::new(0);
        let mut reader = ProgressReader::new(&data[..], &counter);

        let mut chunk = [0u8; 4096];
        let mut seen = Vec::new();
        loop {
            let n = reader.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            seen.push(n);
        }

        assert_eq!(seen, vec![4096, 4096, 1808]);
        assert_eq!(reader.transferred(), 10_000);
        assert_eq!(counter.load(Ordering::Relaxed), 10_000);
    }

    #[tokio::test]
    async fn test_empty_stream_reports_nothing() {
        let counter = AtomicU64::new(0);
        let mut reader = ProgressReader::new(&b""[..], &counter);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(counter.load(Ordering::Relaxed), 0);
    }
}
