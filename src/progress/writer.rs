//! Log output that does not tear through the progress bars.
//!
//! [`ProgressWriter`] is a `tracing-subscriber` [`MakeWriter`] that hides the
//! bars of a [`MultiProgress`] while a log line is written, then redraws them.
//! Hand the same `MultiProgress` to the downloader so both sides share it.
//!
//! ```rust
//! use indicatif::MultiProgress;
//! use srafetch::progress::ProgressWriter;
//! use srafetch::DownloaderBuilder;
//!
//! let multi = MultiProgress::new();
//! let subscriber = tracing_subscriber::fmt()
//!     .with_writer(ProgressWriter::new(multi.clone()))
//!     .finish();
//! let downloader = DownloaderBuilder::new().multi_progress(multi).build();
//! # drop(subscriber);
//! ```

use indicatif::MultiProgress;
use std::io;
use tracing_subscriber::fmt::MakeWriter;

/// Writes log lines between progress redraws.
#[derive(Debug, Clone)]
pub struct ProgressWriter<M = fn() -> io::Stderr> {
    multi: MultiProgress,
    inner: M,
}

impl ProgressWriter {
    /// Log to stderr, the stream the bars are drawn on.
    pub fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            inner: io::stderr,
        }
    }
}

impl<M> ProgressWriter<M> {
    /// Log to another sink.
    pub fn with_writer(multi: MultiProgress, inner: M) -> Self {
        Self { multi, inner }
    }
}

impl<'a, M> MakeWriter<'a> for ProgressWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SuspendedWriter<'a, M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SuspendedWriter {
            multi: &self.multi,
            inner: self.inner.make_writer(),
        }
    }
}

/// One write session with the bars suspended around each write.
pub struct SuspendedWriter<'a, W> {
    multi: &'a MultiProgress,
    inner: W,
}

impl<W: io::Write> io::Write for SuspendedWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let inner = &mut self.inner;
        self.multi.suspend(|| inner.write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let inner = &mut self.inner;
        self.multi.suspend(|| inner.write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        let inner = &mut self.inner;
        self.multi.suspend(|| inner.flush())
    }
}
