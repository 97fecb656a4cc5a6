//! Progress module containing progress reporting functionality.
//!
//! - `style` - Progress bar styling options and templates
//! - `reporter` - The render task multiplexing one bar per in-flight transfer
//! - `reader` - A byte-counting stream decorator feeding a progress handle
//! - `writer` - A log writer that suspends the bars while a line is printed
//!
//! # Examples
//!
//! ## Custom Progress Bar Styling
//!
//! ```rust
//! use srafetch::progress::{StyleOptions, ProgressBarOpts};
//!
//! let style_options = StyleOptions::new(
//!     ProgressBarOpts::new(
//!         Some("[{bar:40.cyan/blue}] {pos}/{len} {msg}".to_string()),
//!         Some(ProgressBarOpts::CHARS_FINE.to_string()),
//!         true,
//!         false
//!     ),
//!     ProgressBarOpts::with_transfer_style(),
//! );
//! ```
//!
//! ## Using with Downloader
//!
//! ```rust
//! use srafetch::downloader::DownloaderBuilder;
//! use srafetch::progress::StyleOptions;
//!
//! let downloader = DownloaderBuilder::new()
//!     .style_options(StyleOptions::default())
//!     .build();
//! ```

pub(crate) mod reader;
pub(crate) mod reporter;
pub(crate) mod style;
pub(crate) mod writer;

pub use reader::{ProgressObserver, ProgressReader};
pub use reporter::{ProgressHandle, ProgressRegistry, ProgressReporter, TransferProgress};
pub use style::{ProgressBarOpts, StyleOptions};
pub use writer::{ProgressWriter, SuspendedWriter};
