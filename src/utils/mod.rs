//! Shared utility functions.
//!
//! - [`accessions`] - accession list file parsing
//! - [`output_dir`] - output directory creation and write check

pub mod accessions;
pub mod output_dir;

pub use accessions::{parse_accession_list, read_accession_list};
pub use output_dir::prepare_output_dir;
