//! Accession list files.
//!
//! One accession per line. Surrounding whitespace is ignored, as are blank
//! lines and lines starting with `#`.

use crate::error::Result;

use std::path::Path;

/// Parse the contents of an accession list.
///
/// ```rust
/// use srafetch::utils::parse_accession_list;
///
/// let list = parse_accession_list("SRR000001\n\n# controls\n  SRR000002  \r\n");
/// assert_eq!(list, vec!["SRR000001", "SRR000002"]);
/// ```
pub fn parse_accession_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Read and parse an accession list file.
pub async fn read_accession_list(path: &Path) -> Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(parse_accession_list(&contents))
}
