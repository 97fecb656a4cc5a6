//! Output directory preparation.

use crate::error::Result;

use std::path::Path;
use tokio::fs;
use tracing::debug;

const CHECK_FILE_NAME: &str = ".srafetch-write-check";

/// Create `directory` if needed and check that files can be written into it.
///
/// Fails with [`crate::Error::IOError`] when the directory cannot be created
/// or a file cannot be created inside it.
pub async fn prepare_output_dir(directory: &Path) -> Result<()> {
    debug!("Creating destination directory {:?}", directory);
    fs::create_dir_all(directory).await?;

    let check_file = directory.join(CHECK_FILE_NAME);
    fs::write(&check_file, b"").await?;
    fs::remove_file(&check_file).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_nested_directory() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("a").join("b");

        prepare_output_dir(&target).await.unwrap();

        assert!(target.is_dir());
        assert!(!target.join(CHECK_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_rejects_file_in_the_way() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("occupied");
        std::fs::write(&target, b"not a directory").unwrap();

        assert!(prepare_output_dir(&target).await.is_err());
    }
}
