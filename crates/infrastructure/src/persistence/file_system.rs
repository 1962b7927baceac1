//! Real file system implementation.

use std::path::Path;

use centinela_application::ports::{FileSystem, FileSystemError};
use tokio::fs;

/// Real file system implementation using `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    /// Creates a new `TokioFileSystem`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn classify(path: &Path, error: std::io::Error) -> FileSystemError {
    match error.kind() {
        std::io::ErrorKind::NotFound => FileSystemError::NotFound(path.to_path_buf()),
        std::io::ErrorKind::PermissionDenied => FileSystemError::PermissionDenied(path.to_path_buf()),
        _ => FileSystemError::Io(error),
    }
}

impl FileSystem for TokioFileSystem {
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, FileSystemError> {
        fs::read(path).await.map_err(|e| classify(path, e))
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write next to the target, then rename over it
        let staging = path.with_extension("tmp");
        fs::write(&staging, contents)
            .await
            .map_err(|e| classify(&staging, e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&staging, std::fs::Permissions::from_mode(0o600)).await?;
        }
        fs::rename(&staging, path)
            .await
            .map_err(|e| classify(path, e))
    }

    async fn remove_file(&self, path: &Path) -> Result<(), FileSystemError> {
        match fs::remove_file(path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(classify(path, e)),
            _ => Ok(()),
        }
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::metadata(path).await.is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_creates_parents_and_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");
        let fs = TokioFileSystem::new();

        fs.write_file(&path, b"{}\n").await.unwrap();
        assert!(fs.exists(&path).await);
        assert_eq!(fs.read_file(&path).await.unwrap(), b"{}\n");
        assert!(!fs.exists(&path.with_extension("tmp")).await);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let fs = TokioFileSystem::new();

        assert!(matches!(
            fs.read_file(&path).await,
            Err(FileSystemError::NotFound(_))
        ));
        assert!(fs.remove_file(&path).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_written_files_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        TokioFileSystem::new().write_file(&path, b"{}").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
