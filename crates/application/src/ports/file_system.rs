//! File system abstraction port.

use std::future::Future;
use std::path::{Path, PathBuf};

/// Error type for file system operations.
#[derive(Debug, thiserror::Error)]
pub enum FileSystemError {
    /// File not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<FileSystemError> for std::io::Error {
    fn from(error: FileSystemError) -> Self {
        match error {
            FileSystemError::Io(e) => e,
            FileSystemError::NotFound(path) => {
                Self::new(std::io::ErrorKind::NotFound, path.display().to_string())
            }
            FileSystemError::PermissionDenied(path) => {
                Self::new(std::io::ErrorKind::PermissionDenied, path.display().to_string())
            }
        }
    }
}

/// Abstraction over the file operations the credential store needs.
///
/// This trait allows mocking file system access in tests.
pub trait FileSystem: Send + Sync {
    /// Reads a file's contents as bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read_file(&self, path: &Path)
    -> impl Future<Output = Result<Vec<u8>, FileSystemError>> + Send;

    /// Writes bytes to a file, creating parent directories as needed.
    /// Implementations restrict access to the owner where the platform allows.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write_file(
        &self,
        path: &Path,
        contents: &[u8],
    ) -> impl Future<Output = Result<(), FileSystemError>> + Send;

    /// Removes a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    fn remove_file(&self, path: &Path) -> impl Future<Output = Result<(), FileSystemError>> + Send;

    /// Checks whether a path exists.
    fn exists(&self, path: &Path) -> impl Future<Output = bool> + Send;
}
