use std::fmt;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;

/// Storage backend for downloaded artifacts (certificates, provisioning profiles)
///
/// Paths are relative to the backend's root.
pub trait StorageBackend: Send + Sync {
    /// Write bytes at the specified path, replacing existing content
    fn write_bytes(
        &self,
        path: &str,
        data: &[u8],
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>>;

    /// Read the bytes stored at the specified path
    fn read_bytes(
        &self,
        path: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, StorageError>> + Send + '_>>;

    /// Check if something is stored at the specified path
    fn exists(&self, path: &str) -> bool;

    /// Remove the file at the specified path
    fn remove(
        &self,
        path: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>>;
}

/// Storage errors
#[derive(Debug)]
pub enum StorageError {
    /// IO error
    Io(std::io::Error),
    /// Path escapes the storage root or is otherwise unusable
    Path(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "IO error: {}", e),
            StorageError::Path(msg) => write!(f, "Path error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Path(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

/// Filesystem storage rooted at a base directory
///
/// Intended for exported certificates and provisioning profiles. Data is
/// written unencrypted; do not store API keys here.
pub struct FilesystemStorage {
    base_path: PathBuf,
}

impl FilesystemStorage {
    /// Create a new filesystem storage, creating the base directory if needed
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();

        if !base_path.exists() {
            std::fs::create_dir_all(&base_path)?;
        }

        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a relative path below the base directory
    fn resolve_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if path.is_empty() || escapes {
            return Err(StorageError::Path(format!(
                "'{}' must be a relative path inside the storage root",
                path
            )));
        }
        Ok(self.base_path.join(relative))
    }
}

impl StorageBackend for FilesystemStorage {
    fn write_bytes(
        &self,
        path: &str,
        data: &[u8],
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
        let full_path = self.resolve_path(path);
        let data = data.to_vec();

        Box::pin(async move {
            let full_path = full_path?;
            if let Some(parent) = full_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            tokio::fs::write(&full_path, data).await?;
            tracing::debug!("Wrote data to filesystem: {:?}", full_path);
            Ok(())
        })
    }

    fn read_bytes(
        &self,
        path: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, StorageError>> + Send + '_>> {
        let full_path = self.resolve_path(path);

        Box::pin(async move {
            let full_path = full_path?;
            let data = tokio::fs::read(&full_path).await?;
            tracing::debug!("Read data from filesystem: {:?}", full_path);
            Ok(data)
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve_path(path)
            .map(|full_path| full_path.exists())
            .unwrap_or(false)
    }

    fn remove(
        &self,
        path: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
        let full_path = self.resolve_path(path);

        Box::pin(async move {
            let full_path = full_path?;
            tokio::fs::remove_file(&full_path).await?;
            tracing::debug!("Removed file from filesystem: {:?}", full_path);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_filesystem_storage_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilesystemStorage::new(temp_dir.path()).unwrap();

        let test_data = b"\x30\x82\x05\xa0binary";
        storage.write_bytes("dist.cer", test_data).await.unwrap();

        assert!(storage.exists("dist.cer"));

        let read_data = storage.read_bytes("dist.cer").await.unwrap();
        assert_eq!(read_data, test_data);
    }

    #[tokio::test]
    async fn test_filesystem_storage_nested_paths() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilesystemStorage::new(temp_dir.path()).unwrap();

        storage
            .write_bytes("profiles/ios/dev.mobileprovision", b"nested")
            .await
            .unwrap();

        assert!(storage.exists("profiles/ios/dev.mobileprovision"));
    }

    #[tokio::test]
    async fn test_filesystem_storage_remove() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilesystemStorage::new(temp_dir.path()).unwrap();

        storage.write_bytes("old.cer", b"data").await.unwrap();
        storage.remove("old.cer").await.unwrap();
        assert!(!storage.exists("old.cer"));
    }

    #[tokio::test]
    async fn test_filesystem_storage_rejects_escaping_paths() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FilesystemStorage::new(temp_dir.path().join("root")).unwrap();

        let result = storage.write_bytes("../outside.cer", b"data").await;
        assert!(matches!(result, Err(StorageError::Path(_))));

        let result = storage.read_bytes("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::Path(_))));

        assert!(!storage.exists(""));
    }

    #[test]
    fn test_filesystem_storage_creates_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("a/b/c");
        let storage = FilesystemStorage::new(&base).unwrap();
        assert!(storage.base_path().is_dir());
    }
}
