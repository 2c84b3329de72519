//! Raw blob storage
//!
//! A [`Datastore`] maps blob names to opaque stored bytes. It knows nothing
//! about encryption; see [`crate::blob::EncryptedBlobs`] for that.
//!
//! Backends are provided by `object_store` and picked from a location string:
//!
//! | Location                | Backend                                   |
//! |-------------------------|-------------------------------------------|
//! | `memory://`             | in-memory, private to this handle         |
//! | `file:///some/dir`      | local directory, must already exist       |
//! | `/some/dir`             | same as above                             |
//! | `s3://bucket/prefix`    | S3-compatible, configured from `AWS_*` env |
//! | `http(s)://host/prefix` | read/write over plain HTTP (WebDAV-style) |

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use url::Url;

use crate::blob::BlobName;

const BLOBS_PREFIX: &str = "blobs";

#[derive(Debug, thiserror::Error)]
pub enum DatastoreError {
    #[error("blob not found: {0}")]
    NotFound(BlobName),

    #[error("invalid datastore location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("object storage error: {0}")]
    ObjectStore(#[from] object_store::Error),
}

impl DatastoreError {
    fn invalid(location: &str, reason: impl ToString) -> Self {
        Self::InvalidLocation {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Handle to a blob storage backend. Cheap to clone; clones share the backend.
#[derive(Debug, Clone)]
pub struct Datastore {
    inner: Arc<dyn ObjectStore>,
    prefix: ObjectPath,
    location: String,
}

impl Datastore {
    /// Create an empty in-memory datastore.
    pub fn memory() -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
            prefix: ObjectPath::from(BLOBS_PREFIX),
            location: "memory://".to_string(),
        }
    }

    /// Open a datastore rooted at an existing local directory.
    pub fn local(path: &Path) -> Result<Self, DatastoreError> {
        let location = path.display().to_string();
        if !path.is_dir() {
            return Err(DatastoreError::invalid(&location, "directory does not exist"));
        }
        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| DatastoreError::invalid(&location, e))?;
        Ok(Self {
            inner: Arc::new(store),
            prefix: ObjectPath::from(BLOBS_PREFIX),
            location,
        })
    }

    /// Resolve a location string into a datastore.
    pub fn from_location(location: &str) -> Result<Self, DatastoreError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(DatastoreError::invalid(location, "empty location"));
        }

        let url = match Url::parse(location) {
            // single-letter schemes are Windows drive letters, not URLs
            Ok(url) if url.scheme().len() > 1 => url,
            _ => return Self::local(Path::new(location)),
        };

        match url.scheme() {
            "memory" => Ok(Self::memory()),
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| DatastoreError::invalid(location, "not a local file path"))?;
                Self::local(&path)
            }
            _ => {
                let options = std::env::vars().map(|(k, v)| (k.to_ascii_lowercase(), v));
                let (store, prefix) = object_store::parse_url_opts(&url, options)
                    .map_err(|e| DatastoreError::invalid(location, e))?;
                Ok(Self {
                    inner: Arc::from(store),
                    prefix: prefix.child(BLOBS_PREFIX),
                    location: location.to_string(),
                })
            }
        }
    }

    /// The location string this datastore was opened from
    pub fn location(&self) -> &str {
        &self.location
    }

    fn blob_path(&self, name: &BlobName) -> ObjectPath {
        self.prefix.child(name.to_string())
    }

    /// Read the stored bytes of a blob.
    pub async fn open(&self, name: &BlobName) -> Result<Bytes, DatastoreError> {
        match self.inner.get(&self.blob_path(name)).await {
            Ok(result) => Ok(result.bytes().await?),
            Err(object_store::Error::NotFound { .. }) => Err(DatastoreError::NotFound(*name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Store bytes under a blob name, replacing any previous content.
    pub async fn put(&self, name: &BlobName, data: Bytes) -> Result<(), DatastoreError> {
        tracing::debug!(blob = %name, len = data.len(), "storing blob");
        self.inner.put(&self.blob_path(name), data.into()).await?;
        Ok(())
    }

    /// Check whether a blob exists without reading it.
    pub async fn contains(&self, name: &BlobName) -> Result<bool, DatastoreError> {
        match self.inner.head(&self.blob_path(name)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::blob::BlobType;

    #[tokio::test]
    async fn test_memory_put_open() {
        let store = Datastore::memory();
        let name = BlobName::from_content(BlobType::Static, b"data");

        assert!(!store.contains(&name).await.unwrap());
        store.put(&name, Bytes::from_static(b"data")).await.unwrap();
        assert!(store.contains(&name).await.unwrap());
        assert_eq!(store.open(&name).await.unwrap(), Bytes::from_static(b"data"));
    }

    #[tokio::test]
    async fn test_missing_blob_is_not_found() {
        let store = Datastore::memory();
        let name = BlobName::from_content(BlobType::Static, b"missing");

        let err = store.open(&name).await.unwrap_err();
        assert!(matches!(err, DatastoreError::NotFound(n) if n == name));
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_local_directory_persists() {
        let dir = tempfile::tempdir().unwrap();
        let name = BlobName::from_content(BlobType::Static, b"persisted");

        let store = Datastore::from_location(dir.path().to_str().unwrap()).unwrap();
        store
            .put(&name, Bytes::from_static(b"persisted"))
            .await
            .unwrap();

        let url = Url::from_directory_path(dir.path()).unwrap();
        let reopened = Datastore::from_location(url.as_str()).unwrap();
        assert_eq!(
            reopened.open(&name).await.unwrap(),
            Bytes::from_static(b"persisted")
        );
    }

    #[test]
    fn test_memory_location() {
        let store = Datastore::from_location("memory://").unwrap();
        assert_eq!(store.location(), "memory://");
    }

    #[test]
    fn test_invalid_locations() {
        let err = Datastore::from_location("").unwrap_err();
        assert!(matches!(err, DatastoreError::InvalidLocation { .. }));

        let err = Datastore::from_location("/non-existing/folder").unwrap_err();
        assert!(err.to_string().contains("directory does not exist"));

        let err = Datastore::from_location("file:///non-existing/folder").unwrap_err();
        assert!(err.to_string().contains("directory does not exist"));
    }
}
