use std::path::PathBuf;

use async_trait::async_trait;
use invochat_core::{ObjectStore, ObjectStoreError, StoredObject};

/// Filesystem-backed object store for development deployments. Exports land
/// under `<root>/sessiondumps/` and are served from `<public_base_url>`;
/// expiry is advisory only here, enforced by whatever serves the files.
pub struct FsObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        expiry_minutes: u32,
    ) -> Result<StoredObject, ObjectStoreError> {
        let dir = self.root.join("sessiondumps");
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|err| ObjectStoreError::Upload(err.to_string()))?;
        tokio::fs::write(dir.join(filename), bytes)
            .await
            .map_err(|err| ObjectStoreError::Upload(err.to_string()))?;
        tracing::debug!(filename, expiry_minutes, "stored export file");

        Ok(StoredObject {
            url: format!("{}/sessiondumps/{filename}", self.public_base_url),
            filename: filename.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_file_and_builds_public_url() {
        let dir = std::env::temp_dir().join(format!("invochat-store-{}", std::process::id()));
        let store = FsObjectStore::new(&dir, "http://localhost:8080/files/");

        let stored = store
            .put("20240101_000000_query_result.csv", b"a,b\r\n".to_vec(), 60)
            .await
            .unwrap();

        assert_eq!(
            stored.url,
            "http://localhost:8080/files/sessiondumps/20240101_000000_query_result.csv"
        );
        let written = tokio::fs::read(dir.join("sessiondumps").join(&stored.filename))
            .await
            .unwrap();
        assert_eq!(written, b"a,b\r\n");
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
