use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("signed URL generation failed: {0}")]
    SignedUrl(String),
}

/// A stored object addressable through a time-limited signed URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub filename: String,
}

/// Seam to the object-storage collaborator used for CSV exports. The agent
/// core only ever uploads bytes and hands the returned URL to the model; the
/// concrete store (cloud bucket, local directory in development) lives
/// outside this crate.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        expiry_minutes: u32,
    ) -> Result<StoredObject, ObjectStoreError>;
}
