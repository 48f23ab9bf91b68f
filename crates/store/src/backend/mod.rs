use async_trait::async_trait;
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileBlobStore;
pub use memory::InMemoryBlobStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on `{location}`: {source}")]
    Io { location: String, source: std::io::Error },
    #[error("could not encode catalog: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("could not decode catalog: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Opaque single-key storage holding the serialized catalog.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Current contents, or `None` when nothing has been written yet.
    async fn read(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replaces the whole contents.
    async fn write(&self, contents: &[u8]) -> Result<(), StoreError>;

    /// Human-readable location used in log events.
    fn describe(&self) -> String;
}
