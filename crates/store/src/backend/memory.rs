use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BlobStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    contents: RwLock<Option<Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self { contents: RwLock::new(Some(contents.into())) }
    }

    pub async fn snapshot(&self) -> Option<Vec<u8>> {
        self.contents.read().await.clone()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.contents.read().await.clone())
    }

    async fn write(&self, contents: &[u8]) -> Result<(), StoreError> {
        *self.contents.write().await = Some(contents.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
