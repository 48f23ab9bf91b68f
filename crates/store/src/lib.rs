pub mod backend;
pub mod catalog_store;

use std::path::PathBuf;

pub use backend::{BlobStore, FileBlobStore, InMemoryBlobStore, StoreError};
pub use catalog_store::{CatalogStore, Committed, Flush, Hydration};

/// Opens the catalog persisted at `path`, hydrating it if the file exists.
pub async fn open_file(path: impl Into<PathBuf>) -> CatalogStore<FileBlobStore> {
    CatalogStore::open(FileBlobStore::new(path)).await
}
