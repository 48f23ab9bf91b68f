use stockroom_core::{
    ApplicationError, Catalog, DomainError, NewProduct, Product, ProductId, ProductPatch,
};
use tracing::{debug, error, info, warn};

use crate::backend::{BlobStore, StoreError};

/// Outcome of writing the whole catalog to the backing store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Flush {
    Persisted,
    Failed { reason: String },
}

impl Flush {
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted)
    }

    /// The failure as an application error, for callers that report outcomes by class.
    pub fn as_error(&self) -> Option<ApplicationError> {
        match self {
            Self::Persisted => None,
            Self::Failed { reason } => Some(ApplicationError::Persistence(reason.clone())),
        }
    }
}

/// A mutation that was applied in memory, together with how its flush went.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Committed<T> {
    pub value: T,
    pub flush: Flush,
}

/// What `init` found in the backing store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hydration {
    Loaded { count: usize },
    Fresh,
    Recovered { reason: String },
}

/// The product catalog bound to a backing store. Every successful mutation rewrites the
/// full collection; mutators take `&mut self`, so a store has a single writer.
pub struct CatalogStore<B> {
    backend: B,
    catalog: Catalog,
}

impl<B: BlobStore> CatalogStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, catalog: Catalog::default() }
    }

    pub async fn open(backend: B) -> Self {
        let mut store = Self::new(backend);
        store.init().await;
        store
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Loads the persisted catalog. An absent, unreadable or malformed store leaves an empty
    /// catalog with the identifier counter untouched; nothing is written back.
    pub async fn init(&mut self) -> Hydration {
        let location = self.backend.describe();
        let outcome = match self.backend.read().await {
            Ok(Some(contents)) => self.hydrate(&contents),
            Ok(None) => {
                self.catalog.clear();
                Hydration::Fresh
            }
            Err(error) => {
                self.catalog.clear();
                Hydration::Recovered { reason: error.to_string() }
            }
        };

        match &outcome {
            Hydration::Loaded { count } => info!(
                event_name = "store.init.loaded",
                location = %location,
                count = *count,
                id_counter = self.catalog.id_counter(),
                "catalog loaded from backing store"
            ),
            Hydration::Fresh => debug!(
                event_name = "store.init.fresh",
                location = %location,
                "no backing store found, starting with an empty catalog"
            ),
            Hydration::Recovered { reason } => warn!(
                event_name = "store.init.recovered",
                location = %location,
                reason = %reason,
                "backing store unusable, starting with an empty catalog"
            ),
        }

        outcome
    }

    fn hydrate(&mut self, contents: &[u8]) -> Hydration {
        let products = match serde_json::from_slice::<Vec<Product>>(contents) {
            Ok(products) => products,
            Err(error) => {
                self.catalog.clear();
                return Hydration::Recovered { reason: StoreError::Decode(error).to_string() };
            }
        };

        let count = products.len();
        match self.catalog.hydrate(products) {
            Ok(()) => Hydration::Loaded { count },
            Err(error) => {
                self.catalog.clear();
                Hydration::Recovered { reason: error.to_string() }
            }
        }
    }

    /// Overwrites the backing store with the full catalog. Failures are logged, not retried.
    pub async fn save_products_to_file(&self) -> Flush {
        match self.write_catalog().await {
            Ok(()) => Flush::Persisted,
            Err(failure) => {
                error!(
                    event_name = "store.flush.failed",
                    location = %self.backend.describe(),
                    error = %failure,
                    "could not persist catalog"
                );
                Flush::Failed { reason: failure.to_string() }
            }
        }
    }

    async fn write_catalog(&self) -> Result<(), StoreError> {
        let contents =
            serde_json::to_vec_pretty(self.catalog.products()).map_err(StoreError::Encode)?;
        self.backend.write(&contents).await
    }

    pub async fn add_product(
        &mut self,
        input: NewProduct,
    ) -> Result<Committed<Product>, DomainError> {
        let product = match self.catalog.add(input) {
            Ok(product) => product.clone(),
            Err(rejection) => {
                info!(
                    event_name = "store.product.add_rejected",
                    error_class = rejection.error_class(),
                    reason = %rejection,
                    "product not added"
                );
                return Err(rejection);
            }
        };

        let flush = self.save_products_to_file().await;
        info!(
            event_name = "store.product.added",
            product_id = %product.id,
            code = %product.code,
            persisted = flush.is_persisted(),
            "product added"
        );
        Ok(Committed { value: product, flush })
    }

    pub async fn update_product(
        &mut self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Committed<Product>, DomainError> {
        let product = match self.catalog.update(id, &patch) {
            Ok(product) => product.clone(),
            Err(missing) => {
                info!(
                    event_name = "store.product.update_missed",
                    product_id = %id,
                    "product not found"
                );
                return Err(missing);
            }
        };

        let flush = self.save_products_to_file().await;
        info!(
            event_name = "store.product.updated",
            product_id = %id,
            empty_patch = patch.is_empty(),
            persisted = flush.is_persisted(),
            "product updated"
        );
        Ok(Committed { value: product, flush })
    }

    pub async fn delete_product(
        &mut self,
        id: ProductId,
    ) -> Result<Committed<Product>, DomainError> {
        let product = match self.catalog.remove(id) {
            Ok(product) => product,
            Err(missing) => {
                info!(
                    event_name = "store.product.delete_missed",
                    product_id = %id,
                    "product not found"
                );
                return Err(missing);
            }
        };

        let flush = self.save_products_to_file().await;
        info!(
            event_name = "store.product.deleted",
            product_id = %id,
            persisted = flush.is_persisted(),
            "product deleted"
        );
        Ok(Committed { value: product, flush })
    }

    pub fn get_products(&self) -> &[Product] {
        self.catalog.products()
    }

    pub fn get_product_by_id(&self, id: ProductId) -> Result<&Product, DomainError> {
        self.catalog.get(id)
    }
}
