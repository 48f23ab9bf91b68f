use std::collections::HashSet;

use crate::domain::product::{NewProduct, Product, ProductId, ProductPatch};
use crate::errors::DomainError;

/// Ordered product records plus the highest identifier ever issued.
///
/// Lookups are linear scans over insertion order. The counter only ever moves up, so
/// identifiers of deleted records are never handed out again.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
    id_counter: u64,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Result<Self, DomainError> {
        let mut catalog = Self::default();
        catalog.hydrate(products)?;
        Ok(catalog)
    }

    /// Replaces the in-memory sequence with previously persisted records.
    ///
    /// The state is left untouched when `products` repeats an identifier.
    pub fn hydrate(&mut self, products: Vec<Product>) -> Result<(), DomainError> {
        let mut seen = HashSet::with_capacity(products.len());
        if let Some(product) = products.iter().find(|product| !seen.insert(product.id)) {
            return Err(DomainError::DuplicateId { id: product.id });
        }

        let highest = products.iter().map(|product| product.id.0).max().unwrap_or(0);
        self.id_counter = self.id_counter.max(highest);
        self.products = products;
        Ok(())
    }

    /// Drops every record but keeps the counter.
    pub fn clear(&mut self) {
        self.products.clear();
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn id_counter(&self) -> u64 {
        self.id_counter
    }

    /// Issues the identifier after the counter. The counter is left alone once it reaches
    /// `u64::MAX`.
    pub fn next_id(&mut self) -> Result<ProductId, DomainError> {
        let next = self
            .id_counter
            .checked_add(1)
            .ok_or(DomainError::IdsExhausted { last: ProductId(self.id_counter) })?;
        self.id_counter = next;
        Ok(ProductId(next))
    }

    /// Validates and appends a new record. No identifier is consumed when the record is
    /// rejected.
    pub fn add(&mut self, input: NewProduct) -> Result<&Product, DomainError> {
        if let Some(field) = input.missing_field() {
            return Err(DomainError::MissingField { field });
        }
        if self.products.iter().any(|product| product.code == input.code) {
            return Err(DomainError::DuplicateCode { code: input.code });
        }

        let id = self.next_id()?;
        self.products.push(input.into_product(id));
        Ok(&self.products[self.products.len() - 1])
    }

    /// Merges `patch` into the matching record without re-validating it.
    pub fn update(&mut self, id: ProductId, patch: &ProductPatch) -> Result<&Product, DomainError> {
        let index = self.position(id)?;
        let product = &mut self.products[index];
        product.apply(patch);
        Ok(product)
    }

    pub fn remove(&mut self, id: ProductId) -> Result<Product, DomainError> {
        let index = self.position(id)?;
        Ok(self.products.remove(index))
    }

    pub fn get(&self, id: ProductId) -> Result<&Product, DomainError> {
        self.products
            .iter()
            .find(|product| product.id == id)
            .ok_or(DomainError::NotFound { id })
    }

    fn position(&self, id: ProductId) -> Result<usize, DomainError> {
        self.products
            .iter()
            .position(|product| product.id == id)
            .ok_or(DomainError::NotFound { id })
    }
}
