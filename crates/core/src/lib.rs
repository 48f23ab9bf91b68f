pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;

pub use catalog::Catalog;
pub use domain::product::{NewProduct, Product, ProductId, ProductPatch};
pub use errors::{ApplicationError, DomainError};
