pub mod product;
pub mod query;
pub mod repository;

pub use product::{Product, Variant};
pub use query::{CatalogError, CatalogPage, CatalogService, ProductFilter};
pub use repository::ProductRepository;
