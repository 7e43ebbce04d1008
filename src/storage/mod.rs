pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::model::{PriceDocument, StoreError};

/// Price documents keyed by product name.
pub trait DocumentStore {
    fn exists(&self, product_name: &str) -> Result<bool, StoreError>;
    fn fetch(&self, product_name: &str) -> Result<Option<PriceDocument>, StoreError>;
    /// `Ok(true)` when the document was written.
    fn insert(&self, doc: &PriceDocument) -> Result<bool, StoreError>;
    /// `Ok(true)` when exactly one document matched `product_name` and was overwritten.
    fn replace(&self, product_name: &str, doc: &PriceDocument) -> Result<bool, StoreError>;
}
