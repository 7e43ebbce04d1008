use crate::analyzer::PriceComparison;
use crate::model::PriceDocument;
use crate::storage::DocumentStore;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
    Failed(String),
}

/// Decides per observation whether to insert, replace or leave the stored document.
pub struct PriceTracker {
    comparison: PriceComparison,
}

impl PriceTracker {
    pub fn new(comparison: PriceComparison) -> Self {
        Self { comparison }
    }

    /// Inserts unknown products; replaces known ones only on a strictly lower sale price.
    /// Store errors are logged and reported as `Failed`, never propagated.
    pub fn apply<S: DocumentStore + ?Sized>(
        &self,
        store: &S,
        doc: &PriceDocument,
    ) -> UpsertOutcome {
        let name = &doc.product_name;

        let exists = match store.exists(name) {
            Ok(exists) => exists,
            Err(e) => return failed(format!("existence check failed for {name}: {e}")),
        };

        if !exists {
            return match store.insert(doc) {
                Ok(true) => {
                    info!("Document for {} created successfully", name);
                    UpsertOutcome::Inserted
                }
                Ok(false) => failed(format!("Failed to create document for {name}")),
                Err(e) => failed(format!("Failed to create document for {name}: {e}")),
            };
        }

        let stored = match store.fetch(name) {
            Ok(Some(stored)) => stored,
            Ok(None) => return failed(format!("Document for {name} vanished before compare")),
            Err(e) => return failed(format!("Failed to fetch document for {name}: {e}")),
        };

        if !self.comparison.is_decrease(&doc.sale_price, &stored.sale_price) {
            info!(
                "Price has not changed for {} ({} vs stored {})",
                name, doc.sale_price, stored.sale_price
            );
            return UpsertOutcome::Unchanged;
        }

        match store.replace(name, doc) {
            Ok(true) => {
                info!(
                    "Document for {} updated successfully: {} -> {}",
                    name, stored.sale_price, doc.sale_price
                );
                UpsertOutcome::Updated
            }
            Ok(false) => failed(format!("Failed to update document for {name}")),
            Err(e) => failed(format!("Failed to update document for {name}: {e}")),
        }
    }
}

fn failed(reason: String) -> UpsertOutcome {
    warn!("{}", reason);
    UpsertOutcome::Failed(reason)
}
