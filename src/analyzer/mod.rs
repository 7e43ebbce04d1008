// Analyzer module: price comparison and the insert/replace decision built on it.

pub mod price_change;
pub mod upsert;

pub use price_change::PriceComparison;
pub use upsert::{PriceTracker, UpsertOutcome};
