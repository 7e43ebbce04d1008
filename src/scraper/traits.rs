use crate::model::ScraperError;

#[async_trait::async_trait]
pub trait Scraper: Send + Sync {
    /// Downloads one product page and returns its HTML.
    async fn fetch(&self, url: &str) -> Result<String, ScraperError>;
}
